//! NFT name -> mint lookup table.

use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;

/// Read-only catalog of purchasable NFTs, keyed by lowercase name.
///
/// Built once at startup. Every mint is parsed during construction, so a
/// catalog that exists only holds valid addresses.
#[derive(Debug, Clone, Default)]
pub struct NftCatalog {
    entries: HashMap<String, Pubkey>,
}

impl NftCatalog {
    pub fn new<I, K, V>(entries: I) -> Result<Self, crate::Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = HashMap::new();
        for (name, mint) in entries {
            let key = normalize(name.as_ref());
            if key.is_empty() {
                return Err(crate::Error::Config("empty NFT name in catalog".into()));
            }
            let mint = Pubkey::from_str(mint.as_ref().trim()).map_err(|e| {
                crate::Error::Config(format!("invalid mint for '{key}': {e}"))
            })?;
            map.insert(key, mint);
        }
        Ok(Self { entries: map })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize(name))
    }

    pub fn resolve(&self, name: &str) -> Option<Pubkey> {
        self.entries.get(&normalize(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Catalog key form of a user-supplied name.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
