//! Service configuration.

use serde::Deserialize;
use std::collections::HashMap;

/// Configuration loaded from `blinks.toml` and `BLINKS_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    /// `processed`, `confirmed` or `finalized`.
    #[serde(default = "defaults::commitment")]
    pub commitment: String,

    /// Galactic Marketplace program.
    #[serde(default = "defaults::program_id")]
    pub program_id: String,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Upper bound for each marketplace call.
    #[serde(default = "defaults::rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,

    /// NFT name -> mint address.
    #[serde(default = "defaults::catalog")]
    pub catalog: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: defaults::rpc_url(),
            commitment: defaults::commitment(),
            program_id: defaults::program_id(),
            bind_address: defaults::bind_address(),
            rpc_timeout_ms: defaults::rpc_timeout_ms(),
            catalog: defaults::catalog(),
        }
    }
}

mod defaults {
    use std::collections::HashMap;

    pub fn rpc_url() -> String {
        // Priority: BLINKS_RPC_URL (via config source) > SOLANA_RPC_URL > public mainnet
        match std::env::var("SOLANA_RPC_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => "https://api.mainnet-beta.solana.com".into(),
        }
    }

    pub fn commitment() -> String {
        "confirmed".into()
    }

    pub fn program_id() -> String {
        "traderDnaR5w6Tcoi3NFm53i48FTDNbGjBSZwWXDRrg".into()
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3000".into()
    }

    pub fn rpc_timeout_ms() -> u64 {
        10_000
    }

    pub fn catalog() -> HashMap<String, String> {
        HashMap::from([(
            "pearce x4".to_string(),
            "peARCEjwjjcnuKyBDwdUkiP5V3dR3qQsWr4Jv5oKKCx".to_string(),
        )])
    }
}
