//! Application state shared across handlers.

use crate::catalog::NftCatalog;
use crate::config::Config;
use crate::marketplace::{GalacticMarketplace, Marketplace};
use crate::resolver::ActionResolver;
use crate::rpc::ChainRpc;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub resolver: ActionResolver,
    pub marketplace: Arc<dyn Marketplace>,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state backed by the on-chain marketplace.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        let rpc = ChainRpc::new(&config.rpc_url, &config.commitment)?;
        let marketplace = GalacticMarketplace::new(rpc, &config.program_id)?;
        Self::with_marketplace(config, Arc::new(marketplace))
    }

    /// Create application state around any marketplace implementation.
    pub fn with_marketplace(
        config: Config,
        marketplace: Arc<dyn Marketplace>,
    ) -> Result<Self, crate::Error> {
        let catalog = NftCatalog::new(&config.catalog)?;
        if catalog.is_empty() {
            return Err(crate::Error::Config("NFT catalog is empty".into()));
        }
        info!(nfts = catalog.len(), "Loaded NFT catalog");

        let resolver = ActionResolver::new(
            catalog,
            Arc::clone(&marketplace),
            Duration::from_millis(config.rpc_timeout_ms),
        );

        Ok(Self {
            config,
            resolver,
            marketplace,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        })
    }
}
