//! # Star Atlas Blinks
//!
//! A Solana Actions endpoint for buying Star Atlas NFTs. Lists open sell
//! orders on the Galactic Marketplace and hands back unsigned purchase
//! transactions for the caller's wallet to sign.
//!
//! ## Quick Start
//! ```bash
//! SOLANA_RPC_URL=https://api.mainnet-beta.solana.com cargo run --bin staratlas-blinks
//! ```
//!
//! ## Endpoints
//! - `GET /api/actions/buy-nft?nftName=` - Action descriptor
//! - `POST /api/actions/buy-nft?nftName=&action=findOrders` - Order menu
//! - `POST /api/actions/buy-nft?nftName=&action=buy&orderId=` - Unsigned transaction
//! - `GET /actions.json` - Actions rules
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics

pub mod actions;
pub mod catalog;
pub mod config;
mod error;
mod handlers;
pub mod marketplace;
pub mod metrics;
pub mod middleware;
pub mod resolver;
mod response;
mod router;
pub mod rpc;
mod state;

pub use catalog::NftCatalog;
pub use config::Config;
pub use error::Error;
pub use marketplace::{GalacticMarketplace, Marketplace, OpenOrder};
pub use resolver::ActionResolver;
pub use router::create as create_router;
pub use state::AppState;
