//! Shared Solana RPC connection.
//!
//! One nonblocking client per process, shared behind an `Arc` by every
//! request. Errors are mapped to [`crate::Error::Upstream`] here so callers
//! never see raw client errors.

use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::RpcFilterType;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::metrics::METRICS;

/// RPC connection handle.
#[derive(Clone)]
pub struct ChainRpc {
    client: Arc<RpcClient>,
    url: String,
    errors: Arc<AtomicU64>,
}

impl ChainRpc {
    pub fn new(url: &str, commitment: &str) -> Result<Self, crate::Error> {
        let commitment = CommitmentConfig::from_str(commitment)
            .map_err(|e| crate::Error::Config(format!("invalid commitment '{commitment}': {e}")))?;
        info!(url, commitment = ?commitment.commitment, "RPC client initialized");
        Ok(Self {
            client: Arc::new(RpcClient::new_with_commitment(url.to_string(), commitment)),
            url: url.to_string(),
            errors: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// RPC errors seen by this connection.
    pub fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub async fn latest_blockhash(&self) -> Result<Hash, crate::Error> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| self.upstream("getLatestBlockhash", e))
    }

    /// Fetch an account; `None` if it does not exist.
    pub async fn account(&self, pubkey: &Pubkey) -> Result<Option<Account>, crate::Error> {
        self.client
            .get_account_with_commitment(pubkey, self.client.commitment())
            .await
            .map(|resp| resp.value)
            .map_err(|e| self.upstream("getAccountInfo", e))
    }

    /// Program accounts matching all `filters`, in RPC order.
    pub async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> Result<Vec<(Pubkey, Account)>, crate::Error> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.client.commitment()),
                ..Default::default()
            },
            ..Default::default()
        };
        self.client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(|e| self.upstream("getProgramAccounts", e))
    }

    /// Quick connectivity check.
    pub async fn health_check(&self) -> Result<(), crate::Error> {
        self.client
            .get_health()
            .await
            .map_err(|e| self.upstream("getHealth", e))
    }

    fn upstream(&self, method: &str, e: impl std::fmt::Display) -> crate::Error {
        self.errors.fetch_add(1, Ordering::Relaxed);
        METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
        warn!(method, url = %self.url, error = %e, "RPC call failed");
        crate::Error::Upstream(format!("{method} failed: {e}"))
    }
}
