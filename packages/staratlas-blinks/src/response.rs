//! Response types for the operational endpoints.

use serde::Serialize;

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub program_id: String,
    pub rpc_url: String,
    pub rpc_status: &'static str,
    pub catalog_size: usize,
    pub uptime_secs: u64,
    pub requests: u64,
}
