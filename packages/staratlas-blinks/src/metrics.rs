//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::Error;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic per stage ---
    pub describe_total: AtomicU64,
    pub find_orders_total: AtomicU64,
    pub buy_total: AtomicU64,

    // --- Outcomes ---
    pub orders_listed: AtomicU64,
    pub tx_built: AtomicU64,
    pub invalid_input: AtomicU64,
    pub not_found: AtomicU64,
    pub upstream_errors: AtomicU64,
    pub timeouts: AtomicU64,

    // --- Latency (μs, updated via CAS) ---
    pub handler_duration_us_sum: AtomicU64,
    pub handler_duration_us_max: AtomicU64,

    // --- RPC ---
    pub rpc_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            describe_total: AtomicU64::new(0),
            find_orders_total: AtomicU64::new(0),
            buy_total: AtomicU64::new(0),
            orders_listed: AtomicU64::new(0),
            tx_built: AtomicU64::new(0),
            invalid_input: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            upstream_errors: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            handler_duration_us_sum: AtomicU64::new(0),
            handler_duration_us_max: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
        }
    }

    pub fn record_error(&self, err: &Error) {
        let counter = match err {
            Error::InvalidInput(_) => &self.invalid_input,
            Error::NotFound(_) => &self.not_found,
            Error::Upstream(_) | Error::Config(_) => &self.upstream_errors,
            Error::Timeout(_) => &self.timeouts,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.handler_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.handler_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.handler_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, catalog_size: usize) -> String {
        let describe = self.describe_total.load(Ordering::Relaxed);
        let find_orders = self.find_orders_total.load(Ordering::Relaxed);
        let buy = self.buy_total.load(Ordering::Relaxed);
        let orders_listed = self.orders_listed.load(Ordering::Relaxed);
        let tx_built = self.tx_built.load(Ordering::Relaxed);
        let invalid_input = self.invalid_input.load(Ordering::Relaxed);
        let not_found = self.not_found.load(Ordering::Relaxed);
        let upstream = self.upstream_errors.load(Ordering::Relaxed);
        let timeouts = self.timeouts.load(Ordering::Relaxed);
        let dur_sum = self.handler_duration_us_sum.load(Ordering::Relaxed);
        let dur_max = self.handler_duration_us_max.swap(0, Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);

        // Convert μs to seconds for Prometheus conventions
        let dur_sum_s = dur_sum as f64 / 1_000_000.0;
        let dur_max_s = dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP blinks_requests_total Action requests by stage.\n\
# TYPE blinks_requests_total counter\n\
blinks_requests_total{{stage=\"describe\"}} {describe}\n\
blinks_requests_total{{stage=\"findOrders\"}} {find_orders}\n\
blinks_requests_total{{stage=\"buy\"}} {buy}\n\
# HELP blinks_orders_listed_total Orders offered in findOrders menus.\n\
# TYPE blinks_orders_listed_total counter\n\
blinks_orders_listed_total {orders_listed}\n\
# HELP blinks_tx_built_total Unsigned purchase transactions returned.\n\
# TYPE blinks_tx_built_total counter\n\
blinks_tx_built_total {tx_built}\n\
# HELP blinks_errors_total Failed requests by kind.\n\
# TYPE blinks_errors_total counter\n\
blinks_errors_total{{kind=\"invalid_input\"}} {invalid_input}\n\
blinks_errors_total{{kind=\"not_found\"}} {not_found}\n\
blinks_errors_total{{kind=\"upstream\"}} {upstream}\n\
blinks_errors_total{{kind=\"timeout\"}} {timeouts}\n\
# HELP blinks_handler_duration_seconds_sum Total handler time (seconds).\n\
# TYPE blinks_handler_duration_seconds_sum counter\n\
blinks_handler_duration_seconds_sum {dur_sum_s:.6}\n\
# HELP blinks_handler_duration_seconds_max Max handler time since last scrape (seconds).\n\
# TYPE blinks_handler_duration_seconds_max gauge\n\
blinks_handler_duration_seconds_max {dur_max_s:.6}\n\
# HELP blinks_rpc_errors_total RPC errors.\n\
# TYPE blinks_rpc_errors_total counter\n\
blinks_rpc_errors_total {rpc_errors}\n\
# HELP blinks_catalog_size NFTs available for purchase.\n\
# TYPE blinks_catalog_size gauge\n\
blinks_catalog_size {catalog_size}\n"
        )
    }
}
