//! Metrics sink for error-response accounting
//!
//! The envelope increments a counter keyed by `(status, endpoint, method)`
//! for every response with status >= 400. The sink itself is a collaborator:
//! production wires a real exporter behind this trait, tests and development
//! use the in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

/// Increment-counter-by-dimensions interface
pub trait MetricsSink: Send + Sync {
    /// Count one response with the given status for an endpoint/method pair
    fn incr_response_status(&self, status: u16, endpoint: &str, method: &str);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn incr_response_status(&self, _status: u16, _endpoint: &str, _method: &str) {}
}

/// In-memory counter sink for tests and development
#[derive(Default)]
pub struct InMemoryMetrics {
    counters: RwLock<HashMap<(u16, String, String), u64>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a counter value; zero when never incremented
    pub fn get(&self, status: u16, endpoint: &str, method: &str) -> u64 {
        self.counters
            .read()
            .expect("metrics lock poisoned")
            .get(&(status, endpoint.to_string(), method.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl MetricsSink for InMemoryMetrics {
    fn incr_response_status(&self, status: u16, endpoint: &str, method: &str) {
        let mut counters = self.counters.write().expect("metrics lock poisoned");
        *counters
            .entry((status, endpoint.to_string(), method.to_string()))
            .or_insert(0) += 1;
    }
}
