//! Transport-boundary concerns: the response envelope and error metrics

pub mod envelope;
pub mod metrics;

pub use envelope::{Envelope, RequestContext};
pub use metrics::{InMemoryMetrics, MetricsSink, NoopMetrics};
