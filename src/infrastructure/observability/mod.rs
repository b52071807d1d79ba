//! Observability infrastructure: Prometheus metrics and log setup.

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::Metrics;
