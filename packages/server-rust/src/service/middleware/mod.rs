//! Tower middleware layers for the operation pipeline.
//!
//! - [`metrics`]: Operation span, counters and duration histogram
//! - [`pipeline`]: Registers the domain services and applies the layers

pub mod metrics;
pub mod pipeline;

pub use metrics::MetricsLayer;
pub use pipeline::build_operation_pipeline;
