//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod metrics;
mod pipeline;

pub use metrics::MetricsSink;
pub use pipeline::Pipeline;
