//! Metrics sinks - JSON lines on disk, in-memory, and no-op.

mod jsonl;
mod memory;

pub use jsonl::JsonlMetricsSink;
pub use memory::{InMemoryMetricsSink, NoopMetricsSink};
