//! Observability: encode/decode counters and the sink abstraction.
//!
//! Structured logs go through `tracing` at the call sites; no subscriber
//! is installed here.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
