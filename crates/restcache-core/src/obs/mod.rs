//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Parsing and mutation code never touches `obs::metrics` directly; every
//! instrumentation point emits a `MetricsEvent` through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, TableCounters, TableSummary};
pub use sink::{
    MetricsEvent, MetricsSink, MutationKind, RejectReason, SkipReason, metrics_report,
    metrics_reset_all, record, with_metrics_sink,
};
