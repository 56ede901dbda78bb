//! Metrics sink boundary.
//!
//! Canonicalizer and mutation logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the global metrics state.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// RejectReason
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RejectReason {
    Parse,
    Wildcard,
}

///
/// MutationKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MutationKind {
    Upsert,
    Delete,
}

///
/// SkipReason
///
/// Why a cache entry was left alone while walking the store.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkipReason {
    /// Key belongs to another schema or table.
    Foreign,
    /// Head-only query; nothing cached to reconcile.
    Head,
    /// Key or filter could not be decoded.
    Unparseable,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    QueryParsed {
        table: &'a str,
    },
    QueryRejected {
        table: &'a str,
        reason: RejectReason,
    },
    Mutation {
        kind: MutationKind,
        table: &'a str,
        inserted: u64,
        updated: u64,
        removed: u64,
    },
    EntrySkipped {
        reason: SkipReason,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::QueryParsed { table } => {
                metrics::with_state_mut(|m| {
                    m.ops.queries_parsed = m.ops.queries_parsed.saturating_add(1);
                    let entry = m.tables.entry(table.to_string()).or_default();
                    entry.queries_parsed = entry.queries_parsed.saturating_add(1);
                });
            }

            MetricsEvent::QueryRejected { table, reason } => {
                metrics::with_state_mut(|m| {
                    match reason {
                        RejectReason::Parse => {
                            m.ops.rejected_parse = m.ops.rejected_parse.saturating_add(1);
                        }
                        RejectReason::Wildcard => {
                            m.ops.rejected_wildcard = m.ops.rejected_wildcard.saturating_add(1);
                        }
                    }
                    let entry = m.tables.entry(table.to_string()).or_default();
                    entry.queries_rejected = entry.queries_rejected.saturating_add(1);
                });
            }

            MetricsEvent::Mutation {
                kind,
                table,
                inserted,
                updated,
                removed,
            } => {
                metrics::with_state_mut(|m| {
                    match kind {
                        MutationKind::Upsert => {
                            m.ops.upsert_calls = m.ops.upsert_calls.saturating_add(1);
                        }
                        MutationKind::Delete => {
                            m.ops.delete_calls = m.ops.delete_calls.saturating_add(1);
                        }
                    }
                    m.ops.rows_inserted = m.ops.rows_inserted.saturating_add(inserted);
                    m.ops.rows_updated = m.ops.rows_updated.saturating_add(updated);
                    m.ops.rows_removed = m.ops.rows_removed.saturating_add(removed);

                    let entry = m.tables.entry(table.to_string()).or_default();
                    match kind {
                        MutationKind::Upsert => {
                            entry.upsert_calls = entry.upsert_calls.saturating_add(1);
                        }
                        MutationKind::Delete => {
                            entry.delete_calls = entry.delete_calls.saturating_add(1);
                        }
                    }
                    entry.rows_inserted = entry.rows_inserted.saturating_add(inserted);
                    entry.rows_updated = entry.rows_updated.saturating_add(updated);
                    entry.rows_removed = entry.rows_removed.saturating_add(removed);
                });
            }

            MetricsEvent::EntrySkipped { reason } => {
                metrics::with_state_mut(|m| match reason {
                    SkipReason::Foreign => {
                        m.ops.skipped_foreign = m.ops.skipped_foreign.saturating_add(1);
                    }
                    SkipReason::Head => m.ops.skipped_head = m.ops.skipped_head.saturating_add(1),
                    SkipReason::Unparseable => {
                        m.ops.skipped_unparseable = m.ops.skipped_unparseable.saturating_add(1);
                    }
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

/// Route one event to the scoped override, or the global sink.
pub fn record(event: MetricsEvent<'_>) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::window_start_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous override is restored on every exit, including unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
