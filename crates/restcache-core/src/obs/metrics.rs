use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters for parses and cache mutations.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub tables: BTreeMap<String, TableCounters>,
    pub window_start_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            tables: BTreeMap::new(),
            window_start_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Canonicalizer
    pub queries_parsed: u64,
    pub rejected_parse: u64,
    pub rejected_wildcard: u64,

    // Mutation entrypoints
    pub upsert_calls: u64,
    pub delete_calls: u64,

    // Rows touched
    pub rows_inserted: u64,
    pub rows_updated: u64,
    pub rows_removed: u64,

    // Store walk
    pub skipped_foreign: u64,
    pub skipped_head: u64,
    pub skipped_unparseable: u64,
}

///
/// TableCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TableCounters {
    pub queries_parsed: u64,
    pub queries_rejected: u64,
    pub upsert_calls: u64,
    pub delete_calls: u64,
    pub rows_inserted: u64,
    pub rows_updated: u64,
    pub rows_removed: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all event state and open a new window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `window_start_ms`.
    pub counters: Option<EventState>,
    /// Per-table counters and averages.
    pub table_counters: Vec<TableSummary>,
}

///
/// TableSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub queries_parsed: u64,
    pub queries_rejected: u64,
    pub mutations: u64,
    pub rows_inserted: u64,
    pub rows_updated: u64,
    pub rows_removed: u64,
    pub avg_rows_per_mutation: f64,
}

/// Build a report from in-memory counters. A `window_start_ms` later than
/// the current window yields an empty report.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|start| start > snap.window_start_ms) {
        return EventReport::default();
    }

    let mut table_counters: Vec<TableSummary> = snap
        .tables
        .iter()
        .map(|(table, c)| {
            let mutations = c.upsert_calls.saturating_add(c.delete_calls);
            let touched = c
                .rows_inserted
                .saturating_add(c.rows_updated)
                .saturating_add(c.rows_removed);
            let avg = if mutations > 0 {
                touched as f64 / mutations as f64
            } else {
                0.0
            };

            TableSummary {
                table: table.clone(),
                queries_parsed: c.queries_parsed,
                queries_rejected: c.queries_rejected,
                mutations,
                rows_inserted: c.rows_inserted,
                rows_updated: c.rows_updated,
                rows_removed: c.rows_removed,
                avg_rows_per_mutation: avg,
            }
        })
        .collect();

    table_counters.sort_by(|a, b| {
        match b
            .avg_rows_per_mutation
            .partial_cmp(&a.avg_rows_per_mutation)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => match b.mutations.cmp(&a.mutations) {
                Ordering::Equal => a.table.cmp(&b.table),
                other => other,
            },
            other => other,
        }
    });

    EventReport {
        counters: Some(snap),
        table_counters,
    }
}

///
/// TESTS
///

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reset_all_clears_state() {
        with_state_mut(|m| {
            m.ops.upsert_calls = 3;
            m.ops.rows_removed = 2;
            m.tables.insert(
                "alpha".to_string(),
                TableCounters {
                    upsert_calls: 1,
                    ..Default::default()
                },
            );
        });

        reset_all();

        with_state(|m| {
            assert_eq!(m.ops.upsert_calls, 0);
            assert_eq!(m.ops.rows_removed, 0);
            assert!(m.tables.is_empty());
        });
    }

    #[test]
    fn report_sorts_tables_by_average_rows() {
        reset_all();
        with_state_mut(|m| {
            m.tables.insert(
                "alpha".to_string(),
                TableCounters {
                    upsert_calls: 2,
                    rows_updated: 6,
                    ..Default::default()
                },
            );
            m.tables.insert(
                "beta".to_string(),
                TableCounters {
                    delete_calls: 1,
                    rows_removed: 5,
                    ..Default::default()
                },
            );
            m.tables.insert(
                "gamma".to_string(),
                TableCounters {
                    upsert_calls: 2,
                    rows_inserted: 6,
                    ..Default::default()
                },
            );
        });

        let report = report_window_start(None);
        let tables: Vec<_> = report
            .table_counters
            .iter()
            .map(|t| t.table.as_str())
            .collect();

        // Order by avg rows per mutation desc, then mutations desc, then name asc.
        assert_eq!(tables, ["beta", "alpha", "gamma"]);
        assert_eq!(report.table_counters[0].avg_rows_per_mutation, 5.0);
        assert_eq!(report.table_counters[1].avg_rows_per_mutation, 3.0);
    }
}
