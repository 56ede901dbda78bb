//! Page arithmetic for infinite/paged cache entries.

use crate::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field set on the marker row that replaces the lookahead row of a full page.
pub const HAS_MORE_FIELD: &str = "hasMore";

///
/// PaginationKey
///
/// Decoded page request; missing fields fall back to the page size and the
/// first row.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PaginationKey {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PaginationKey {
    #[must_use]
    pub const fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self { limit, offset }
    }

    /// Inclusive row range for this key.
    #[must_use]
    pub fn range(&self, page_size: u64) -> PageRange {
        let limit = self.limit.unwrap_or(page_size);
        let from = self.offset.unwrap_or(0);

        PageRange {
            from,
            to: from.saturating_add(limit).saturating_sub(1).max(from),
        }
    }
}

///
/// PageRange
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PageRange {
    pub from: u64,
    pub to: u64,
}

impl PageRange {
    /// Same range extended by one row, used to detect a following page.
    #[must_use]
    pub const fn with_lookahead(self) -> Self {
        Self {
            from: self.from,
            to: self.to.saturating_add(1),
        }
    }

    #[must_use]
    pub const fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.to - self.from + 1
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.to < self.from
    }
}

/// Replace the lookahead row with a `{"hasMore": true}` marker when the
/// fetch returned exactly `page_size + 1` rows. Returns whether a marker
/// was written.
pub fn mark_has_more(rows: &mut [Row], page_size: usize) -> bool {
    if rows.len() != page_size.saturating_add(1) {
        return false;
    }

    let Some(last) = rows.last_mut() else {
        return false;
    };
    let mut marker = Row::new();
    marker.insert(HAS_MORE_FIELD.to_string(), Value::Bool(true));
    *last = marker;

    true
}

/// True for the marker row written by `mark_has_more`.
#[must_use]
pub fn is_has_more_marker(row: &Row) -> bool {
    row.len() == 1 && row.get(HAS_MORE_FIELD) == Some(&Value::Bool(true))
}
