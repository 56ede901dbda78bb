//! Cache mutation engine.
//!
//! Reconciles cached query results with one changed row without re-running
//! the query. Every container variant is handled by exactly one branch; the
//! query's `RowFilter` decides membership, the primary key decides identity.

mod container;
mod delete;
mod primary_key;
mod upsert;

#[cfg(test)]
mod tests;

pub use container::{CacheValue, Count, ShapeError};
pub use delete::{DeleteMutation, build_delete_mutator};
pub use primary_key::PrimaryKey;
pub use upsert::{UpsertMutation, build_upsert_mutator};

use derive_more::{Add, AddAssign};
use serde::{Deserialize, Serialize};

///
/// RowDelta
///
/// Rows a mutation inserted, replaced in place, or removed.
///

#[derive(
    Add, AddAssign, Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct RowDelta {
    pub inserted: u64,
    pub updated: u64,
    pub removed: u64,
}

impl RowDelta {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.removed == 0
    }
}
