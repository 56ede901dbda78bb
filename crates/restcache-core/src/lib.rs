//! Core runtime for restcache: query canonicalization, row filters, and the
//! cache mutation engine that keeps cached query results consistent with
//! row-level changes.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod cache;
pub mod error;
pub mod filter;
pub mod obs;
pub mod pagination;
pub mod path;
pub mod query;
pub mod select;

///
/// Row
///
/// A flat (or nested, for embedded resources) key-value record as returned by
/// the query layer.
///

pub type Row = serde_json::Map<String, serde_json::Value>;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        Row,
        cache::{CacheValue, PrimaryKey, RowDelta},
        filter::{FilterNode, Operator, RowFilter},
        query::{QueryDescription, QueryDescriptor, QueryFilter, Target},
        select::PathDescriptor,
    };
}
