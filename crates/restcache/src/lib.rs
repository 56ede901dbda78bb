//! ## Crate layout
//! - `config`: TOML table configuration (primary keys, key prefix, schema).
//! - `core`: query canonicalization, row filters, the mutation engine, and
//!   observability.
//! - `key`: the string codec for cache entry keys.
//! - `store`: the key-value boundary cached query results live behind.
//!
//! [`RestCache`] ties them together: it canonicalizes query descriptions
//! into cache keys and reconciles every cached result of a table when one
//! row changes.

pub use restcache_config as config;
pub use restcache_core as core;

mod error;
mod filter_cache;
pub mod key;
mod mutate;
pub mod store;
mod subscription;

pub use error::Error;
pub use filter_cache::FilterCache;
pub use mutate::{ItemInput, MutationSummary, RestCache};
pub use subscription::{ChangeEvent, RowChange};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        ChangeEvent, ItemInput, MutationSummary, RestCache, RowChange,
        config::RestCacheConfig,
        core::prelude::*,
        key::CacheKey,
        store::{CacheStore, MemoryStore},
    };
}
