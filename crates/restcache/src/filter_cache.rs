use crate::key::CacheKey;
use restcache_core::{
    error::QueryError,
    query::{QueryDescription, QueryDescriptor, QueryFilter, key::parse_query_key},
};
use std::collections::{BTreeMap, btree_map::Entry};

///
/// FilterCache
///
/// Row filters rebuilt from cache keys, memoized per encoded key. A store
/// walk touches the same keys for every changed row, so each query key is
/// parsed once.
///

#[derive(Clone, Debug, Default)]
pub struct FilterCache {
    entries: BTreeMap<String, QueryFilter>,
}

impl FilterCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Filter of the query a key was built from. Failures are not memoized.
    pub fn get_or_parse(&mut self, key: &CacheKey) -> Result<&QueryFilter, QueryError> {
        let filter = match self.entries.entry(key.encode()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(parse_filter(key)?),
        };

        Ok(filter)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn parse_filter(key: &CacheKey) -> Result<QueryFilter, QueryError> {
    let description = QueryDescription {
        params: parse_query_key(&key.query_key)?,
        ..QueryDescription::table(key.table.clone())
    };
    let descriptor = QueryDescriptor::parse(&description)?;

    Ok(QueryFilter::from_descriptor(&descriptor))
}
