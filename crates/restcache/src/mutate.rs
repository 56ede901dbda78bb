use crate::{
    Error,
    filter_cache::FilterCache,
    key::CacheKey,
    store::CacheStore,
};
use restcache_config::RestCacheConfig;
use restcache_core::{
    Row,
    cache::{CacheValue, DeleteMutation, PrimaryKey, RowDelta, UpsertMutation},
    obs::{self, MetricsEvent, MutationKind, SkipReason},
    query::{QueryDescription, QueryDescriptor},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

///
/// ItemInput
///
/// One changed row and the table it belongs to.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ItemInput {
    pub schema: String,
    pub table: String,
    pub primary_key: PrimaryKey,
    pub row: Row,
}

impl ItemInput {
    #[must_use]
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        primary_key: PrimaryKey,
        row: Row,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            primary_key,
            row,
        }
    }
}

///
/// MutationSummary
///
/// Outcome of one store walk: entries rewritten, entries left alone because
/// they belong elsewhere or cannot be reconciled, and the summed row delta.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MutationSummary {
    pub entries_touched: u64,
    pub entries_skipped: u64,
    pub delta: RowDelta,
}

///
/// RestCache
///

#[derive(Clone, Debug)]
pub struct RestCache {
    config: RestCacheConfig,
    filters: FilterCache,
}

impl RestCache {
    pub fn new(config: RestCacheConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            filters: FilterCache::new(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &RestCacheConfig {
        &self.config
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterCache {
        &self.filters
    }

    /// Cache key for a query; `schema` falls back to the configured default.
    pub fn cache_key(
        &self,
        description: &QueryDescription,
        schema: Option<&str>,
        infinite: bool,
    ) -> Result<CacheKey, Error> {
        let descriptor = QueryDescriptor::parse(description)?;
        let schema = schema.unwrap_or(&self.config.default_schema);

        Ok(CacheKey::for_descriptor(
            &self.config.key_prefix,
            schema,
            &descriptor,
            infinite,
        ))
    }

    /// Reconcile every cached result of the row's table with an inserted or
    /// updated row.
    pub fn upsert_item<S: CacheStore + ?Sized>(
        &mut self,
        input: &ItemInput,
        store: &mut S,
    ) -> MutationSummary {
        self.walk(MutationKind::Upsert, input, store)
    }

    /// Remove a deleted row from every cached result of its table.
    pub fn delete_item<S: CacheStore + ?Sized>(
        &mut self,
        input: &ItemInput,
        store: &mut S,
    ) -> MutationSummary {
        self.walk(MutationKind::Delete, input, store)
    }

    fn walk<S: CacheStore + ?Sized>(
        &mut self,
        kind: MutationKind,
        input: &ItemInput,
        store: &mut S,
    ) -> MutationSummary {
        let mut summary = MutationSummary::default();

        for raw in store.keys() {
            match self.mutate_entry(kind, input, store, &raw) {
                Ok(Some(delta)) => {
                    summary.entries_touched += 1;
                    summary.delta += delta;
                }
                Ok(None) => {}
                Err(reason) => {
                    summary.entries_skipped += 1;
                    obs::record(MetricsEvent::EntrySkipped { reason });
                }
            }
        }

        obs::record(MetricsEvent::Mutation {
            kind,
            table: &input.table,
            inserted: summary.delta.inserted,
            updated: summary.delta.updated,
            removed: summary.delta.removed,
        });

        summary
    }

    // Delta written back for one entry; `None` when the entry was unchanged.
    fn mutate_entry<S: CacheStore + ?Sized>(
        &mut self,
        kind: MutationKind,
        input: &ItemInput,
        store: &mut S,
        raw: &str,
    ) -> Result<Option<RowDelta>, SkipReason> {
        let key = CacheKey::decode(raw).ok_or(SkipReason::Unparseable)?;
        if key.prefix != self.config.key_prefix
            || key.schema != input.schema
            || key.table != input.table
        {
            return Err(SkipReason::Foreign);
        }
        if key.head {
            return Err(SkipReason::Head);
        }

        let Some(document) = store.get(raw) else {
            return Ok(None);
        };
        let value = CacheValue::from_json(document).map_err(|_| SkipReason::Unparseable)?;

        let (value, delta) = match kind {
            MutationKind::Upsert => {
                let filter = self
                    .filters
                    .get_or_parse(&key)
                    .map_err(|_| SkipReason::Unparseable)?;

                UpsertMutation::new(&input.row, &input.primary_key, filter).apply(value)
            }
            MutationKind::Delete => DeleteMutation::new(&input.row, &input.primary_key).apply(value),
        };

        if delta.is_noop() {
            return Ok(None);
        }
        store.set(raw, value.map_or(Value::Null, CacheValue::into_json));

        Ok(Some(delta))
    }
}
