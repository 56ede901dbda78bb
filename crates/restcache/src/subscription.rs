//! Realtime row-change dispatch.
//!
//! Change payloads come in two generations: `eventType` / `new` / `old`, and
//! the older `type` / `record` / `old_record`. Both deserialize into
//! [`RowChange`].

use crate::{Error, ItemInput, MutationSummary, RestCache, store::CacheStore};
use restcache_core::{Row, cache::PrimaryKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

///
/// ChangeEvent
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeEvent {
    Insert,
    Update,
    Delete,
}

///
/// RowChange
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RowChange {
    #[serde(rename = "eventType", alias = "type")]
    pub event: ChangeEvent,
    pub schema: String,
    pub table: String,
    #[serde(default, alias = "record", deserialize_with = "non_empty_row")]
    pub new: Option<Row>,
    #[serde(default, alias = "old_record", deserialize_with = "non_empty_row")]
    pub old: Option<Row>,
}

impl RowChange {
    pub fn from_json(payload: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(payload)
    }

    // The record a cache update is built from: the new row, falling back to
    // the old one (deletes usually only carry the old row).
    fn record(&self) -> Option<&Row> {
        match self.event {
            ChangeEvent::Insert | ChangeEvent::Update => self.new.as_ref().or(self.old.as_ref()),
            ChangeEvent::Delete => self.old.as_ref().or(self.new.as_ref()),
        }
    }
}

// Payloads send `{}` rather than null for the side that does not exist.
fn non_empty_row<'de, D>(deserializer: D) -> Result<Option<Row>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let row = Option::<Row>::deserialize(deserializer)?;

    Ok(row.filter(|row| !row.is_empty()))
}

impl RestCache {
    /// Apply one change event to every cached result of its table.
    ///
    /// Primary keys come from the configuration; inserts and updates upsert
    /// the record, deletes remove it.
    pub fn handle_change<S: CacheStore + ?Sized>(
        &mut self,
        change: &RowChange,
        store: &mut S,
    ) -> Result<MutationSummary, Error> {
        let primary_keys = self
            .config()
            .primary_keys(&change.schema, &change.table)
            .ok_or_else(|| Error::unknown_table(&change.schema, &change.table))?;

        let row = change.record().ok_or_else(|| Error::MissingRecord {
            schema: change.schema.clone(),
            table: change.table.clone(),
        })?;

        let input = ItemInput::new(
            change.schema.clone(),
            change.table.clone(),
            PrimaryKey::new(primary_keys.iter().cloned()),
            row.clone(),
        );

        Ok(match change.event {
            ChangeEvent::Insert | ChangeEvent::Update => self.upsert_item(&input, store),
            ChangeEvent::Delete => self.delete_item(&input, store),
        })
    }
}
