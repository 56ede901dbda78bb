use crate::Row;
use serde_json::{Map, Value};
use thiserror::Error as ThisError;

///
/// ShapeError
///
/// A JSON document that is none of the four cache container shapes.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ShapeError {
    #[error("cache count must be a non-negative integer, got {found}")]
    InvalidCount { found: String },

    #[error("cache pages must all be arrays of objects")]
    MixedPages,

    #[error("cache row at index {index} is not an object")]
    NonObjectRow { index: usize },

    #[error("unsupported cache value: {found}")]
    Unsupported { found: &'static str },
}

///
/// CacheValue
///
/// One cached query result. `Single` and `CountedArray` mirror the
/// `{ "data": ..., "count": ... }` response envelope; `Paged` holds the
/// pages of an infinite query in fetch order.
///
/// A `Single` with `bare` set was cached as the row object itself, without
/// an envelope. It encodes back the same way, and as `null` once its row
/// is gone.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CacheValue {
    Single { row: Option<Row>, bare: bool },
    Array(Vec<Row>),
    CountedArray { data: Vec<Row>, count: Count },
    Paged(Vec<Vec<Row>>),
}

///
/// Count
///
/// The `count` member of a counted envelope, kept as it was cached so a
/// missing or null count is written back unchanged.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Count {
    Absent,
    Null,
    Exact(u64),
}

impl Count {
    /// Shift an exact count by inserted and removed rows.
    #[must_use]
    pub const fn adjust(self, inserted: u64, removed: u64) -> Self {
        match self {
            Self::Exact(count) => {
                Self::Exact(count.saturating_add(inserted).saturating_sub(removed))
            }
            other => other,
        }
    }

    fn decode(value: Option<Value>) -> Result<Self, ShapeError> {
        match value {
            None => Ok(Self::Absent),
            Some(Value::Null) => Ok(Self::Null),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Self::Exact)
                .ok_or_else(|| ShapeError::InvalidCount {
                    found: n.to_string(),
                }),
            Some(other) => Err(ShapeError::InvalidCount {
                found: other.to_string(),
            }),
        }
    }

    fn encode(self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Null => Some(Value::Null),
            Self::Exact(count) => Some(Value::from(count)),
        }
    }
}

impl CacheValue {
    /// Enveloped single-row result.
    #[must_use]
    pub const fn single(row: Option<Row>) -> Self {
        Self::Single { row, bare: false }
    }

    /// Single row cached without an envelope.
    #[must_use]
    pub const fn bare(row: Row) -> Self {
        Self::Single {
            row: Some(row),
            bare: true,
        }
    }

    /// Decode a cached JSON document. `null` is an absent entry.
    ///
    /// Shapes: an array of arrays is paged, any other array a plain row
    /// list, an object with an array `data` a counted array, an object with
    /// object or null `data` a single row, and any other object a bare
    /// single row.
    pub fn from_json(value: Value) -> Result<Option<Self>, ShapeError> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => decode_array(items).map(Some),
            Value::Object(mut map) => {
                let Some(data) = map.remove("data") else {
                    return Ok(Some(Self::bare(map)));
                };

                match data {
                    Value::Array(items) => {
                        let data = decode_rows(items)?;
                        let count = Count::decode(map.remove("count"))?;
                        Ok(Some(Self::CountedArray { data, count }))
                    }
                    Value::Object(row) => Ok(Some(Self::single(Some(row)))),
                    Value::Null => Ok(Some(Self::single(None))),
                    other => Err(ShapeError::Unsupported {
                        found: kind_name(&other),
                    }),
                }
            }
            other => Err(ShapeError::Unsupported {
                found: kind_name(&other),
            }),
        }
    }

    /// Encode back into the cached JSON document.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::Single { row, bare: true } => row.map_or(Value::Null, Value::Object),
            Self::Single { row, bare: false } => {
                let mut envelope = Map::new();
                envelope.insert("data".to_string(), row.map_or(Value::Null, Value::Object));
                Value::Object(envelope)
            }
            Self::Array(rows) => rows_json(rows),
            Self::CountedArray { data, count } => {
                let mut envelope = Map::new();
                envelope.insert("data".to_string(), rows_json(data));
                if let Some(count) = count.encode() {
                    envelope.insert("count".to_string(), count);
                }
                Value::Object(envelope)
            }
            Self::Paged(pages) => Value::Array(pages.into_iter().map(rows_json).collect()),
        }
    }

    /// Total cached rows across every page.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::Single { row, .. } => usize::from(row.is_some()),
            Self::Array(rows) | Self::CountedArray { data: rows, .. } => rows.len(),
            Self::Paged(pages) => pages.iter().map(Vec::len).sum(),
        }
    }
}

fn decode_array(items: Vec<Value>) -> Result<CacheValue, ShapeError> {
    let paged = items.first().is_some_and(Value::is_array);
    if !paged {
        return decode_rows(items).map(CacheValue::Array);
    }

    items
        .into_iter()
        .map(|page| match page {
            Value::Array(rows) => decode_rows(rows),
            _ => Err(ShapeError::MixedPages),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CacheValue::Paged)
}

fn decode_rows(items: Vec<Value>) -> Result<Vec<Row>, ShapeError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(row) => Ok(row),
            _ => Err(ShapeError::NonObjectRow { index }),
        })
        .collect()
}

fn rows_json(rows: Vec<Row>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
