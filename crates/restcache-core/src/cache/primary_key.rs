use crate::{Row, filter::value::text, path::lookup};
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};

///
/// PrimaryKey
///
/// Ordered column set identifying a row. Columns may be dotted to reach
/// into embedded objects.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, IntoIterator, PartialEq, Serialize)]
#[into_iterator(owned, ref)]
#[serde(transparent)]
pub struct PrimaryKey(Vec<String>);

impl PrimaryKey {
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(columns.into_iter().map(Into::into).collect())
    }

    /// True iff both rows carry every key column with equal text values.
    ///
    /// Cached payloads round-trip through serialized results, so `1` and
    /// `"1"` are the same key. An empty key never matches.
    #[must_use]
    pub fn matches(&self, left: &Row, right: &Row) -> bool {
        !self.0.is_empty()
            && self
                .0
                .iter()
                .all(|column| match (lookup(left, column), lookup(right, column)) {
                    (Some(left), Some(right)) => text(left) == text(right),
                    _ => false,
                })
    }
}

impl From<Vec<String>> for PrimaryKey {
    fn from(columns: Vec<String>) -> Self {
        Self(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("fixture must be an object"),
        }
    }

    #[test]
    fn composite_keys_compare_every_column() {
        let key = PrimaryKey::new(["id_1", "id_2"]);

        assert!(key.matches(
            &row(json!({ "id_1": "0", "id_2": 1, "value": "a" })),
            &row(json!({ "id_1": 0, "id_2": "1", "value": "b" })),
        ));
        assert!(!key.matches(
            &row(json!({ "id_1": "0", "id_2": "1" })),
            &row(json!({ "id_1": "0", "id_2": "0" })),
        ));
    }

    #[test]
    fn missing_columns_never_match() {
        let key = PrimaryKey::new(["id"]);

        assert!(!key.matches(&row(json!({ "hasMore": true })), &row(json!({ "id": 1 }))));
        assert!(!PrimaryKey::default().matches(&row(json!({})), &row(json!({}))));
    }

    #[test]
    fn dotted_columns_reach_into_objects() {
        let key = PrimaryKey::new(["org.id", "id"]);

        assert!(key.matches(
            &row(json!({ "id": 1, "org": { "id": 7 } })),
            &row(json!({ "id": 1, "org": { "id": 7, "name": "x" } })),
        ));
    }

    #[test]
    fn derefs_to_columns() {
        let key = PrimaryKey::new(["a", "b"]);
        let columns: Vec<&String> = (&key).into_iter().collect();

        assert_eq!(key.len(), 2);
        assert_eq!(columns, ["a", "b"]);
    }
}
