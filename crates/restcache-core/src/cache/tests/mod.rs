
use crate::{Row, cache::PrimaryKey, filter::RowFilter};
use serde_json::Value;

///
/// StubFilter
///
/// Fixed answers for `apply` and `has_paths`.
///

#[derive(Clone, Copy, Debug)]
struct StubFilter {
    apply: bool,
    has_paths: bool,
}

impl StubFilter {
    const fn new(apply: bool, has_paths: bool) -> Self {
        Self { apply, has_paths }
    }
}

impl RowFilter for StubFilter {
    fn apply(&self, _: &Row) -> bool {
        self.apply
    }

    fn has_paths(&self, _: &Row, _: &[String]) -> bool {
        self.has_paths
    }
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("fixture must be an object"),
    }
}

fn item(id_1: &str, id_2: &str, value: &str) -> Row {
    row(serde_json::json!({ "id_1": id_1, "id_2": id_2, "value": value }))
}

fn composite_key() -> PrimaryKey {
    PrimaryKey::new(["id_1", "id_2"])
}
