mod key;
mod property;

use crate::Row;
use serde_json::Value;

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("fixture must be an object"),
    }
}
