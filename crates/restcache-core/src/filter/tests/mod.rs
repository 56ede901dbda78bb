mod eval;

use crate::{
    Row,
    filter::{FilterClause, FilterNode, FilterOptions, FilterSource, parse_filters},
};
use serde_json::Value;

fn clauses(pairs: &[(&str, &str)]) -> Vec<FilterClause> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

fn parse_params(pairs: &[(&str, &str)]) -> Vec<FilterNode> {
    parse_filters(
        FilterSource::Clauses(&clauses(pairs)),
        &FilterOptions::default(),
    )
    .expect("filters should parse")
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("fixture must be an object"),
    }
}
