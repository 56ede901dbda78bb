//! Deterministic string keys for a query description.
//!
//! Both keys are `&`-joined `name=value` pairs sorted by name then value, so
//! they do not depend on filter application order or body key order.

use crate::{
    error::ParseError,
    filter::{
        FilterNode, FilterOptions, FilterSource, parse::split_at_depth_zero, parse_filters,
        value::text,
    },
    query::{QueryDescription, Target},
    select::canonical_select,
};
use serde_json::Value;

/// Query key of a description: the select parameter plus every filter
/// parameter re-serialized from its canonical tree. Order, limit and
/// offset never contribute.
pub fn query_key(description: &QueryDescription) -> Result<String, ParseError> {
    let filters = parse_filters(
        FilterSource::Clauses(&description.params),
        &FilterOptions::default(),
    )?;

    Ok(render_query_key(&filters, description.select_param()))
}

/// Query key from already-parsed filters.
#[must_use]
pub fn render_query_key(filters: &[FilterNode], select: Option<&str>) -> String {
    let mut params: Vec<(String, String)> = filters.iter().map(FilterNode::to_param).collect();
    if let Some(select) = select {
        params.push(("select".to_string(), canonical_select(select)));
    }

    join_sorted(params)
}

/// Split a rendered query key back into its `(name, value)` parameters.
///
/// Values keep their group parentheses and quoting, so the pairs re-parse
/// to the same filters. An empty key has no parameters.
pub fn parse_query_key(key: &str) -> Result<Vec<(String, String)>, ParseError> {
    if key.is_empty() {
        return Ok(Vec::new());
    }

    split_at_depth_zero(key, '&')?
        .into_iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| ParseError::malformed(pair))
        })
        .collect()
}

/// Body key of a procedure call; `None` for table targets or an absent body.
///
/// Nested objects flatten to `parent.child` keys. Strings are written raw,
/// every other leaf (arrays included) as compact JSON.
#[must_use]
pub fn body_key(description: &QueryDescription) -> Option<String> {
    if !matches!(description.target, Target::Rpc(_)) {
        return None;
    }

    description
        .body
        .as_ref()
        .filter(|body| !body.is_null())
        .map(render_body_key)
}

/// Body key of an arbitrary JSON body.
#[must_use]
pub fn render_body_key(body: &Value) -> String {
    let Value::Object(_) = body else {
        return body.to_string();
    };

    let mut pairs = Vec::new();
    flatten_body("", body, &mut pairs);

    join_sorted(pairs)
}

fn flatten_body(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_body(&key, child, out);
            }
        }
        leaf => out.push((prefix.to_string(), text(leaf).into_owned())),
    }
}

fn join_sorted(mut pairs: Vec<(String, String)>) -> String {
    pairs.sort();

    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}
