//! Logical path resolution over JSON rows.
//!
//! A logical path is a dotted chain of embedded-resource names ending in a
//! column, optionally followed by JSON arrow segments (`->`, `->>`). Every
//! segment walks one level of nested objects; arrays fan out so that each
//! element is walked independently.

use crate::Row;
use serde_json::Value;

///
/// FieldPresence
///
/// Result of resolving a path on a row. This distinguishes between a
/// missing field and a present field whose value may be `null`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldPresence<'a> {
    /// Every branch of the walk reached the leaf. Arrays along the way
    /// contribute one entry per element.
    Present(Vec<&'a Value>),

    /// At least one branch of the walk ended before the leaf.
    Missing,
}

impl<'a> FieldPresence<'a> {
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    #[must_use]
    pub fn values(&self) -> &[&'a Value] {
        match self {
            Self::Present(values) => values,
            Self::Missing => &[],
        }
    }
}

/// Split a logical path into walk segments.
///
/// `countries.meta->nested->>leaf` yields `countries`, `meta`, `nested`, `leaf`.
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    path.split('.')
        .flat_map(|part| part.split("->"))
        .map(|segment| segment.trim_start_matches('>'))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Resolve `path` on `row`.
#[must_use]
pub fn resolve<'a>(row: &'a Row, path: &str) -> FieldPresence<'a> {
    let segments = segments(path);
    let Some((first, rest)) = segments.split_first() else {
        return FieldPresence::Missing;
    };
    let Some(root) = row.get(*first) else {
        return FieldPresence::Missing;
    };

    let mut out = Vec::new();
    if walk(root, rest, &mut out) {
        FieldPresence::Present(out)
    } else {
        FieldPresence::Missing
    }
}

/// Resolve a path that must not cross arrays, returning the single value.
#[must_use]
pub fn lookup<'a>(row: &'a Row, path: &str) -> Option<&'a Value> {
    let segments = segments(path);
    let (first, rest) = segments.split_first()?;
    let mut current = row.get(*first)?;

    for segment in rest {
        current = current.as_object()?.get(*segment)?;
    }

    Some(current)
}

/// Write `value` at a dotted `path`, creating intermediate objects. A
/// non-object met along the way is replaced.
pub fn insert(row: &mut Row, path: &str, value: Value) {
    let mut parts = path.split('.');
    let Some(mut leaf) = parts.next() else {
        return;
    };
    let mut current = row;

    for next in parts {
        let slot = current
            .entry(leaf.to_string())
            .or_insert_with(|| Value::Object(Row::new()));
        if !slot.is_object() {
            *slot = Value::Object(Row::new());
        }
        let Value::Object(map) = slot else {
            return;
        };
        current = map;
        leaf = next;
    }

    current.insert(leaf.to_string(), value);
}

/// True iff `path` resolves on `row` (a `null` leaf counts as present).
#[must_use]
pub fn has_path(row: &Row, path: &str) -> bool {
    resolve(row, path).is_present()
}

// Walk the remaining segments, collecting leaves; false when any branch is cut short.
fn walk<'a>(value: &'a Value, rest: &[&str], out: &mut Vec<&'a Value>) -> bool {
    let Some((segment, tail)) = rest.split_first() else {
        out.push(value);
        return true;
    };

    match value {
        Value::Object(map) => match map.get(*segment) {
            Some(next) => walk(next, tail, out),
            None => false,
        },
        Value::Array(items) => items.iter().all(|item| walk(item, rest, out)),
        _ => false,
    }
}
