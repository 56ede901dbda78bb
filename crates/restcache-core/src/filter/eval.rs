use crate::{
    Row,
    filter::{
        Comparison, FilterNode, GroupKind, Operator,
        value::{list_items, loose_cmp, loose_eq, text},
    },
    path::{self, FieldPresence},
};
use serde_json::Value;
use std::cmp::Ordering;

///
/// RowFilter
///
/// Capability handed to the mutation engine: does a row belong to a cached
/// query's result set, and does it carry the columns needed to place it.
///

pub trait RowFilter {
    /// True iff `row` satisfies every filter of the query.
    fn apply(&self, row: &Row) -> bool;

    /// True iff every path in `required` is present on `row`.
    fn has_paths(&self, row: &Row, required: &[String]) -> bool {
        required.iter().all(|required| path::has_path(row, required))
    }

    /// Reshape a changed row, keyed by real column names, into the form the
    /// query's cached rows take. Columns in `keep` stay under their own name.
    fn project(&self, row: &Row, _keep: &[String]) -> Row {
        row.clone()
    }
}

///
/// Evaluate a filter list against a row (implicit AND).
///
#[must_use]
pub fn eval_all(row: &Row, nodes: &[FilterNode]) -> bool {
    nodes.iter().all(|node| eval(row, node))
}

///
/// Evaluate a single filter node against a row.
///
/// This function performs **pure runtime evaluation**: no schema access, no
/// coercion beyond the loose literal rules in `filter::value`. A missing
/// field makes a comparison false (negated or not); `is.null` is the one
/// operator that also matches a missing field.
///
#[must_use]
pub fn eval(row: &Row, node: &FilterNode) -> bool {
    match node {
        FilterNode::Group {
            kind: GroupKind::And,
            children,
        } => children.iter().all(|child| eval(row, child)),
        FilterNode::Group {
            kind: GroupKind::Or,
            children,
        } => children.iter().any(|child| eval(row, child)),
        FilterNode::Comparison(cmp) => eval_comparison(row, cmp),
    }
}

fn eval_comparison(row: &Row, cmp: &Comparison) -> bool {
    let values = match path::resolve(row, cmp.lookup_key()) {
        FieldPresence::Present(values) => values,
        FieldPresence::Missing => {
            return cmp.operator == Operator::Is && cmp.value.is_null() && !cmp.negate;
        }
    };

    let matched = values
        .iter()
        .any(|actual| eval_operator(cmp.operator, actual, &cmp.value));

    matched != cmp.negate
}

fn eval_operator(operator: Operator, actual: &Value, expected: &Value) -> bool {
    match operator {
        Operator::Eq => loose_eq(actual, expected),
        Operator::Neq => !actual.is_null() && !loose_eq(actual, expected),

        Operator::Gt => loose_cmp(actual, expected).is_some_and(Ordering::is_gt),
        Operator::Gte => loose_cmp(actual, expected).is_some_and(Ordering::is_ge),
        Operator::Lt => loose_cmp(actual, expected).is_some_and(Ordering::is_lt),
        Operator::Lte => loose_cmp(actual, expected).is_some_and(Ordering::is_le),

        Operator::Like => !actual.is_null() && like(&text(actual), &text(expected)),
        Operator::Ilike => {
            !actual.is_null()
                && like(
                    &text(actual).to_lowercase(),
                    &text(expected).to_lowercase(),
                )
        }

        Operator::Is => is(actual, expected),

        Operator::Fts | Operator::Plfts | Operator::Phfts | Operator::Wfts => {
            !actual.is_null() && text_search(&text(actual), &text(expected))
        }

        Operator::In => list_items(&text(expected))
            .is_some_and(|items| items.iter().any(|item| loose_eq(actual, item))),
        Operator::Cs => contains(actual, expected),
        Operator::Cd => contained_by(actual, expected),
    }
}

// `is` accepts null, booleans, and `unknown` (null for booleans).
fn is(actual: &Value, expected: &Value) -> bool {
    match expected {
        Value::Null => actual.is_null(),
        Value::Bool(expected) => actual.as_bool() == Some(*expected),
        Value::String(keyword) if keyword == "unknown" => actual.is_null(),
        _ => false,
    }
}

///
/// SQL `LIKE` matching: `%` (or `*`, the URL-safe spelling) matches any run,
/// `_` any single character, `\` escapes the next character.
///
fn like(input: &str, pattern: &str) -> bool {
    let input: Vec<char> = input.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    // reachable[i] == true when pattern[..p] can match input[..i]
    let mut reachable = vec![false; input.len() + 1];
    reachable[0] = true;

    let mut p = 0;
    while p < pattern.len() {
        let (token, literal) = match pattern[p] {
            '\\' if p + 1 < pattern.len() => {
                p += 1;
                (pattern[p], true)
            }
            ch => (ch, false),
        };
        p += 1;

        let mut next = vec![false; input.len() + 1];
        if !literal && (token == '%' || token == '*') {
            let mut seen = false;
            for (idx, slot) in next.iter_mut().enumerate() {
                seen |= reachable[idx];
                *slot = seen;
            }
        } else {
            for idx in 0..input.len() {
                if reachable[idx] && ((!literal && token == '_') || input[idx] == token) {
                    next[idx + 1] = true;
                }
            }
        }
        reachable = next;
    }

    reachable[input.len()]
}

///
/// Approximate full-text search: every search term must appear as a word
/// of the document, ignoring case and tsquery operators.
///
fn text_search(document: &str, query: &str) -> bool {
    let words = tokenize(document);

    tokenize(query)
        .iter()
        .all(|term| words.iter().any(|word| word == term))
}

fn tokenize(input: &str) -> Vec<String> {
    input
        .split(|ch: char| !ch.is_alphanumeric() && ch != '_')
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

///
/// `cs`: the actual collection contains every expected item. Objects use
/// JSON containment; scalars fall back to equality.
///
fn contains(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) => expected_items(expected).is_some_and(|needles| {
            needles
                .iter()
                .all(|needle| items.iter().any(|item| loose_eq(item, needle)))
        }),
        Value::Object(_) => expected_json(expected).is_some_and(|needle| json_contains(actual, &needle)),
        Value::Null => false,
        scalar => loose_eq(scalar, expected),
    }
}

///
/// `cd`: every item of the actual collection appears in the expected list.
///
fn contained_by(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) => expected_items(expected).is_some_and(|allowed| {
            items
                .iter()
                .all(|item| allowed.iter().any(|candidate| loose_eq(item, candidate)))
        }),
        Value::Object(_) => expected_json(expected).is_some_and(|outer| json_contains(&outer, actual)),
        Value::Null => false,
        scalar => loose_eq(scalar, expected),
    }
}

fn expected_items(expected: &Value) -> Option<Vec<Value>> {
    match expected {
        Value::Array(items) => Some(items.clone()),
        Value::String(literal) => list_items(literal),
        scalar => Some(vec![scalar.clone()]),
    }
}

fn expected_json(expected: &Value) -> Option<Value> {
    match expected {
        Value::String(literal) => serde_json::from_str(literal).ok(),
        other => Some(other.clone()),
    }
}

// JSON containment in the `@>` sense.
fn json_contains(outer: &Value, inner: &Value) -> bool {
    match (outer, inner) {
        (Value::Object(outer), Value::Object(inner)) => inner.iter().all(|(key, value)| {
            outer
                .get(key)
                .is_some_and(|candidate| json_contains(candidate, value))
        }),
        (Value::Array(outer), Value::Array(inner)) => inner
            .iter()
            .all(|value| outer.iter().any(|candidate| json_contains(candidate, value))),
        (outer, inner) => loose_eq(outer, inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_handles_wildcards_and_escapes() {
        assert!(like("TEST value", "%TEST%"));
        assert!(like("abc", "a_c"));
        assert!(like("abc", "a*"));
        assert!(!like("abc", "a_"));
        assert!(like("50%", "50\\%"));
        assert!(!like("500", "50\\%"));
        assert!(like("", "%"));
    }

    #[test]
    fn text_search_matches_all_terms() {
        assert!(text_search("Te quiero, me amas", "te me"));
        assert!(text_search("the fat cat", "'fat' & 'cat'"));
        assert!(!text_search("the fat cat", "dog"));
    }
}
