//! Filter literal decoding, rendering, and comparison helpers.
//!
//! Cached rows round-trip through serialized query results, so comparisons
//! here are deliberately loose: numbers compare numerically whether they
//! arrive as JSON numbers or numeric strings, everything else compares by
//! its text form.

use crate::filter::Operator;
use serde_json::{Number, Value};
use std::{borrow::Cow, cmp::Ordering};

// Characters that would break clause splitting inside a logic group.
const GROUP_RESERVED: [char; 4] = [',', '(', ')', '"'];

// Characters that would break parameter splitting of a rendered query key.
const PARAM_RESERVED: [char; 4] = ['&', '(', ')', '"'];

/// Decode a raw filter literal for `operator`.
///
/// List operators keep bracketed literals verbatim; otherwise integers and
/// decimals become numbers, `true`/`false` booleans, `null` null, and
/// double-quoted literals are unquoted without further decoding.
#[must_use]
pub fn decode(operator: Operator, raw: &str) -> Value {
    if operator.takes_list_literal() && raw.starts_with(['(', '{', '[']) {
        return Value::String(raw.to_string());
    }

    if let Some(unquoted) = unquote(raw) {
        return Value::String(unquoted);
    }

    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => decode_number(raw).map_or_else(|| Value::String(raw.to_string()), Value::Number),
    }
}

/// Render a decoded literal back into its wire form.
#[must_use]
pub fn render(value: &Value) -> String {
    text(value).into_owned()
}

/// Render a literal for use inside a logic group, quoting strings that
/// contain clause delimiters.
#[must_use]
pub fn render_in_group(operator: Operator, value: &Value) -> String {
    render_quoted(operator, value, &GROUP_RESERVED)
}

/// Render a literal as a top-level parameter value, quoting strings that
/// contain parameter delimiters.
#[must_use]
pub fn render_param(operator: Operator, value: &Value) -> String {
    render_quoted(operator, value, &PARAM_RESERVED)
}

fn render_quoted(operator: Operator, value: &Value, reserved: &[char]) -> String {
    let Value::String(text) = value else {
        return render(value);
    };

    let list_literal = operator.takes_list_literal() && text.starts_with(['(', '{', '[']);
    if list_literal || !text.contains(reserved) {
        return text.clone();
    }

    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Text form of a value: strings verbatim, everything else as JSON.
#[must_use]
pub fn text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        Value::Null => Cow::Borrowed("null"),
        other => Cow::Owned(other.to_string()),
    }
}

/// Loose equality used by filter evaluation.
#[must_use]
pub fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (numeric(actual), numeric(expected)) {
        (Some(left), Some(right)) => compare_numbers(&left, &right) == Some(Ordering::Equal),
        _ => text(actual) == text(expected),
    }
}

/// Loose ordering used by range operators; `None` when either side is null.
#[must_use]
pub fn loose_cmp(actual: &Value, expected: &Value) -> Option<Ordering> {
    if actual.is_null() || expected.is_null() {
        return None;
    }

    match (numeric(actual), numeric(expected)) {
        (Some(left), Some(right)) => compare_numbers(&left, &right),
        _ => Some(text(actual).cmp(&text(expected))),
    }
}

/// Split a list literal such as `(a,b)`, `{a,"b,c"}` or `[1,2]` into items.
#[must_use]
pub fn list_items(literal: &str) -> Option<Vec<Value>> {
    if literal.starts_with('[') {
        return match serde_json::from_str::<Value>(literal).ok()? {
            Value::Array(items) => Some(items),
            _ => None,
        };
    }

    let inner = literal
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .or_else(|| {
            literal
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
        })?;

    if inner.trim().is_empty() {
        return Some(Vec::new());
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;

    for ch in inner.chars() {
        match ch {
            _ if escaped => {
                current.push(ch);
                escaped = false;
            }
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ',' if !quoted => items.push(Value::String(std::mem::take(&mut current))),
            _ => current.push(ch),
        }
    }
    items.push(Value::String(current));

    Some(items)
}

// Strip surrounding double quotes and unescape `\"` / `\\`.
fn unquote(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for ch in inner.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else {
            out.push(ch);
        }
    }

    Some(out)
}

// Decimal literals only: `-?digits(.digits)?`. Exponents and signs other
// than a leading minus stay textual.
fn decode_number(raw: &str) -> Option<Number> {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int) || frac.is_some_and(|frac| !all_digits(frac)) {
        return None;
    }

    if frac.is_none() {
        if let Ok(int) = raw.parse::<i64>() {
            return Some(Number::from(int));
        }
        if let Ok(int) = raw.parse::<u64>() {
            return Some(Number::from(int));
        }
    }

    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

fn numeric(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) => Some(number.clone()),
        Value::String(text) => decode_number(text),
        _ => None,
    }
}

// Integers compare exactly; only a float on either side falls back to f64.
fn compare_numbers(left: &Number, right: &Number) -> Option<Ordering> {
    match (integer(left), integer(right)) {
        (Some(left), Some(right)) => Some(left.cmp(&right)),
        _ => left.as_f64()?.partial_cmp(&right.as_f64()?),
    }
}

fn integer(number: &Number) -> Option<i128> {
    number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from))
}
