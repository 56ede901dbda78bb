//! Filter grammar.
//!
//! Top-level parameters come in two shapes:
//!
//! - `path=[not.]op.value` for a single comparison
//! - `[embedded.]or=(clause,...)` / `[embedded.]and=(clause,...)` for groups
//!
//! Group clauses are `path.[not.]op.value` or nested `and(...)` / `or(...)`,
//! separated by commas at depth zero. Quoted strings and `()` / `{}`
//! brackets suspend splitting.

use crate::{
    error::ParseError,
    filter::{
        Comparison, FilterNode, FilterOptions, GroupKind, Operator, normalize::normalize,
        value::decode,
    },
};

// Parameters that configure the request rather than filter it.
const RESERVED_PARAMS: [&str; 6] = ["select", "order", "limit", "offset", "on_conflict", "columns"];

///
/// FilterClause
///
/// One percent-decoded `(name, value)` query parameter.
///

pub type FilterClause = (String, String);

///
/// FilterSource
///

#[derive(Clone, Copy, Debug)]
pub enum FilterSource<'a> {
    /// The body of an `or` filter, e.g. `a.eq.1,and(b.eq.2,c.eq.3)`.
    Expression(&'a str),

    /// Query parameters in application order.
    Clauses(&'a [FilterClause]),
}

/// Parse filters into canonical, normalized trees.
pub fn parse_filters(
    source: FilterSource<'_>,
    options: &FilterOptions,
) -> Result<Vec<FilterNode>, ParseError> {
    let nodes = match source {
        FilterSource::Expression(raw) => {
            let raw = raw.trim();
            let body = strip_parens(raw).unwrap_or(raw);
            vec![FilterNode::or(parse_clause_list(body, "")?)]
        }
        FilterSource::Clauses(clauses) => {
            let mut nodes = Vec::new();
            for (key, value) in clauses {
                if let Some(node) = parse_param(key, value)? {
                    nodes.push(node);
                }
            }
            nodes
        }
    };

    Ok(normalize(nodes, options))
}

/// Parse one top-level query parameter; `None` for non-filter parameters.
pub(crate) fn parse_param(key: &str, value: &str) -> Result<Option<FilterNode>, ParseError> {
    let key = strip_whitespace(key);
    let (prefix, last) = match key.rsplit_once('.') {
        Some((prefix, last)) => (prefix, last),
        None => ("", key.as_str()),
    };

    if RESERVED_PARAMS.contains(&last) {
        return Ok(None);
    }

    if let Some(kind) = GroupKind::parse(last) {
        if prefix == "not" || prefix.ends_with(".not") {
            return Err(ParseError::NegatedGroup { key });
        }

        let value = value.trim();
        let body = strip_parens(value).ok_or_else(|| ParseError::UnwrappedGroup {
            key: key.clone(),
            value: value.to_string(),
        })?;

        return Ok(Some(FilterNode::Group {
            kind,
            children: parse_clause_list(body, prefix)?,
        }));
    }

    let clause = format!("{key}={value}");
    parse_operation(&key, value.trim(), &clause).map(|cmp| Some(cmp.into()))
}

// Parse a comma-separated clause list; `prefix` is prepended to every path.
fn parse_clause_list(body: &str, prefix: &str) -> Result<Vec<FilterNode>, ParseError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    split_top_level(body)?
        .into_iter()
        .map(|clause| parse_clause(clause.trim(), prefix))
        .collect()
}

fn parse_clause(clause: &str, prefix: &str) -> Result<FilterNode, ParseError> {
    if clause.is_empty() {
        return Err(ParseError::malformed(clause));
    }

    if let Some((head, body)) = split_group_clause(clause) {
        if let Some(kind) = GroupKind::parse(head) {
            return Ok(FilterNode::Group {
                kind,
                children: parse_clause_list(body, prefix)?,
            });
        }
        if head == "not.and" || head == "not.or" {
            return Err(ParseError::NegatedGroup {
                key: head.to_string(),
            });
        }
    }

    let (path, operation) = split_leaf(clause)?;
    let path = join_path(prefix, &strip_whitespace(path));

    parse_operation(&path, operation, clause).map(FilterNode::from)
}

// `head(body)` where head is an identifier-ish token and the parens close at the end.
fn split_group_clause(clause: &str) -> Option<(&str, &str)> {
    let open = clause.find('(')?;
    let head = clause[..open].trim();
    let body = strip_parens(&clause[open..])?;

    Some((head, body))
}

// Split `path.[not.]op.value` at the first dot that is followed by an operator.
fn split_leaf(clause: &str) -> Result<(&str, &str), ParseError> {
    for (idx, _) in clause.match_indices('.') {
        let (path, rest) = (&clause[..idx], &clause[idx + 1..]);
        if !path.trim().is_empty() && starts_with_operation(rest) {
            return Ok((path, rest));
        }
    }

    // Diagnose the most likely operator token for a better error.
    let mut parts = clause.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(operator), Some(_)) => Err(ParseError::UnknownOperator {
            operator: operator.to_string(),
            clause: clause.to_string(),
        }),
        _ => Err(ParseError::malformed(clause)),
    }
}

fn starts_with_operation(rest: &str) -> bool {
    let rest = rest.strip_prefix("not.").unwrap_or(rest);

    rest.split_once('.')
        .is_some_and(|(token, _)| Operator::parse(token).is_some())
}

// Parse `[not.]op.value` for `path`.
fn parse_operation(path: &str, operation: &str, clause: &str) -> Result<Comparison, ParseError> {
    if path.is_empty() {
        return Err(ParseError::malformed(clause));
    }

    let (negate, rest) = match operation.strip_prefix("not.") {
        Some(rest) => (true, rest),
        None => (false, operation),
    };

    let (token, raw) = rest
        .split_once('.')
        .ok_or_else(|| ParseError::malformed(clause))?;
    let operator = Operator::parse(token).ok_or_else(|| ParseError::UnknownOperator {
        operator: token.to_string(),
        clause: clause.to_string(),
    })?;

    Ok(Comparison {
        path: path.to_string(),
        operator,
        negate,
        value: decode(operator, raw),
        alias: None,
    })
}

/// Split on commas at depth zero, honouring brackets and double quotes.
pub(crate) fn split_top_level(input: &str) -> Result<Vec<&str>, ParseError> {
    split_at_depth_zero(input, ',')
}

pub(crate) fn split_at_depth_zero(input: &str, delimiter: char) -> Result<Vec<&str>, ParseError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match ch {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '(' | '{' if !quoted => depth += 1,
            ')' | '}' if !quoted => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ParseError::unbalanced(input))?;
            }
            _ if ch == delimiter && !quoted && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }

    if depth != 0 || quoted {
        return Err(ParseError::unbalanced(input));
    }
    parts.push(&input[start..]);

    Ok(parts)
}

// `(body)` -> `body` when the opening paren closes at the very end.
fn strip_parens(input: &str) -> Option<&str> {
    let body = input.strip_prefix('(')?.strip_suffix(')')?;

    // `(a)(b)` is not a single wrapped body.
    let mut depth = 0usize;
    for ch in body.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }

    Some(body)
}

fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{prefix}.{path}")
    }
}

pub(crate) fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|ch| !ch.is_whitespace()).collect()
}
