//! Select grammar.
//!
//! ```text
//! list     := item (',' item)*
//! item     := [alias ':'] name ['!' hint]* '(' list ')'    embedded resource
//!           | [alias ':'] column [json-op key]* ['::' cast] field
//! json-op  := '->' | '->>'
//! ```
//!
//! Whitespace outside double quotes is insignificant.

use crate::{
    error::{ParseError, QueryError, WildcardNotSupportedError},
    filter::parse::split_top_level,
};

///
/// SelectNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectNode {
    /// A leaf column, JSON arrows kept in `path`.
    Field { alias: Option<String>, path: String },

    /// An embedded resource. `name` is the resolved table segment; `hint`
    /// is the disambiguation suffix after `!` (FK name or join type).
    Embedded {
        alias: Option<String>,
        name: String,
        hint: Option<String>,
        children: Vec<Self>,
    },
}

/// Parse a select string into a tree. Wildcards are rejected at any depth.
pub fn parse_select(raw: &str) -> Result<Vec<SelectNode>, QueryError> {
    let compact = strip_unquoted_whitespace(raw);

    parse_list(&compact)
}

fn parse_list(input: &str) -> Result<Vec<SelectNode>, QueryError> {
    split_top_level(input)?
        .into_iter()
        .filter(|item| !item.is_empty())
        .map(parse_item)
        .collect()
}

fn parse_item(item: &str) -> Result<SelectNode, QueryError> {
    if let Some(open) = find_unquoted(item, '(') {
        let (head, body) = item.split_at(open);
        let body = body
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ParseError::unbalanced(item))?;

        let (alias, target) = split_alias(head);
        let (name, hint) = match target.split_once('!') {
            Some((name, hint)) => (name, Some(hint.to_string())),
            None => (target, None),
        };
        if name.is_empty() {
            return Err(ParseError::malformed(item).into());
        }

        return Ok(SelectNode::Embedded {
            alias: alias.map(str::to_string),
            name: name.to_string(),
            hint,
            children: parse_list(body)?,
        });
    }

    let (alias, column) = split_alias(item);
    let path = column
        .split_once("::")
        .map_or(column, |(path, _cast)| path);

    if path == "*" || path.ends_with(".*") {
        return Err(WildcardNotSupportedError.into());
    }

    Ok(SelectNode::Field {
        alias: alias.map(str::to_string),
        path: path.to_string(),
    })
}

// `alias:rest`, skipping `::` casts.
fn split_alias(item: &str) -> (Option<&str>, &str) {
    let bytes = item.as_bytes();

    for (idx, byte) in bytes.iter().enumerate() {
        if *byte != b':' {
            continue;
        }
        let doubled = bytes.get(idx + 1) == Some(&b':') || (idx > 0 && bytes[idx - 1] == b':');
        if !doubled {
            return (Some(&item[..idx]), &item[idx + 1..]);
        }
    }

    (None, item)
}

fn find_unquoted(input: &str, needle: char) -> Option<usize> {
    let mut quoted = false;

    for (idx, ch) in input.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            _ if ch == needle && !quoted => return Some(idx),
            _ => {}
        }
    }

    None
}

fn strip_unquoted_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut quoted = false;

    for ch in input.chars() {
        if ch == '"' {
            quoted = !quoted;
        }
        if quoted || !ch.is_whitespace() {
            out.push(ch);
        }
    }

    out
}

/// Whitespace-insensitive canonical form of a select string.
pub(crate) fn canonical_select(raw: &str) -> String {
    strip_unquoted_whitespace(raw)
}
