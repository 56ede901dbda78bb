use crate::filter::value::{render_in_group, render_param};
use serde_json::Value;
use std::fmt;

///
/// Filter AST
///
/// Pure, schema-agnostic representation of the filters attached to a query.
/// This layer contains no evaluation or canonical ordering. All
/// interpretation occurs in later passes:
///
/// - normalization (exclusive paths, canonical ordering)
/// - alias attachment (canonicalizer)
/// - evaluation against rows
///

///
/// Operator
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    Is,
    Fts,
    Plfts,
    Phfts,
    Wfts,
    In,
    Cs,
    Cd,
}

impl Operator {
    pub const ALL: [Self; 16] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Like,
        Self::Ilike,
        Self::Is,
        Self::Fts,
        Self::Plfts,
        Self::Phfts,
        Self::Wfts,
        Self::In,
        Self::Cs,
        Self::Cd,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::Is => "is",
            Self::Fts => "fts",
            Self::Plfts => "plfts",
            Self::Phfts => "phfts",
            Self::Wfts => "wfts",
            Self::In => "in",
            Self::Cs => "cs",
            Self::Cd => "cd",
        }
    }

    /// Parse the wire token of an operator.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == token)
    }

    /// Operators whose value is a bracketed list literal kept verbatim.
    #[must_use]
    pub const fn takes_list_literal(self) -> bool {
        matches!(self, Self::In | Self::Cs | Self::Cd)
    }

    #[must_use]
    pub const fn is_text_search(self) -> bool {
        matches!(self, Self::Fts | Self::Plfts | Self::Phfts | Self::Wfts)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// GroupKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum GroupKind {
    And,
    Or,
}

impl GroupKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }
}

///
/// Comparison
///
/// `path` is the logical path (embedded resources joined by `.`, JSON arrows
/// kept verbatim); `alias` is the caller-visible name when the select list
/// renamed that path.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comparison {
    pub path: String,
    pub operator: Operator,
    pub negate: bool,
    pub value: Value,
    pub alias: Option<String>,
}

impl Comparison {
    #[must_use]
    pub fn new(path: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            negate: false,
            value: value.into(),
            alias: None,
        }
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Key used to read the compared field from a cached row.
    #[must_use]
    pub fn lookup_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.path)
    }

    /// `[not.]op.value`, the value half of a top-level query parameter.
    #[must_use]
    pub fn param_value(&self) -> String {
        format!(
            "{}{}.{}",
            self.not_prefix(),
            self.operator,
            render_param(self.operator, &self.value)
        )
    }

    /// `path.[not.]op.value`, the clause form used inside logic groups.
    #[must_use]
    pub fn clause(&self) -> String {
        format!(
            "{}.{}{}.{}",
            self.path,
            self.not_prefix(),
            self.operator,
            render_in_group(self.operator, &self.value)
        )
    }

    const fn not_prefix(&self) -> &'static str {
        if self.negate { "not." } else { "" }
    }
}

///
/// FilterNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterNode {
    Comparison(Comparison),
    Group {
        kind: GroupKind,
        children: Vec<Self>,
    },
}

impl FilterNode {
    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::Group {
            kind: GroupKind::And,
            children,
        }
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Group {
            kind: GroupKind::Or,
            children,
        }
    }

    #[must_use]
    pub fn compare(path: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self::Comparison(Comparison::new(path, operator, value))
    }

    /// Re-serialize this node as a top-level `(name, value)` query parameter.
    #[must_use]
    pub fn to_param(&self) -> (String, String) {
        match self {
            Self::Comparison(cmp) => (cmp.path.clone(), cmp.param_value()),
            Self::Group { kind, children } => (
                kind.as_str().to_string(),
                format!("({})", join_clauses(children)),
            ),
        }
    }

    /// Re-serialize this node in the clause form used inside logic groups.
    #[must_use]
    pub fn clause(&self) -> String {
        match self {
            Self::Comparison(cmp) => cmp.clause(),
            Self::Group { kind, children } => {
                format!("{}({})", kind.as_str(), join_clauses(children))
            }
        }
    }

    /// Visit every comparison in this subtree, depth-first.
    pub fn for_each_comparison_mut(&mut self, f: &mut impl FnMut(&mut Comparison)) {
        match self {
            Self::Comparison(cmp) => f(cmp),
            Self::Group { children, .. } => {
                for child in children {
                    child.for_each_comparison_mut(f);
                }
            }
        }
    }
}

impl From<Comparison> for FilterNode {
    fn from(cmp: Comparison) -> Self {
        Self::Comparison(cmp)
    }
}

fn join_clauses(children: &[FilterNode]) -> String {
    children
        .iter()
        .map(FilterNode::clause)
        .collect::<Vec<_>>()
        .join(",")
}
