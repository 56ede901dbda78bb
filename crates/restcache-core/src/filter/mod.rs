//! Filter expressions: AST, grammar, normalization, and row evaluation.

mod ast;
pub(crate) mod eval;
pub(crate) mod normalize;
pub(crate) mod parse;
pub mod value;

#[cfg(test)]
mod tests;

pub use ast::{Comparison, FilterNode, GroupKind, Operator};
pub use eval::{RowFilter, eval, eval_all};
pub use parse::{FilterClause, FilterSource, parse_filters};

use std::collections::BTreeSet;

///
/// FilterOptions
///
/// `exclusive_paths` scopes parsing to a subset of columns: comparisons on
/// any other path are dropped. `None` keeps everything.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterOptions {
    pub exclusive_paths: Option<BTreeSet<String>>,
}

impl FilterOptions {
    #[must_use]
    pub fn exclusive<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclusive_paths: Some(paths.into_iter().map(Into::into).collect()),
        }
    }

    #[must_use]
    pub fn includes(&self, path: &str) -> bool {
        self.exclusive_paths
            .as_ref()
            .is_none_or(|paths| paths.contains(path))
    }
}
