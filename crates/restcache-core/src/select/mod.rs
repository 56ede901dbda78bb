//! Select lists: field grammar and flattening into path descriptors.

mod parse;

#[cfg(test)]
mod tests;

pub use parse::{SelectNode, parse_select};

pub(crate) use parse::canonical_select;

use crate::error::QueryError;

///
/// PathDescriptor
///
/// `path` runs from the query root through embedded-resource names (the
/// referenced table, never the alias or FK hint literal) down to the leaf
/// column, JSON arrows included. `alias` is the caller-visible dotted name,
/// present only when something along the chain was renamed.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PathDescriptor {
    pub alias: Option<String>,
    pub path: String,
}

impl PathDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }

    /// Key under which the field appears in result rows.
    #[must_use]
    pub fn lookup_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.path)
    }
}

/// Extract the flattened path list of a select string.
///
/// Top-level leaves come first in source order, then each embedded resource
/// is expanded in turn (recursively, with the same rule).
pub fn extract_paths(raw_select: &str) -> Result<Vec<PathDescriptor>, QueryError> {
    let nodes = parse_select(raw_select)?;

    Ok(flatten(&nodes))
}

/// Flatten a parsed select tree into path descriptors.
#[must_use]
pub fn flatten(nodes: &[SelectNode]) -> Vec<PathDescriptor> {
    let mut out = Vec::new();

    for node in nodes {
        if let SelectNode::Field { alias, path } = node {
            out.push(PathDescriptor {
                alias: alias.clone(),
                path: path.clone(),
            });
        }
    }

    for node in nodes {
        if let SelectNode::Embedded {
            alias,
            name,
            children,
            ..
        } = node
        {
            let visible = alias.as_deref().unwrap_or(name);

            for inner in flatten(children) {
                // an alias survives if any segment along the chain was renamed
                let renamed = alias.is_some() || inner.alias.is_some();
                let inner_visible = inner.alias.as_deref().unwrap_or(&inner.path);

                out.push(PathDescriptor {
                    alias: renamed.then(|| format!("{visible}.{inner_visible}")),
                    path: format!("{name}.{}", inner.path),
                });
            }
        }
    }

    out
}
