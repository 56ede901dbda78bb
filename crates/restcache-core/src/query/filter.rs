use crate::{
    Row,
    filter::{FilterNode, FilterOptions, RowFilter, eval_all, normalize::normalize},
    path,
    query::QueryDescriptor,
    select::PathDescriptor,
};

///
/// QueryFilter
///
/// Row predicate closed over one parsed query: the capability the mutation
/// engine uses to decide whether a changed row belongs to a cached result.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryFilter {
    filters: Vec<FilterNode>,
    paths: Vec<PathDescriptor>,
}

impl QueryFilter {
    #[must_use]
    pub const fn new(filters: Vec<FilterNode>, paths: Vec<PathDescriptor>) -> Self {
        Self { filters, paths }
    }

    #[must_use]
    pub fn from_descriptor(descriptor: &QueryDescriptor) -> Self {
        Self::new(descriptor.filters.clone(), descriptor.paths.clone())
    }

    #[must_use]
    pub fn filters(&self) -> &[FilterNode] {
        &self.filters
    }

    #[must_use]
    pub fn paths(&self) -> &[PathDescriptor] {
        &self.paths
    }

    /// Copy scoped to the comparisons allowed by `options`; groups survive
    /// even when all of their comparisons are dropped.
    #[must_use]
    pub fn restrict(&self, options: &FilterOptions) -> Self {
        Self {
            filters: normalize(self.filters.clone(), options),
            paths: self.paths.clone(),
        }
    }
}

impl From<&QueryDescriptor> for QueryFilter {
    fn from(descriptor: &QueryDescriptor) -> Self {
        Self::from_descriptor(descriptor)
    }
}

impl RowFilter for QueryFilter {
    fn apply(&self, row: &Row) -> bool {
        eval_all(row, &self.filters)
    }

    // Renamed columns move to their alias; the source column is dropped
    // unless it is also selected under its own name or kept as a key.
    fn project(&self, row: &Row, keep: &[String]) -> Row {
        let mut projected = row.clone();

        for desc in &self.paths {
            let Some(alias) = desc.alias.as_deref() else {
                continue;
            };
            let Some(value) = path::lookup(row, &desc.path) else {
                continue;
            };

            let selected_plain = self
                .paths
                .iter()
                .any(|other| other.alias.is_none() && other.path == desc.path);
            if !selected_plain && !keep.contains(&desc.path) {
                projected.remove(&desc.path);
            }
            path::insert(&mut projected, alias, value.clone());
        }

        projected
    }
}
