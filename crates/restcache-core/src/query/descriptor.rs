use crate::{
    error::QueryError,
    filter::{FilterNode, FilterOptions, FilterSource, parse_filters},
    obs::{self, MetricsEvent, RejectReason},
    query::{
        CountMode, QueryDescription,
        key::{body_key, render_query_key},
    },
    select::{PathDescriptor, extract_paths},
};

///
/// QueryDescriptor
///
/// Normalized, immutable view of one query description. `query_key` and
/// `body_key` are byte-identical for descriptions that differ only in
/// filter application order or body key order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryDescriptor {
    pub table: String,
    pub is_head: bool,
    pub count: Option<CountMode>,
    pub paths: Vec<PathDescriptor>,
    pub filters: Vec<FilterNode>,
    pub query_key: String,
    pub body_key: Option<String>,
}

impl QueryDescriptor {
    /// Canonicalize a query description.
    ///
    /// Fails on malformed filters or any wildcard selection; there is no
    /// partial result.
    pub fn parse(description: &QueryDescription) -> Result<Self, QueryError> {
        let table = description.target.table_name();
        let result = Self::build(description, table.clone());

        match &result {
            Ok(_) => obs::record(MetricsEvent::QueryParsed { table: &table }),
            Err(err) => obs::record(MetricsEvent::QueryRejected {
                table: &table,
                reason: match err {
                    QueryError::Parse(_) => RejectReason::Parse,
                    QueryError::Wildcard(_) => RejectReason::Wildcard,
                },
            }),
        }

        result
    }

    fn build(description: &QueryDescription, table: String) -> Result<Self, QueryError> {
        let select = description.select_param();
        let paths = match select {
            Some(raw) => extract_paths(raw)?,
            None => Vec::new(),
        };

        let mut filters = parse_filters(
            FilterSource::Clauses(&description.params),
            &FilterOptions::default(),
        )?;
        attach_aliases(&mut filters, &paths);

        Ok(Self {
            table,
            is_head: description.head,
            count: description.count,
            query_key: render_query_key(&filters, select),
            body_key: body_key(description),
            paths,
            filters,
        })
    }
}

// Filters read rows by the caller-visible name when the select list renamed
// the compared path.
fn attach_aliases(filters: &mut [FilterNode], paths: &[PathDescriptor]) {
    for node in filters {
        node.for_each_comparison_mut(&mut |cmp| {
            cmp.alias = paths
                .iter()
                .find(|desc| desc.path == cmp.path)
                .and_then(|desc| desc.alias.clone());
        });
    }
}
