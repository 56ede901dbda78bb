use restcache_config::ConfigError;
use restcache_core::error::QueryError;
use thiserror::Error as ThisError;

///
/// Error
///
/// Facade error: configuration, query canonicalization, or a change event
/// that cannot be mapped onto a configured table.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("change event for '{schema}.{table}' carries no record")]
    MissingRecord { schema: String, table: String },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("table '{schema}.{table}' has no configured primary key")]
    UnknownTable { schema: String, table: String },
}

impl Error {
    pub(crate) fn unknown_table(schema: &str, table: &str) -> Self {
        Self::UnknownTable {
            schema: schema.to_string(),
            table: table.to_string(),
        }
    }
}
