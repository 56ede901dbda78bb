use thiserror::Error as ThisError;

///
/// ConfigError
///
/// Configuration could not be read or violates a table invariant.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("table '{table}' is configured more than once")]
    DuplicateTable { table: String },

    #[error("table '{table}' declares no primary key columns")]
    EmptyPrimaryKey { table: String },

    #[error("failed to read config '{path}': {message}")]
    Io { path: String, message: String },

    #[error("invalid config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Toml(err.to_string())
    }
}
