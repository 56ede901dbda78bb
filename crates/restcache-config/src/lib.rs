//! Table and key configuration for restcache.
//!
//! ```toml
//! key_prefix = "restcache"
//! default_schema = "public"
//!
//! [tables.contact]
//! primary_keys = ["id"]
//!
//! [tables."crm.organisation"]
//! primary_keys = ["tenant_id", "id"]
//! ```
//!
//! A table entry is named `table` or `schema.table`; an explicit `schema`
//! field wins over the dotted prefix, and the default schema applies when
//! neither is given.

mod error;

pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

pub const DEFAULT_KEY_PREFIX: &str = "restcache";
pub const DEFAULT_SCHEMA: &str = "public";

///
/// RestCacheConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RestCacheConfig {
    pub key_prefix: String,
    pub default_schema: String,
    pub tables: BTreeMap<String, TableConfig>,
}

impl Default for RestCacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            default_schema: DEFAULT_SCHEMA.to_string(),
            tables: BTreeMap::new(),
        }
    }
}

///
/// TableConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub primary_keys: Vec<String>,
    #[serde(default)]
    pub schema: Option<String>,
}

impl RestCacheConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;

        Self::from_toml_str(&source)
    }

    /// Every table must declare a key, and no two entries may resolve to
    /// the same `schema.table`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();

        for (name, table) in &self.tables {
            let (schema, table_name) = self.resolve(name, table);
            let qualified = format!("{schema}.{table_name}");

            if table.primary_keys.is_empty() {
                return Err(ConfigError::EmptyPrimaryKey { table: qualified });
            }
            if !seen.insert(qualified.clone()) {
                return Err(ConfigError::DuplicateTable { table: qualified });
            }
        }

        Ok(())
    }

    /// Primary key columns of `schema.table`, if configured.
    #[must_use]
    pub fn primary_keys(&self, schema: &str, table: &str) -> Option<&[String]> {
        self.tables
            .iter()
            .find(|(name, config)| self.resolve(name, config) == (schema, table))
            .map(|(_, config)| config.primary_keys.as_slice())
    }

    /// Register a table programmatically.
    #[must_use]
    pub fn with_table<I, S>(mut self, name: impl Into<String>, primary_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables.insert(
            name.into(),
            TableConfig {
                primary_keys: primary_keys.into_iter().map(Into::into).collect(),
                schema: None,
            },
        );
        self
    }

    // (schema, table) an entry applies to.
    fn resolve<'a>(&'a self, name: &'a str, table: &'a TableConfig) -> (&'a str, &'a str) {
        let (prefix, table_name) = match name.split_once('.') {
            Some((schema, table_name)) => (Some(schema), table_name),
            None => (None, name),
        };
        let schema = table
            .schema
            .as_deref()
            .or(prefix)
            .unwrap_or(&self.default_schema);

        (schema, table_name)
    }
}
