//! Cache entry keys.
//!
//! A key is a `$`-joined string:
//!
//! ```text
//! <prefix>[$page]$<schema>$<table>$<query_key>$<body_key|null>$<count|null>$<head|null>
//! ```
//!
//! `page` marks entries that hold a paged (infinite) result. `%` and `$`
//! inside the query and body keys are escaped so the key always splits back
//! into the same segments.

use restcache_core::query::{CountMode, QueryDescriptor};
use std::fmt::{self, Display};

const SEPARATOR: char = '$';
const INFINITE_SEGMENT: &str = "page";
const NULL_SEGMENT: &str = "null";
const HEAD_SEGMENT: &str = "head";

///
/// CacheKey
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CacheKey {
    pub prefix: String,
    pub infinite: bool,
    pub schema: String,
    pub table: String,
    pub query_key: String,
    pub body_key: Option<String>,
    pub count: Option<CountMode>,
    pub head: bool,
}

impl CacheKey {
    #[must_use]
    pub fn for_descriptor(
        prefix: &str,
        schema: &str,
        descriptor: &QueryDescriptor,
        infinite: bool,
    ) -> Self {
        Self {
            prefix: prefix.to_string(),
            infinite,
            schema: schema.to_string(),
            table: descriptor.table.clone(),
            query_key: descriptor.query_key.clone(),
            body_key: descriptor.body_key.clone(),
            count: descriptor.count,
            head: descriptor.is_head,
        }
    }

    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Inverse of [`encode`](Self::encode); `None` for any string that is not
    /// a cache key (wrong segment count, unknown count mode or head flag).
    #[must_use]
    pub fn decode(raw: &str) -> Option<Self> {
        let segments: Vec<&str> = raw.split(SEPARATOR).collect();
        let (prefix, infinite, rest) = match segments.as_slice() {
            [prefix, rest @ ..] if rest.len() == 6 => (*prefix, false, rest),
            [prefix, page, rest @ ..] if rest.len() == 6 && *page == INFINITE_SEGMENT => {
                (*prefix, true, rest)
            }
            _ => return None,
        };
        let [schema, table, query_key, body_key, count, head] = rest else {
            return None;
        };

        let count = match *count {
            NULL_SEGMENT => None,
            token => Some(CountMode::parse(token)?),
        };
        let head = match *head {
            NULL_SEGMENT => false,
            HEAD_SEGMENT => true,
            _ => return None,
        };
        let body_key = match *body_key {
            NULL_SEGMENT => None,
            encoded => Some(unescape(encoded)?),
        };

        Some(Self {
            prefix: prefix.to_string(),
            infinite,
            schema: (*schema).to_string(),
            table: (*table).to_string(),
            query_key: unescape(query_key)?,
            body_key,
            count,
            head,
        })
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix)?;
        if self.infinite {
            write!(f, "{SEPARATOR}{INFINITE_SEGMENT}")?;
        }
        write!(
            f,
            "{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.schema,
            self.table,
            escape(&self.query_key)
        )?;

        let body = self.body_key.as_deref().map_or_else(|| NULL_SEGMENT.to_string(), escape);
        let count = self.count.map_or(NULL_SEGMENT, CountMode::as_str);
        let head = if self.head { HEAD_SEGMENT } else { NULL_SEGMENT };

        write!(f, "{SEPARATOR}{body}{SEPARATOR}{count}{SEPARATOR}{head}")
    }
}

fn escape(segment: &str) -> String {
    segment.replace('%', "%25").replace(SEPARATOR, "%24")
}

fn unescape(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;

    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let code = rest.get(idx + 1..idx + 3)?;
        out.push(match code {
            "25" => '%',
            "24" => SEPARATOR,
            _ => return None,
        });
        rest = &rest[idx + 3..];
    }
    out.push_str(rest);

    Some(out)
}
