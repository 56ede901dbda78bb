use crate::filter::Operator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display};

///
/// Target
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Target {
    Table(String),
    Rpc(String),
}

impl Target {
    /// Name used for cache keys and descriptors; `rpc/<name>` for procedures.
    #[must_use]
    pub fn table_name(&self) -> String {
        match self {
            Self::Table(name) => name.clone(),
            Self::Rpc(name) => format!("rpc/{name}"),
        }
    }

    #[must_use]
    pub const fn is_rpc(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

///
/// CountMode
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    Exact,
    Planned,
    Estimated,
}

impl CountMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Planned => "planned",
            Self::Estimated => "estimated",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "exact" => Some(Self::Exact),
            "planned" => Some(Self::Planned),
            "estimated" => Some(Self::Estimated),
            _ => None,
        }
    }
}

impl Display for CountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TextSearchKind
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextSearchKind {
    #[default]
    Default,
    Plain,
    Phrase,
    Websearch,
}

impl TextSearchKind {
    const fn operator(self) -> Operator {
        match self {
            Self::Default => Operator::Fts,
            Self::Plain => Operator::Plfts,
            Self::Phrase => Operator::Phfts,
            Self::Websearch => Operator::Wfts,
        }
    }
}

///
/// QueryDescription
///
/// An already-built request as the query layer would send it: target,
/// percent-decoded query parameters in application order, request body, and
/// head/count options. Builder methods append parameters in the same wire
/// form the external query builder produces.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct QueryDescription {
    pub target: Target,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    pub head: bool,
    pub count: Option<CountMode>,
}

impl QueryDescription {
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::new(Target::Table(name.into()))
    }

    #[must_use]
    pub fn rpc(name: impl Into<String>, body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(Target::Rpc(name.into()))
        }
    }

    #[must_use]
    pub const fn new(target: Target) -> Self {
        Self {
            target,
            params: Vec::new(),
            body: None,
            head: false,
            count: None,
        }
    }

    /// Decode a serialized request path and query string.
    ///
    /// `/rpc/<name>` maps to a procedure target, anything else to the last
    /// path segment. Returns `None` when the path names nothing.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let url = url.split_once('#').map_or(url, |(head, _)| head);
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let target = match segments.as_slice() {
            [.., "rpc", name] => Target::Rpc(percent_decode(name)),
            [.., name] => Target::Table(percent_decode(name)),
            [] => return None,
        };

        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(key), percent_decode(value))
            })
            .collect();

        Some(Self {
            params,
            ..Self::new(target)
        })
    }

    /// The last `select` parameter, if any.
    #[must_use]
    pub fn select_param(&self) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(key, _)| key == "select")
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub const fn head(mut self) -> Self {
        self.head = true;
        self
    }

    #[must_use]
    pub const fn count(mut self, mode: CountMode) -> Self {
        self.count = Some(mode);
        self
    }

    #[must_use]
    pub fn select(self, columns: &str) -> Self {
        self.set_param("select", columns)
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Eq, value)
    }

    #[must_use]
    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Neq, value)
    }

    #[must_use]
    pub fn gt(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Gt, value)
    }

    #[must_use]
    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Gte, value)
    }

    #[must_use]
    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Lt, value)
    }

    #[must_use]
    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Lte, value)
    }

    #[must_use]
    pub fn like(self, column: &str, pattern: &str) -> Self {
        self.compare(column, Operator::Like, pattern)
    }

    #[must_use]
    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.compare(column, Operator::Ilike, pattern)
    }

    /// `value` is `null`, `true` or `false`.
    #[must_use]
    pub fn is(self, column: &str, value: Option<bool>) -> Self {
        let value = value.map_or_else(|| "null".to_string(), |flag| flag.to_string());
        self.compare(column, Operator::Is, value)
    }

    #[must_use]
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let items = values
            .into_iter()
            .map(|value| quote_reserved(&value.to_string()))
            .collect::<Vec<_>>()
            .join(",");

        self.compare(column, Operator::In, format!("({items})"))
    }

    #[must_use]
    pub fn contains(self, column: &str, value: &Value) -> Self {
        self.compare(column, Operator::Cs, containment_literal(value))
    }

    #[must_use]
    pub fn contained_by(self, column: &str, value: &Value) -> Self {
        self.compare(column, Operator::Cd, containment_literal(value))
    }

    #[must_use]
    pub fn text_search(self, column: &str, query: &str, kind: TextSearchKind) -> Self {
        self.compare(column, kind.operator(), query)
    }

    #[must_use]
    pub fn not(self, column: &str, operator: Operator, value: impl Display) -> Self {
        self.push_param(column, format!("not.{operator}.{value}"))
    }

    /// Raw escape hatch: `operator` is written verbatim.
    #[must_use]
    pub fn filter(self, column: &str, operator: &str, value: impl Display) -> Self {
        self.push_param(column, format!("{operator}.{value}"))
    }

    #[must_use]
    pub fn or(self, filters: &str) -> Self {
        self.push_param("or", format!("({filters})"))
    }

    /// `or` scoped to an embedded resource.
    #[must_use]
    pub fn or_foreign(self, foreign_table: &str, filters: &str) -> Self {
        self.push_param(format!("{foreign_table}.or"), format!("({filters})"))
    }

    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool, nulls_first: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        let nulls = if nulls_first { "nullsfirst" } else { "nullslast" };
        let term = format!("{column}.{direction}.{nulls}");

        if let Some((_, existing)) = self.params.iter_mut().find(|(key, _)| key == "order") {
            existing.push(',');
            existing.push_str(&term);
        } else {
            self.params.push(("order".to_string(), term));
        }

        self
    }

    #[must_use]
    pub fn limit(self, count: u64) -> Self {
        self.set_param("limit", count)
    }

    /// Inclusive row range, written as `offset` + `limit`.
    #[must_use]
    pub fn range(self, from: u64, to: u64) -> Self {
        let limit = to.saturating_sub(from).saturating_add(1);

        self.set_param("offset", from).set_param("limit", limit)
    }

    fn compare(self, column: &str, operator: Operator, value: impl Display) -> Self {
        self.push_param(column, format!("{operator}.{value}"))
    }

    fn push_param(mut self, key: impl Into<String>, value: String) -> Self {
        self.params.push((key.into(), value));
        self
    }

    fn set_param(mut self, key: &str, value: impl Display) -> Self {
        self.params.retain(|(existing, _)| existing != key);
        self.params.push((key.to_string(), value.to_string()));
        self
    }
}

// Quote list items that would otherwise split the literal.
fn quote_reserved(item: &str) -> String {
    if item.contains([',', '(', ')']) {
        format!("\"{item}\"")
    } else {
        item.to_string()
    }
}

fn containment_literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| crate::filter::value::text(item).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            format!("{{{items}}}")
        }
        other => other.to_string(),
    }
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;

    while idx < bytes.len() {
        match bytes[idx] {
            b'+' => {
                out.push(b' ');
                idx += 1;
            }
            b'%' => {
                let high = bytes.get(idx + 1).and_then(|b| hex_digit(*b));
                let low = bytes.get(idx + 2).and_then(|b| hex_digit(*b));
                if let (Some(high), Some(low)) = (high, low) {
                    out.push((high << 4) | low);
                    idx += 3;
                } else {
                    out.push(b'%');
                    idx += 1;
                }
            }
            byte => {
                out.push(byte);
                idx += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_writes_wire_parameters() {
        let desc = QueryDescription::table("contact")
            .select("id,name")
            .eq("id", 1)
            .in_list("tag", ["a", "b,c"])
            .contains("tags", &json!(["x", "y"]))
            .is("deleted_at", None)
            .not("age", Operator::Gt, 30)
            .range(10, 19);

        assert_eq!(
            desc.params,
            vec![
                ("select".to_string(), "id,name".to_string()),
                ("id".to_string(), "eq.1".to_string()),
                ("tag".to_string(), "in.(a,\"b,c\")".to_string()),
                ("tags".to_string(), "cs.{x,y}".to_string()),
                ("deleted_at".to_string(), "is.null".to_string()),
                ("age".to_string(), "not.gt.30".to_string()),
                ("offset".to_string(), "10".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn order_terms_accumulate() {
        let desc = QueryDescription::table("contact")
            .order("name", true, false)
            .order("id", false, true);

        assert_eq!(
            desc.params,
            vec![(
                "order".to_string(),
                "name.asc.nullslast,id.desc.nullsfirst".to_string()
            )]
        );
    }

    #[test]
    fn from_url_decodes_table_requests() {
        let desc = QueryDescription::from_url(
            "https://example.test/rest/v1/contact?select=id%2Cname&or=(a.eq.1%2Cb.eq.2)&name=eq.Jane+Doe",
        )
        .expect("url should decode");

        assert_eq!(desc.target, Target::Table("contact".to_string()));
        assert_eq!(desc.select_param(), Some("id,name"));
        assert_eq!(
            desc.params[1..],
            [
                ("or".to_string(), "(a.eq.1,b.eq.2)".to_string()),
                ("name".to_string(), "eq.Jane Doe".to_string()),
            ]
        );
    }

    #[test]
    fn from_url_maps_rpc_paths() {
        let desc = QueryDescription::from_url("/rest/v1/rpc/search_contacts?limit=5")
            .expect("url should decode");

        assert_eq!(desc.target, Target::Rpc("search_contacts".to_string()));
        assert_eq!(desc.target.table_name(), "rpc/search_contacts");
    }

    #[test]
    fn from_url_rejects_empty_paths() {
        assert!(QueryDescription::from_url("/?select=id").is_none());
    }

    #[test]
    fn percent_decoding_keeps_invalid_escapes() {
        assert_eq!(percent_decode("100%25"), "100%");
        assert_eq!(percent_decode("50%"), "50%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }
}
