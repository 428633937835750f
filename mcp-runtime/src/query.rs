//! Query parameter bag and its URL encoding.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::form_urlencoded;

/// A list parameter that callers may send either as an array or already
/// comma-joined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    List(Vec<String>),
    Joined(String),
}

impl StringList {
    fn encode(&self) -> String {
        match self {
            StringList::List(items) => items.join(","),
            StringList::Joined(raw) => raw.clone(),
        }
    }
}

impl From<Vec<&str>> for StringList {
    fn from(items: Vec<&str>) -> Self {
        StringList::List(items.into_iter().map(str::to_string).collect())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
    Yaml,
}

impl ExportFormat {
    pub const ALL: [&'static str; 4] = ["json", "csv", "xml", "yaml"];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
            ExportFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured read parameters understood by Directus list/get endpoints.
///
/// Every field is optional and independent; only present fields are encoded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<StringList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Entries prefixed with `-` sort descending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<StringList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Map<String, Value>>,
    #[serde(
        default,
        rename = "groupBy",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_by: Option<StringList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportFormat>,
}

impl QueryParams {
    pub fn is_empty(&self) -> bool {
        self == &QueryParams::default()
    }

    /// Encode as `?k=v&...`, or the empty string when nothing is set.
    ///
    /// Keys are emitted in a fixed order and JSON objects serialize with
    /// sorted keys, so identical input always yields identical output.
    pub fn to_query_string(&self) -> String {
        let mut pairs = form_urlencoded::Serializer::new(String::new());
        let mut count = 0usize;
        let mut push = |key: &str, value: &str| {
            pairs.append_pair(key, value);
            count += 1;
        };

        if let Some(fields) = &self.fields {
            push("fields", &fields.encode());
        }
        if let Some(filter) = &self.filter {
            push("filter", &filter.to_string());
        }
        if let Some(search) = &self.search {
            push("search", search);
        }
        if let Some(sort) = &self.sort {
            push("sort", &sort.encode());
        }
        if let Some(limit) = self.limit {
            push("limit", &limit.to_string());
        }
        if let Some(offset) = self.offset {
            push("offset", &offset.to_string());
        }
        if let Some(page) = self.page {
            push("page", &page.to_string());
        }
        if let Some(aggregate) = &self.aggregate {
            push("aggregate", &Value::Object(aggregate.clone()).to_string());
        }
        if let Some(group_by) = &self.group_by {
            push("groupBy", &group_by.encode());
        }
        if let Some(deep) = &self.deep {
            push("deep", &deep.to_string());
        }
        if let Some(meta) = &self.meta {
            push("meta", meta);
        }
        if let Some(export) = self.export {
            push("export", export.as_str());
        }

        if count == 0 {
            return String::new();
        }
        format!("?{}", pairs.finish())
    }

    /// Append the encoded query to `path`.
    pub fn apply(&self, path: &str) -> String {
        format!("{path}{}", self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn decode(query: &str) -> BTreeMap<String, String> {
        let raw = query.strip_prefix('?').expect("query must start with '?'");
        form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn empty_bag_encodes_to_empty_string() {
        assert_eq!(QueryParams::default().to_query_string(), "");
        assert!(QueryParams::default().is_empty());
    }

    #[test]
    fn fields_limit_and_filter_decode_back() {
        let filter = json!({ "status": { "_eq": "published" } });
        let params = QueryParams {
            fields: Some(vec!["id", "title"].into()),
            limit: Some(10),
            filter: Some(filter.clone()),
            ..Default::default()
        };

        let decoded = decode(&params.to_query_string());
        assert_eq!(decoded["fields"], "id,title");
        assert_eq!(decoded["limit"], "10");
        let round: Value = serde_json::from_str(&decoded["filter"]).unwrap();
        assert_eq!(round, filter);
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn every_field_is_emitted_in_fixed_order() {
        let params: QueryParams = serde_json::from_value(json!({
            "fields": ["*", "author.name"],
            "filter": { "id": { "_gt": 3 } },
            "search": "hello world",
            "sort": ["-date_created", "title"],
            "limit": 25,
            "offset": 50,
            "page": 3,
            "aggregate": { "count": "*" },
            "groupBy": ["status"],
            "deep": { "translations": { "_limit": 1 } },
            "meta": "total_count",
            "export": "csv"
        }))
        .unwrap();

        let query = params.to_query_string();
        let keys: Vec<&str> = query[1..]
            .split('&')
            .map(|pair| pair.split('=').next().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "fields",
                "filter",
                "search",
                "sort",
                "limit",
                "offset",
                "page",
                "aggregate",
                "groupBy",
                "deep",
                "meta",
                "export"
            ]
        );

        let decoded = decode(&query);
        assert_eq!(decoded["fields"], "*,author.name");
        assert_eq!(decoded["sort"], "-date_created,title");
        assert_eq!(decoded["search"], "hello world");
        assert_eq!(decoded["groupBy"], "status");
        assert_eq!(decoded["meta"], "total_count");
        assert_eq!(decoded["export"], "csv");
        assert_eq!(decoded["aggregate"], r#"{"count":"*"}"#);
    }

    #[test]
    fn pre_joined_lists_pass_through() {
        let params: QueryParams =
            serde_json::from_value(json!({ "fields": "id,title", "sort": "-id" })).unwrap();
        let decoded = decode(&params.to_query_string());
        assert_eq!(decoded["fields"], "id,title");
        assert_eq!(decoded["sort"], "-id");
    }

    #[test]
    fn encoding_is_deterministic() {
        let params: QueryParams = serde_json::from_value(json!({
            "filter": { "b": 1, "a": { "_in": [1, 2] } },
            "deep": { "z": {}, "y": {} }
        }))
        .unwrap();
        assert_eq!(params.to_query_string(), params.clone().to_query_string());
    }

    #[test]
    fn special_characters_are_percent_encoded() {
        let params = QueryParams {
            search: Some("a&b=c".to_string()),
            ..Default::default()
        };
        let query = params.to_query_string();
        assert!(!query[1..].contains("a&b"));
        assert_eq!(decode(&query)["search"], "a&b=c");
    }

    #[test]
    fn apply_appends_to_path() {
        let params = QueryParams {
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(params.apply("/items/articles"), "/items/articles?limit=1");
        assert_eq!(QueryParams::default().apply("/flows"), "/flows");
    }
}
