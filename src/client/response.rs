//! Engine response models
//!
//! Mirrors the JSON written by Solr with `wt=json&json.nl=flat`. Sections the
//! engine leaves out deserialize to `None` or empty collections.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;

/// A stored document as returned by the engine
pub type SolrDocument = Map<String, Value>;

/// A document to be indexed
pub type SolrInputDocument = Map<String, Value>;

/// JSON object decoded as an ordered list of `(name, value)` pairs
#[derive(Debug, Clone, PartialEq)]
pub struct NamedList<V>(pub Vec<(String, V)>);

impl<V> NamedList<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Get the first value stored under `name`
    pub fn get(&self, name: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for NamedList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(String, V)> for NamedList<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for NamedList<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamedListVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for NamedListVisitor<V> {
            type Value = NamedList<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(NamedList(entries))
            }
        }

        deserializer.deserialize_map(NamedListVisitor(PhantomData))
    }
}

/// Flat `[value, count, value, count, ...]` list used for facet and term counts.
///
/// A `null` value is the facet.missing bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatCounts(pub Vec<(Option<String>, u64)>);

impl FlatCounts {
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, u64)> {
        self.0.iter().map(|(v, c)| (v.as_deref(), *c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for FlatCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlatCountsVisitor;

        impl<'de> Visitor<'de> for FlatCountsVisitor {
            type Value = FlatCounts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a flat list of alternating values and counts")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::new();
                while let Some(value) = seq.next_element::<Value>()? {
                    let count = seq
                        .next_element::<u64>()?
                        .ok_or_else(|| de::Error::custom("value without a count"))?;
                    pairs.push((value_to_string(&value), count));
                }
                Ok(FlatCounts(pairs))
            }

            // json.nl=map fallback
            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::new();
                while let Some((key, count)) = map.next_entry::<String, u64>()? {
                    pairs.push((Some(key), count));
                }
                Ok(FlatCounts(pairs))
            }
        }

        deserializer.deserialize_any(FlatCountsVisitor)
    }
}

/// Render a scalar JSON value the way the engine printed it
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `responseHeader` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseHeader {
    #[serde(default)]
    pub status: i32,
    #[serde(rename = "QTime", default)]
    pub qtime: u64,
}

/// Ordered document list with hit count
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolrDocumentList {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub start: u64,
    #[serde(rename = "maxScore", default)]
    pub max_score: Option<f32>,
    #[serde(default)]
    pub docs: Vec<SolrDocument>,
}

/// Answer to a select, terms or real-time get request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "responseHeader", default)]
    pub header: ResponseHeader,
    #[serde(default)]
    pub response: Option<SolrDocumentList>,
    #[serde(default)]
    pub facet_counts: Option<FacetCounts>,
    #[serde(default)]
    pub highlighting: Option<NamedList<NamedList<Vec<String>>>>,
    #[serde(default)]
    pub grouped: Option<NamedList<GroupCommandResponse>>,
    #[serde(default)]
    pub stats: Option<StatsResponse>,
    #[serde(default)]
    pub terms: Option<NamedList<FlatCounts>>,
    #[serde(rename = "nextCursorMark", default)]
    pub next_cursor_mark: Option<String>,
}

impl QueryResponse {
    /// Returned documents, empty when the section is absent
    pub fn documents(&self) -> &[SolrDocument] {
        self.response
            .as_ref()
            .map(|r| r.docs.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of matches, zero when the section is absent
    pub fn num_found(&self) -> u64 {
        self.response.as_ref().map(|r| r.num_found).unwrap_or(0)
    }

    pub fn max_score(&self) -> Option<f32> {
        self.response.as_ref().and_then(|r| r.max_score)
    }
}

/// `facet_counts` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FacetCounts {
    pub facet_queries: NamedList<u64>,
    pub facet_fields: NamedList<FlatCounts>,
    pub facet_ranges: NamedList<RangeFacetResponse>,
    pub facet_pivot: NamedList<Vec<PivotResponse>>,
}

/// One range facet
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeFacetResponse {
    #[serde(default)]
    pub counts: FlatCounts,
    #[serde(default)]
    pub gap: Value,
    #[serde(default)]
    pub start: Value,
    #[serde(default)]
    pub end: Value,
    #[serde(default)]
    pub before: Option<u64>,
    #[serde(default)]
    pub after: Option<u64>,
    #[serde(default)]
    pub between: Option<u64>,
}

/// One node of a pivot facet tree
#[derive(Debug, Clone, Deserialize)]
pub struct PivotResponse {
    pub field: String,
    #[serde(default)]
    pub value: Value,
    pub count: u64,
    #[serde(default)]
    pub pivot: Vec<PivotResponse>,
}

/// One grouping command (field, function or query)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupCommandResponse {
    #[serde(default)]
    pub matches: u64,
    #[serde(default)]
    pub ngroups: Option<u64>,
    #[serde(default)]
    pub groups: Vec<GroupResponse>,
    /// Present for `group.query` commands
    #[serde(default)]
    pub doclist: Option<SolrDocumentList>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupResponse {
    #[serde(rename = "groupValue", default)]
    pub group_value: Value,
    #[serde(default)]
    pub doclist: SolrDocumentList,
}

/// `stats` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub stats_fields: NamedList<Option<FieldStatsResponse>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldStatsResponse {
    pub min: Value,
    pub max: Value,
    pub sum: Value,
    pub count: Option<u64>,
    pub missing: Option<u64>,
    pub mean: Value,
    pub stddev: Option<f64>,
    #[serde(rename = "sumOfSquares")]
    pub sum_of_squares: Option<f64>,
    #[serde(rename = "countDistinct")]
    pub count_distinct: Option<u64>,
    #[serde(rename = "distinctValues")]
    pub distinct_values: Vec<Value>,
    pub facets: NamedList<NamedList<FieldStatsResponse>>,
}

/// Answer to an update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateResponse {
    #[serde(rename = "responseHeader", default)]
    pub header: ResponseHeader,
}

impl UpdateResponse {
    pub fn status(&self) -> i32 {
        self.header.status
    }

    pub fn qtime(&self) -> u64 {
        self.header.qtime
    }
}

/// Answer to the ping handler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PingResponse {
    #[serde(rename = "responseHeader", default)]
    pub header: ResponseHeader,
    #[serde(default)]
    pub status: Option<String>,
}

impl PingResponse {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("OK")
    }
}

/// Answer to the schema name endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SchemaNameResponse {
    #[serde(default)]
    pub name: Option<String>,
}

/// Error body written by the engine for non-2xx answers
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_list_keeps_engine_order() {
        let list: NamedList<u64> =
            serde_json::from_value(json!({ "zeta": 1, "alpha": 2, "mid": 3 })).unwrap();
        let names: Vec<&str> = list.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(list.get("alpha"), Some(&2));
    }

    #[test]
    fn test_flat_counts() {
        let counts: FlatCounts =
            serde_json::from_value(json!(["red", 10, "blue", 4, 42, 1, null, 2])).unwrap();
        assert_eq!(
            counts.0,
            vec![
                (Some("red".to_string()), 10),
                (Some("blue".to_string()), 4),
                (Some("42".to_string()), 1),
                (None, 2),
            ]
        );
    }

    #[test]
    fn test_flat_counts_rejects_odd_length() {
        let result: Result<FlatCounts, _> = serde_json::from_value(json!(["red", 10, "blue"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_query_response_defaults() {
        let response: QueryResponse = serde_json::from_value(json!({
            "responseHeader": { "status": 0, "QTime": 3 }
        }))
        .unwrap();
        assert_eq!(response.num_found(), 0);
        assert!(response.documents().is_empty());
        assert!(response.max_score().is_none());
        assert!(response.next_cursor_mark.is_none());
    }

    #[test]
    fn test_query_response_documents() {
        let response: QueryResponse = serde_json::from_value(json!({
            "response": {
                "numFound": 42,
                "start": 0,
                "maxScore": 1.5,
                "docs": [{ "id": "1" }, { "id": "2" }]
            },
            "nextCursorMark": "AoE1"
        }))
        .unwrap();
        assert_eq!(response.num_found(), 42);
        assert_eq!(response.max_score(), Some(1.5));
        assert_eq!(response.documents().len(), 2);
        assert_eq!(response.next_cursor_mark.as_deref(), Some("AoE1"));
    }
}
