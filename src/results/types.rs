//! Result type definitions

use super::page::Page;
use crate::query::{Criteria, FacetField, FacetRange, GroupSpec, HighlightField, PivotField};
use serde::Serialize;
use serde_json::Value;

/// One value bucket of a field facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetFieldEntry {
    pub field: String,
    /// `None` for the missing-value bucket
    pub value: Option<String>,
    pub count: u64,
}

/// Field facet result keyed by the facet it answers
#[derive(Debug, Clone)]
pub struct FacetFieldResult {
    pub field: FacetField,
    pub entries: Page<FacetFieldEntry>,
}

/// One node of a pivot tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetPivotEntry {
    pub field: String,
    pub value: Option<String>,
    pub count: u64,
    pub pivot: Vec<FacetPivotEntry>,
}

#[derive(Debug, Clone)]
pub struct FacetPivotResult {
    pub pivot: PivotField,
    pub entries: Vec<FacetPivotEntry>,
}

/// One bucket of a range facet, keyed by its lower bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeFacetEntry {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct RangeFacetResult {
    pub range: FacetRange,
    pub entries: Page<RangeFacetEntry>,
    pub gap: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub before: Option<u64>,
    pub after: Option<u64>,
    pub between: Option<u64>,
}

/// Hit count of a facet query
#[derive(Debug, Clone, PartialEq)]
pub struct FacetQueryEntry {
    pub query: Criteria,
    pub count: u64,
}

/// Result of one grouping command
#[derive(Debug, Clone)]
pub struct GroupResult<T> {
    pub spec: GroupSpec,
    /// Name the engine reported the command under
    pub name: String,
    /// Documents matched before grouping
    pub matches: u64,
    /// Number of groups, when requested
    pub group_count: Option<u64>,
    pub entries: Page<GroupEntry<T>>,
}

/// One group and its documents
#[derive(Debug, Clone)]
pub struct GroupEntry<T> {
    /// `None` for documents without a value in the group field
    pub group_value: Option<String>,
    pub result: Page<T>,
}

/// Statistics of one field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldStatsResult {
    pub name: String,
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub sum: Option<Value>,
    pub count: Option<u64>,
    pub missing: Option<u64>,
    pub mean: Option<Value>,
    pub stddev: Option<f64>,
    pub sum_of_squares: Option<f64>,
    pub count_distinct: Option<u64>,
    pub distinct_values: Vec<Value>,
    /// Statistics split by the values of a facet field
    pub facets: Vec<StatsFacetResult>,
}

impl FieldStatsResult {
    pub fn min_as_f64(&self) -> Option<f64> {
        self.min.as_ref().and_then(Value::as_f64)
    }

    pub fn max_as_f64(&self) -> Option<f64> {
        self.max.as_ref().and_then(Value::as_f64)
    }

    pub fn mean_as_f64(&self) -> Option<f64> {
        self.mean.as_ref().and_then(Value::as_f64)
    }

    /// Stats of `value` within the `field` facet
    pub fn facet_stats(&self, field: &str, value: &str) -> Option<&FieldStatsResult> {
        self.facets
            .iter()
            .find(|f| f.field == field)
            .and_then(|f| f.values.iter().find(|(v, _)| v == value))
            .map(|(_, stats)| stats)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsFacetResult {
    pub field: String,
    pub values: Vec<(String, FieldStatsResult)>,
}

/// Highlight snippets of one field
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightEntry {
    pub field: HighlightField,
    pub snippets: Vec<String>,
}

/// Highlighting of one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlight {
    /// Document id the engine keyed the highlighting by
    pub id: Option<String>,
    pub entries: Vec<HighlightEntry>,
}

impl Highlight {
    pub fn snippets(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.field.name == field)
            .map(|e| e.snippets.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One indexed term and its document frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermsFieldEntry {
    pub field: String,
    pub value: String,
    pub count: u64,
}

/// Terms per requested field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TermsPage {
    fields: Vec<(String, Vec<TermsFieldEntry>)>,
}

impl TermsPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, field: impl Into<String>, entries: Vec<TermsFieldEntry>) {
        self.fields.push((field.into(), entries));
    }

    /// Terms of `field` in engine order; empty when the field was not returned
    pub fn terms_for_field(&self, field: &str) -> &[TermsFieldEntry] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// All terms, field by field
    pub fn content(&self) -> impl Iterator<Item = &TermsFieldEntry> {
        self.fields.iter().flat_map(|(_, entries)| entries.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, entries)| entries.is_empty())
    }
}
