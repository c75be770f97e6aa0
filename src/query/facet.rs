//! Facet query and facet options

use super::criteria::{format_date, Criteria};
use super::models::{PageRequest, Query};
use chrono::{DateTime, Utc};
use std::fmt;

/// Facet ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacetSort {
    #[default]
    Count,
    Index,
}

impl FacetSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Index => "index",
        }
    }
}

/// Facet on a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetField {
    pub name: String,
    pub prefix: Option<String>,
    pub limit: Option<u32>,
    pub min_count: Option<u32>,
    pub sort: Option<FacetSort>,
    pub missing: Option<bool>,
}

impl FacetField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            limit: None,
            min_count: None,
            sort: None,
            missing: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_min_count(mut self, min_count: u32) -> Self {
        self.min_count = Some(min_count);
        self
    }

    pub fn with_sort(mut self, sort: FacetSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_missing(mut self, missing: bool) -> Self {
        self.missing = Some(missing);
        self
    }
}

/// Pivot (decision tree) facet over several fields
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PivotField {
    pub fields: Vec<String>,
}

impl PivotField {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Comma separated form used on the wire
    pub fn name(&self) -> String {
        self.fields.join(",")
    }
}

/// Range facet bound
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    Number(f64),
    Date(DateTime<Utc>),
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Date(d) => f.write_str(&format_date(*d)),
        }
    }
}

impl From<f64> for RangeBound {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for RangeBound {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for RangeBound {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// `facet.range.include`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeInclude {
    Lower,
    Upper,
    Edge,
    Outer,
    All,
}

impl RangeInclude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Edge => "edge",
            Self::Outer => "outer",
            Self::All => "all",
        }
    }
}

/// `facet.range.other`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOther {
    Before,
    After,
    Between,
    None,
    All,
}

impl RangeOther {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Between => "between",
            Self::None => "none",
            Self::All => "all",
        }
    }
}

/// Range facet over a numeric or date field
#[derive(Debug, Clone, PartialEq)]
pub struct FacetRange {
    pub field: String,
    pub start: RangeBound,
    pub end: RangeBound,
    /// Numeric gap or date math such as `+1DAY`
    pub gap: String,
    pub hard_end: bool,
    pub include: Option<RangeInclude>,
    pub other: Option<RangeOther>,
}

impl FacetRange {
    pub fn new(
        field: impl Into<String>,
        start: impl Into<RangeBound>,
        end: impl Into<RangeBound>,
        gap: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            start: start.into(),
            end: end.into(),
            gap: gap.into(),
            hard_end: false,
            include: None,
            other: None,
        }
    }

    pub fn with_hard_end(mut self, hard_end: bool) -> Self {
        self.hard_end = hard_end;
        self
    }

    pub fn with_include(mut self, include: RangeInclude) -> Self {
        self.include = Some(include);
        self
    }

    pub fn with_other(mut self, other: RangeOther) -> Self {
        self.other = Some(other);
        self
    }
}

/// Facet configuration of a facet query
#[derive(Debug, Clone, PartialEq)]
pub struct FacetOptions {
    pub fields: Vec<FacetField>,
    pub pivots: Vec<PivotField>,
    pub ranges: Vec<FacetRange>,
    pub queries: Vec<Criteria>,
    pub min_count: u32,
    pub limit: u32,
    /// Offset into each field's value list
    pub offset: Option<u32>,
    pub sort: FacetSort,
    pub prefix: Option<String>,
    pub missing: bool,
}

impl Default for FacetOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            pivots: Vec::new(),
            ranges: Vec::new(),
            queries: Vec::new(),
            min_count: 1,
            limit: 10,
            offset: None,
            sort: FacetSort::Count,
            prefix: None,
            missing: false,
        }
    }
}

impl FacetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Facet on plain fields
    pub fn on_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(FacetField::new).collect(),
            ..Self::default()
        }
    }

    pub fn add_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(FacetField::new(field));
        self
    }

    pub fn add_facet_field(mut self, field: FacetField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn add_pivot(mut self, pivot: PivotField) -> Self {
        self.pivots.push(pivot);
        self
    }

    pub fn add_range(mut self, range: FacetRange) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn add_query(mut self, query: Criteria) -> Self {
        self.queries.push(query);
        self
    }

    pub fn with_min_count(mut self, min_count: u32) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_sort(mut self, sort: FacetSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_missing(mut self, missing: bool) -> Self {
        self.missing = missing;
        self
    }

    /// Whether anything would be requested from the engine
    pub fn has_facets(&self) -> bool {
        !(self.fields.is_empty()
            && self.pivots.is_empty()
            && self.ranges.is_empty()
            && self.queries.is_empty())
    }

    /// Page applied to each field's value list
    pub fn page_request(&self) -> PageRequest {
        PageRequest::at(self.offset.unwrap_or(0) as u64, self.limit)
    }
}

/// Query with facets
#[derive(Debug, Clone, PartialEq)]
pub struct FacetQuery {
    pub query: Query,
    pub facet_options: FacetOptions,
}

impl FacetQuery {
    pub fn new(query: Query, facet_options: FacetOptions) -> Self {
        Self {
            query,
            facet_options,
        }
    }
}
