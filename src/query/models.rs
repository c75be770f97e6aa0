//! Abstract query and related data models

use super::criteria::Criteria;
use super::facet::FacetQuery;
use super::highlight::HighlightQuery;
use super::terms::TermsQuery;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Index of the first row
    pub offset: u64,
    /// Rows per page
    pub size: u32,
}

impl PageRequest {
    /// Page `page` (0-indexed) of `size` rows
    pub fn of(page: u64, size: u32) -> Self {
        Self {
            offset: page * size as u64,
            size,
        }
    }

    /// Explicit offset and size
    pub fn at(offset: u64, size: u32) -> Self {
        Self { offset, size }
    }

    /// 0-indexed page number
    pub fn page_number(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.offset / self.size as u64
        }
    }

    pub fn next(&self) -> Self {
        Self::at(self.offset + self.size as u64, self.size)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One sort clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub direction: Direction,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction.as_str())
    }
}

/// Default operator between query terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A grouping command
#[derive(Debug, Clone, PartialEq)]
pub enum GroupSpec {
    /// `group.field`
    Field(String),
    /// `group.func`
    Function(String),
    /// `group.query`
    Query(Criteria),
}

impl GroupSpec {
    /// The string the engine keys this command's result by
    pub fn native_name(&self) -> String {
        match self {
            Self::Field(field) => field.clone(),
            Self::Function(function) => function.clone(),
            Self::Query(criteria) => criteria.to_query_string(),
        }
    }
}

/// Result grouping options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupOptions {
    pub fields: Vec<String>,
    pub functions: Vec<String>,
    pub queries: Vec<Criteria>,
    /// Offset into each group's document list
    pub offset: Option<u32>,
    /// Documents returned per group
    pub limit: Option<u32>,
    /// Sort within each group
    pub sort: Vec<SortField>,
    /// Ask for the number of groups (`group.ngroups`)
    pub total_count: bool,
    pub truncate_facets: bool,
    pub group_facets: bool,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn add_function(mut self, function: impl Into<String>) -> Self {
        self.functions.push(function.into());
        self
    }

    pub fn add_query(mut self, query: Criteria) -> Self {
        self.queries.push(query);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn add_sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn with_total_count(mut self, total_count: bool) -> Self {
        self.total_count = total_count;
        self
    }

    /// All commands in request order: fields, functions, queries
    pub fn specs(&self) -> Vec<GroupSpec> {
        self.fields
            .iter()
            .cloned()
            .map(GroupSpec::Field)
            .chain(self.functions.iter().cloned().map(GroupSpec::Function))
            .chain(self.queries.iter().cloned().map(GroupSpec::Query))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.functions.is_empty() && self.queries.is_empty()
    }

    /// Page applied to each group's document list
    pub fn page_request(&self) -> Option<PageRequest> {
        self.limit
            .map(|limit| PageRequest::at(self.offset.unwrap_or(0) as u64, limit))
    }
}

/// One field to compute statistics for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsField {
    pub name: String,
    /// Per-field `stats.facet`
    pub facets: Vec<String>,
    /// Per-field override of `stats.calcdistinct`
    pub calc_distinct: Option<bool>,
}

impl StatsField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            facets: Vec::new(),
            calc_distinct: None,
        }
    }

    pub fn add_facet(mut self, field: impl Into<String>) -> Self {
        self.facets.push(field.into());
        self
    }

    pub fn with_calc_distinct(mut self, calc_distinct: bool) -> Self {
        self.calc_distinct = Some(calc_distinct);
        self
    }
}

/// Field statistics options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsOptions {
    pub fields: Vec<StatsField>,
    /// Facets applied to every stats field
    pub facets: Vec<String>,
    pub calc_distinct: bool,
}

impl StatsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(StatsField::new(field));
        self
    }

    pub fn add_stats_field(mut self, field: StatsField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn add_facet(mut self, field: impl Into<String>) -> Self {
        self.facets.push(field.into());
        self
    }

    pub fn with_calc_distinct(mut self, calc_distinct: bool) -> Self {
        self.calc_distinct = calc_distinct;
        self
    }
}

/// Criteria-bearing query with paging, sorting and projection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Main query; `*:*` when absent
    pub criteria: Option<Criteria>,
    /// Filter queries (`fq`)
    pub filter_queries: Vec<Criteria>,
    pub sort: Vec<SortField>,
    /// Returned fields (`fl`)
    pub projection: Vec<String>,
    pub page_request: Option<PageRequest>,
    pub default_operator: Option<Operator>,
    pub def_type: Option<String>,
    /// Request handler path; `/select` when absent
    pub request_handler: Option<String>,
    /// Time allowed in milliseconds
    pub time_allowed: Option<u32>,
    pub group_options: Option<GroupOptions>,
    pub stats_options: Option<StatsOptions>,
}

impl Query {
    /// Create a query for the given criteria
    pub fn new(criteria: Criteria) -> Self {
        Self {
            criteria: Some(criteria),
            ..Default::default()
        }
    }

    /// Create a query matching every document
    pub fn all() -> Self {
        Self::new(Criteria::All)
    }

    pub fn add_filter(mut self, filter: Criteria) -> Self {
        self.filter_queries.push(filter);
        self
    }

    pub fn add_sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn add_projection(mut self, field: impl Into<String>) -> Self {
        self.projection.push(field.into());
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page_request = Some(page);
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.default_operator = Some(operator);
        self
    }

    pub fn with_def_type(mut self, def_type: impl Into<String>) -> Self {
        self.def_type = Some(def_type.into());
        self
    }

    pub fn with_request_handler(mut self, handler: impl Into<String>) -> Self {
        self.request_handler = Some(handler.into());
        self
    }

    pub fn with_time_allowed(mut self, millis: u32) -> Self {
        self.time_allowed = Some(millis);
        self
    }

    pub fn with_group_options(mut self, options: GroupOptions) -> Self {
        self.group_options = Some(options);
        self
    }

    pub fn with_stats_options(mut self, options: StatsOptions) -> Self {
        self.stats_options = Some(options);
        self
    }
}

/// Tag of a query variant; the parser registry is keyed by it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Simple,
    Facet,
    Group,
    Highlight,
    Terms,
    Stats,
    /// Caller-defined variant
    Custom(String),
}

impl QueryKind {
    /// The variants the template registers parsers for out of the box
    pub fn standard() -> [QueryKind; 6] {
        [
            Self::Simple,
            Self::Facet,
            Self::Group,
            Self::Highlight,
            Self::Terms,
            Self::Stats,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Simple => "simple",
            Self::Facet => "facet",
            Self::Group => "group",
            Self::Highlight => "highlight",
            Self::Terms => "terms",
            Self::Stats => "stats",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query tagged with the variant it is submitted as
#[derive(Debug, Clone, Copy)]
pub enum DataQuery<'a> {
    Simple(&'a Query),
    Facet(&'a FacetQuery),
    Group(&'a Query),
    Highlight(&'a HighlightQuery),
    Stats(&'a Query),
    Terms(&'a TermsQuery),
    Custom { kind: &'a str, query: &'a Query },
}

impl<'a> DataQuery<'a> {
    /// Variant tag used for parser lookup
    pub fn kind(&self) -> QueryKind {
        match self {
            Self::Simple(_) => QueryKind::Simple,
            Self::Facet(_) => QueryKind::Facet,
            Self::Group(_) => QueryKind::Group,
            Self::Highlight(_) => QueryKind::Highlight,
            Self::Stats(_) => QueryKind::Stats,
            Self::Terms(_) => QueryKind::Terms,
            Self::Custom { kind, .. } => QueryKind::Custom(kind.to_string()),
        }
    }

    /// The criteria-bearing part; `None` for terms queries
    pub fn base(&self) -> Option<&'a Query> {
        match *self {
            Self::Simple(q) | Self::Group(q) | Self::Stats(q) => Some(q),
            Self::Custom { query, .. } => Some(query),
            Self::Facet(q) => Some(&q.query),
            Self::Highlight(q) => Some(&q.query),
            Self::Terms(_) => None,
        }
    }

    pub fn page_request(&self) -> Option<PageRequest> {
        self.base().and_then(|q| q.page_request)
    }
}

impl<'a> From<&'a Query> for DataQuery<'a> {
    fn from(query: &'a Query) -> Self {
        Self::Simple(query)
    }
}

impl<'a> From<&'a FacetQuery> for DataQuery<'a> {
    fn from(query: &'a FacetQuery) -> Self {
        Self::Facet(query)
    }
}

impl<'a> From<&'a HighlightQuery> for DataQuery<'a> {
    fn from(query: &'a HighlightQuery) -> Self {
        Self::Highlight(query)
    }
}

impl<'a> From<&'a TermsQuery> for DataQuery<'a> {
    fn from(query: &'a TermsQuery) -> Self {
        Self::Terms(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request() {
        let page = PageRequest::of(2, 10);
        assert_eq!(page.offset, 20);
        assert_eq!(page.page_number(), 2);
        assert_eq!(page.next().offset, 30);
        assert_eq!(PageRequest::at(0, 0).page_number(), 0);
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new(Criteria::is("cat", "book"))
            .add_filter(Criteria::is("inStock", true))
            .add_sort(SortField::desc("price"))
            .add_projection("id")
            .with_page(PageRequest::of(0, 5));

        assert_eq!(query.filter_queries.len(), 1);
        assert_eq!(query.sort[0].to_string(), "price desc");
        assert_eq!(query.page_request, Some(PageRequest::at(0, 5)));
    }

    #[test]
    fn test_group_specs_order() {
        let options = GroupOptions::new()
            .add_query(Criteria::is("price", 10))
            .add_field("cat")
            .add_function("floor(price)");
        let names: Vec<String> = options.specs().iter().map(GroupSpec::native_name).collect();
        assert_eq!(names, vec!["cat", "floor(price)", "price:10"]);
    }

    #[test]
    fn test_data_query_kind() {
        let query = Query::all();
        assert_eq!(DataQuery::from(&query).kind(), QueryKind::Simple);
        assert_eq!(DataQuery::Stats(&query).kind(), QueryKind::Stats);

        let custom = DataQuery::Custom {
            kind: "geo",
            query: &query,
        };
        assert_eq!(custom.kind(), QueryKind::Custom("geo".to_string()));
        assert!(custom.base().is_some());
    }
}
