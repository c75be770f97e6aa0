//! Highlight query and highlight options

use super::criteria::Criteria;
use super::models::Query;

/// Highlighting on one field, with optional per-field overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightField {
    pub name: String,
    pub fragsize: Option<u32>,
    pub snippets: Option<u32>,
    pub simple_prefix: Option<String>,
    pub simple_postfix: Option<String>,
    /// Extra `hl.*` parameters, sent as `f.<name>.hl.<key>`
    pub params: Vec<(String, String)>,
}

impl HighlightField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fragsize: None,
            snippets: None,
            simple_prefix: None,
            simple_postfix: None,
            params: Vec::new(),
        }
    }

    pub fn with_fragsize(mut self, fragsize: u32) -> Self {
        self.fragsize = Some(fragsize);
        self
    }

    pub fn with_snippets(mut self, snippets: u32) -> Self {
        self.snippets = Some(snippets);
        self
    }

    pub fn with_simple_tags(mut self, prefix: impl Into<String>, postfix: impl Into<String>) -> Self {
        self.simple_prefix = Some(prefix.into());
        self.simple_postfix = Some(postfix.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// Highlight configuration of a highlight query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightOptions {
    /// Highlighted fields; falls back to the projection, then to `*`
    pub fields: Vec<HighlightField>,
    pub simple_prefix: Option<String>,
    pub simple_postfix: Option<String>,
    pub fragsize: Option<u32>,
    pub snippets: Option<u32>,
    pub formatter: Option<String>,
    /// Query used for highlighting instead of the main query (`hl.q`)
    pub query: Option<Criteria>,
    /// Extra `hl.*` parameters
    pub params: Vec<(String, String)>,
}

impl HighlightOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(HighlightField::new(field));
        self
    }

    pub fn add_highlight_field(mut self, field: HighlightField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_simple_tags(mut self, prefix: impl Into<String>, postfix: impl Into<String>) -> Self {
        self.simple_prefix = Some(prefix.into());
        self.simple_postfix = Some(postfix.into());
        self
    }

    pub fn with_fragsize(mut self, fragsize: u32) -> Self {
        self.fragsize = Some(fragsize);
        self
    }

    pub fn with_snippets(mut self, snippets: u32) -> Self {
        self.snippets = Some(snippets);
        self
    }

    pub fn with_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    pub fn with_query(mut self, query: Criteria) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// Query with highlighting
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightQuery {
    pub query: Query,
    pub highlight_options: HighlightOptions,
}

impl HighlightQuery {
    pub fn new(query: Query, highlight_options: HighlightOptions) -> Self {
        Self {
            query,
            highlight_options,
        }
    }
}
