//! Terms query

/// Term ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermsSort {
    #[default]
    Count,
    Index,
}

impl TermsSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Index => "index",
        }
    }
}

/// Request for indexed terms and their document frequencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsQuery {
    pub fields: Vec<String>,
    /// Maximum terms per field; negative means unlimited
    pub limit: Option<i32>,
    pub min_count: Option<u32>,
    pub max_count: Option<u32>,
    pub prefix: Option<String>,
    pub regex: Option<String>,
    pub sort: TermsSort,
    /// Request handler path; `/terms` when absent
    pub request_handler: Option<String>,
}

impl Default for TermsQuery {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            limit: None,
            min_count: None,
            max_count: None,
            prefix: None,
            regex: None,
            sort: TermsSort::Count,
            request_handler: None,
        }
    }
}

impl TermsQuery {
    /// Terms of the given fields
    pub fn on_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_min_count(mut self, min_count: u32) -> Self {
        self.min_count = Some(min_count);
        self
    }

    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }

    pub fn with_sort(mut self, sort: TermsSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_request_handler(mut self, handler: impl Into<String>) -> Self {
        self.request_handler = Some(handler.into());
        self
    }
}
