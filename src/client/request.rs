//! HTTP request description for a single engine call

use serde_json::Value;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request to a handler below the core URL
#[derive(Debug, Clone)]
pub struct SolrRequest {
    /// Handler path relative to the core, e.g. `/select`
    pub path: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Query parameters, multi-valued and in order
    pub params: Vec<(String, String)>,
    /// JSON body for update requests
    pub body: Option<Value>,
}

impl SolrRequest {
    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Get,
            params: Vec::new(),
            body: None,
        }
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Post,
            params: Vec::new(),
            body: None,
        }
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add several query parameters
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add JSON body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether a parameter is already set
    pub fn has_param(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }
}
