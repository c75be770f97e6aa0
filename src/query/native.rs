//! Engine-native query parameters

use std::fmt;

/// Default search handler
pub const DEFAULT_REQUEST_HANDLER: &str = "/select";

/// Parameter carrying the continuation mark of a cursor query
pub const CURSOR_MARK_PARAM: &str = "cursorMark";

/// Continuation mark the engine expects on the first cursor request
pub const CURSOR_MARK_START: &str = "*";

/// Handler path plus ordered, multi-valued parameters for one round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeQuery {
    handler: String,
    params: Vec<(String, String)>,
}

impl NativeQuery {
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            params: Vec::new(),
        }
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn set_handler(&mut self, handler: impl Into<String>) {
        self.handler = handler.into();
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Replace every value of `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.params.retain(|(k, _)| *k != key);
        self.params.push((key, value.into()));
        self
    }

    /// Append a value to `key`
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// First value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) {
        self.params.retain(|(k, _)| k != key);
    }

    pub fn set_start(&mut self, start: u64) -> &mut Self {
        self.set("start", start.to_string())
    }

    pub fn set_rows(&mut self, rows: u32) -> &mut Self {
        self.set("rows", rows.to_string())
    }

    /// Request the score pseudo-field alongside the projection
    pub fn include_score(&mut self) -> &mut Self {
        match self.get("fl").map(str::to_string) {
            None => self.set("fl", "*,score"),
            Some(fl) if fl.split(',').any(|f| f.trim() == "score") => self,
            Some(fl) => self.set("fl", format!("{},score", fl)),
        }
    }
}

impl Default for NativeQuery {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_HANDLER)
    }
}

impl fmt::Display for NativeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        write!(f, "{}?{}", self.handler, encoded)
    }
}
