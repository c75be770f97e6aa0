//! Registry of query parsers keyed by query kind

use super::models::QueryKind;
use super::parser::{DefaultQueryParser, QueryParser, TermsQueryParser};
use crate::error::{Result, SolrError};
use std::collections::HashMap;
use std::sync::Arc;

/// Query kind → parser lookup
#[derive(Clone)]
pub struct QueryParsers {
    parsers: HashMap<QueryKind, Arc<dyn QueryParser>>,
}

impl QueryParsers {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Registry with the built-in parsers for every standard kind
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let default_parser: Arc<dyn QueryParser> = Arc::new(DefaultQueryParser::new());
        for kind in QueryKind::standard() {
            match kind {
                QueryKind::Terms => registry.register_parser(kind, Arc::new(TermsQueryParser::new())),
                kind => registry.register_parser(kind, default_parser.clone()),
            }
        }
        registry
    }

    /// Register a parser, replacing any previous one for the kind
    pub fn register_parser(&mut self, kind: QueryKind, parser: Arc<dyn QueryParser>) {
        self.parsers.insert(kind, parser);
    }

    /// Parser for `kind`
    pub fn get_for_kind(&self, kind: &QueryKind) -> Result<&Arc<dyn QueryParser>> {
        self.parsers
            .get(kind)
            .ok_or_else(|| SolrError::UnsupportedQueryKind(kind.clone()))
    }

    pub fn contains(&self, kind: &QueryKind) -> bool {
        self.parsers.contains_key(kind)
    }

    /// Get all registered kinds
    pub fn kinds(&self) -> Vec<&QueryKind> {
        self.parsers.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for QueryParsers {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for QueryParsers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryParsers")
            .field("kinds", &self.kinds())
            .finish()
    }
}
