//! Domain error taxonomy
//!
//! Every failure surfaced by the template is one of these kinds. Remote
//! failures arrive here only through the exception translator; argument
//! validation errors are raised locally before any request is made.

use crate::client::ClientError;
use crate::query::QueryKind;
use thiserror::Error;

/// Errors returned by template operations
#[derive(Error, Debug)]
pub enum SolrError {
    /// No parser is registered for the query's kind
    #[error("No query parser registered for query kind '{0}'")]
    UnsupportedQueryKind(QueryKind),

    /// The operation is not available on the configured backend
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Network, protocol or (de)serialization failure
    #[error("Transport failure: {message}")]
    Transport { message: String, source: ClientError },

    /// A remote failure the translator did not recognise
    #[error("Uncategorized Solr failure: {message}")]
    Uncategorized { message: String, source: ClientError },

    /// The caller passed an argument the operation cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SolrError {
    /// Wrap a raw failure as a transport error, keeping its message
    pub fn transport(source: ClientError) -> Self {
        Self::Transport {
            message: source.to_string(),
            source,
        }
    }

    /// Wrap a raw failure the translator could not classify
    pub fn uncategorized(source: ClientError) -> Self {
        Self::Uncategorized {
            message: source.to_string(),
            source,
        }
    }

    /// Shorthand for argument validation failures
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether this error came back from (or on the way to) the engine
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Uncategorized { .. })
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SolrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_keeps_message() {
        let err = SolrError::transport(ClientError::Status {
            status: 503,
            message: "core is loading".to_string(),
        });
        assert!(err.is_remote());
        assert!(err.to_string().contains("core is loading"));
    }

    #[test]
    fn test_unsupported_kind_display() {
        let err = SolrError::UnsupportedQueryKind(QueryKind::Custom("geo".to_string()));
        assert_eq!(
            err.to_string(),
            "No query parser registered for query kind 'geo'"
        );
        assert!(!err.is_remote());
    }
}
