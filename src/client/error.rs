//! Raw failures produced by the wire client, before translation

use thiserror::Error;

/// Untranslated error from a remote call or a document conversion
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Solr returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode Solr response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Document conversion failed: {0}")]
    Conversion(String),

    #[error("Invalid client settings: {0}")]
    InvalidSettings(String),
}

impl ClientError {
    /// HTTP status reported by the engine, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
