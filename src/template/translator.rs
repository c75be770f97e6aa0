//! Translation of raw client failures into the domain error taxonomy

use crate::client::ClientError;
use crate::error::SolrError;

/// Maps raw failures to domain errors. `Err` hands the failure back
/// unrecognised; the caller wraps it as [`SolrError::Uncategorized`].
pub trait ExceptionTranslator: Send + Sync {
    fn translate(&self, error: ClientError) -> Result<SolrError, ClientError>;
}

/// Default translator for the HTTP client
#[derive(Debug, Default, Clone, Copy)]
pub struct SolrExceptionTranslator;

impl SolrExceptionTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl ExceptionTranslator for SolrExceptionTranslator {
    fn translate(&self, error: ClientError) -> Result<SolrError, ClientError> {
        match error.status() {
            // core missing or engine unavailable
            Some(404) | Some(503) => Ok(SolrError::transport(error)),
            Some(_) => Err(error),
            // connect, timeout, body, url and (de)serialization failures
            None => Ok(SolrError::transport(error)),
        }
    }
}

/// Translate `error`, wrapping anything unrecognised
pub(crate) fn translate_or_wrap(translator: &dyn ExceptionTranslator, error: ClientError) -> SolrError {
    translator
        .translate(error)
        .unwrap_or_else(SolrError::uncategorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> ClientError {
        ClientError::Status {
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_unavailable_is_transport() {
        for code in [404, 503] {
            let err = SolrExceptionTranslator.translate(status(code)).unwrap();
            assert!(matches!(err, SolrError::Transport { .. }));
        }
    }

    #[test]
    fn test_other_status_is_unrecognised() {
        let err = SolrExceptionTranslator.translate(status(400)).unwrap_err();
        assert_eq!(err.status(), Some(400));

        let wrapped = translate_or_wrap(&SolrExceptionTranslator, status(500));
        match wrapped {
            SolrError::Uncategorized { message, source } => {
                assert!(message.contains("boom"));
                assert_eq!(source.status(), Some(500));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_and_conversion_are_transport() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            SolrExceptionTranslator.translate(ClientError::Decode(decode)),
            Ok(SolrError::Transport { .. })
        ));
        assert!(matches!(
            SolrExceptionTranslator.translate(ClientError::Conversion("bad".to_string())),
            Ok(SolrError::Transport { .. })
        ));
    }
}
