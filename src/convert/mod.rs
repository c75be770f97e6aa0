//! Conversion between typed entities and engine documents

use crate::client::{ClientError, SolrDocument, SolrInputDocument};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Metadata a stored type exposes to the template
pub trait SolrEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Field holding the unique key; highlighting is keyed by it
    fn id_field() -> &'static str {
        "id"
    }

    /// Whether the type maps the `score` pseudo-field
    fn has_score_property() -> bool {
        false
    }
}

impl SolrEntity for SolrDocument {}

/// Entity ↔ document mapping
pub trait SolrConverter: Send + Sync {
    /// Entity → document to index
    fn write<T: Serialize>(&self, entity: &T) -> Result<SolrInputDocument, ClientError>;

    /// Document → entity
    fn read<T: DeserializeOwned>(&self, document: &SolrDocument) -> Result<T, ClientError>;

    fn read_all<T: DeserializeOwned>(&self, documents: &[SolrDocument]) -> Result<Vec<T>, ClientError> {
        documents.iter().map(|doc| self.read(doc)).collect()
    }
}

/// Serde based converter: field names follow the entity's serde attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingSolrConverter;

impl MappingSolrConverter {
    pub fn new() -> Self {
        Self
    }
}

impl SolrConverter for MappingSolrConverter {
    fn write<T: Serialize>(&self, entity: &T) -> Result<SolrInputDocument, ClientError> {
        match serde_json::to_value(entity)? {
            Value::Object(mut document) => {
                document.retain(|_, value| !value.is_null());
                Ok(document)
            }
            Value::Array(_) => Err(ClientError::Conversion(
                "expected a single entity, got a collection".to_string(),
            )),
            other => Err(ClientError::Conversion(format!(
                "entity must serialize to an object, got {}",
                kind_of(&other)
            ))),
        }
    }

    fn read<T: DeserializeOwned>(&self, document: &SolrDocument) -> Result<T, ClientError> {
        Ok(serde_json::from_value(Value::Object(document.clone()))?)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
