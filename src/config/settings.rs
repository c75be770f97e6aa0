//! Settings structures for the template

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub solr: SolrSettings,
    pub template: TemplateSettings,
    pub cursor: CursorSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (SOLR_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("SOLR_BASE_URL") {
            self.solr.base_url = val;
        }
        if let Ok(val) = std::env::var("SOLR_CORE") {
            self.solr.core = if val.is_empty() { None } else { Some(val) };
        }
        if let Ok(val) = std::env::var("SOLR_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.solr.request_timeout = timeout;
            }
        }
        if let Ok(val) = std::env::var("SOLR_SERVER_VERSION") {
            self.template.server_version = val;
        }
    }
}

/// Connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolrSettings {
    /// Base URL of the Solr web app, e.g. `http://localhost:8983/solr`
    pub base_url: String,
    /// Default core (collection) name
    pub core: Option<String>,
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for SolrSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8983/solr".to_string(),
            core: None,
            request_timeout: 5.0,
            pool_maxsize: 10,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Behaviour of the template itself. Fixed once the template is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Version of the engine behind `solr.base_url`
    pub server_version: String,
    /// Commit window applied by the `save_*` shorthands; `None` requires an explicit commit
    pub default_commit_within_ms: Option<u64>,
    /// Schema features the (external) schema creator may use
    pub schema_creation_features: BTreeSet<SchemaCreationFeature>,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            server_version: "8.11".to_string(),
            default_commit_within_ms: None,
            schema_creation_features: BTreeSet::new(),
        }
    }
}

impl TemplateSettings {
    /// Major component of `server_version`
    pub fn server_major_version(&self) -> Option<u32> {
        self.server_version
            .trim()
            .split('.')
            .next()
            .and_then(|major| major.parse().ok())
    }

    /// Soft commits arrived with 4.0; unparseable versions are assumed current
    pub fn supports_soft_commit(&self) -> bool {
        self.server_major_version().map_or(true, |major| major >= 4)
    }

    pub fn default_commit_within(&self) -> Option<Duration> {
        self.default_commit_within_ms.map(Duration::from_millis)
    }

    pub fn is_enabled(&self, feature: SchemaCreationFeature) -> bool {
        self.schema_creation_features.contains(&feature)
    }
}

/// Schema features handed to the external schema creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaCreationFeature {
    CreateMissingFields,
}

/// Cursor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorSettings {
    /// Rows fetched per round trip when the query has no page request
    pub batch_size: u32,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.solr.base_url, "http://localhost:8983/solr");
        assert!(settings.solr.core.is_none());
        assert_eq!(settings.cursor.batch_size, 100);
        assert!(settings.template.default_commit_within().is_none());
    }

    #[test]
    fn test_yaml_overrides() {
        let settings = Settings::from_yaml(
            r#"
solr:
  base_url: http://search:8983/solr
  core: products
template:
  server_version: "3.6.2"
  default_commit_within_ms: 500
  schema_creation_features: [create_missing_fields]
cursor:
  batch_size: 25
"#,
        )
        .unwrap();

        assert_eq!(settings.solr.core.as_deref(), Some("products"));
        assert_eq!(settings.solr.request_timeout, 5.0);
        assert_eq!(settings.cursor.batch_size, 25);
        assert_eq!(settings.template.server_major_version(), Some(3));
        assert!(!settings.template.supports_soft_commit());
        assert_eq!(
            settings.template.default_commit_within(),
            Some(Duration::from_millis(500))
        );
        assert!(settings
            .template
            .is_enabled(SchemaCreationFeature::CreateMissingFields));
    }

    #[test]
    fn test_soft_commit_support() {
        let mut template = TemplateSettings::default();
        assert!(template.supports_soft_commit());

        template.server_version = "4.0".to_string();
        assert!(template.supports_soft_commit());

        template.server_version = "unknown".to_string();
        assert!(template.supports_soft_commit());
    }
}
