//! HTTP client for talking to a Solr core

use super::error::ClientError;
use super::request::{HttpMethod, SolrRequest};
use super::response::{
    ErrorResponse, PingResponse, QueryResponse, SchemaNameResponse, SolrInputDocument,
    UpdateResponse,
};
use crate::config::SolrSettings;
use crate::query::NativeQuery;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

/// HTTP client wrapper bound to an optional core
#[derive(Debug, Clone)]
pub struct SolrClient {
    client: Client,
    base_url: Url,
    core: Option<String>,
    default_timeout: Duration,
}

impl SolrClient {
    /// Create a client for `base_url` with default settings
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_settings(&SolrSettings {
            base_url: base_url.to_string(),
            ..SolrSettings::default()
        })
    }

    /// Create a client with custom settings
    pub fn with_settings(settings: &SolrSettings) -> Result<Self, ClientError> {
        let timeout = request_timeout(settings.request_timeout)?;
        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&settings.base_url)?,
            core: settings.core.clone(),
            default_timeout: timeout,
        })
    }

    /// Same connection pool, bound to another core
    pub fn with_core(&self, core: Option<&str>) -> Self {
        Self {
            core: core.map(str::to_string),
            ..self.clone()
        }
    }

    pub fn core(&self) -> Option<&str> {
        self.core.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a handler path against the base URL and core
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.as_str().trim_end_matches('/').to_string();
        if let Some(ref core) = self.core {
            url.push('/');
            url.push_str(core.trim_matches('/'));
        }
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
        Ok(Url::parse(&url)?)
    }

    /// Execute a request and decode the JSON answer
    pub async fn execute<R: DeserializeOwned>(&self, request: SolrRequest) -> Result<R, ClientError> {
        self.execute_with_timeout(request, self.default_timeout).await
    }

    /// Execute a request with a custom timeout
    pub async fn execute_with_timeout<R: DeserializeOwned>(
        &self,
        request: SolrRequest,
        timeout: Duration,
    ) -> Result<R, ClientError> {
        let url = self.endpoint(&request.path)?;

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };

        req_builder = req_builder
            .timeout(timeout)
            .header("Accept", "application/json");

        // Response format
        let mut params = request.params;
        if !params.iter().any(|(k, _)| k == "wt") {
            params.push(("wt".to_string(), "json".to_string()));
        }
        req_builder = req_builder.query(&params);

        if let Some(body) = request.body {
            req_builder = req_builder.json(&body);
        }

        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }

    /// Run a native query against its request handler
    pub async fn query(&self, query: &NativeQuery) -> Result<QueryResponse, ClientError> {
        let mut request = SolrRequest::get(query.handler()).params(query.params().iter().cloned());
        if !request.has_param("json.nl") {
            request = request.param("json.nl", "flat");
        }
        self.execute(request).await
    }

    /// Add documents, optionally asking the engine to commit within a window
    pub async fn add(
        &self,
        documents: Vec<SolrInputDocument>,
        commit_within: Option<Duration>,
    ) -> Result<UpdateResponse, ClientError> {
        let mut request = SolrRequest::post("/update");
        if let Some(window) = commit_within {
            request = request.param("commitWithin", window.as_millis().to_string());
        }
        let docs = documents.into_iter().map(Value::Object).collect();
        self.execute(request.json(Value::Array(docs))).await
    }

    /// Delete a single document by id
    pub async fn delete_by_id(&self, id: &str) -> Result<UpdateResponse, ClientError> {
        self.update(json!({ "delete": { "id": id } })).await
    }

    /// Delete several documents by id
    pub async fn delete_by_ids(&self, ids: &[String]) -> Result<UpdateResponse, ClientError> {
        self.update(json!({ "delete": ids })).await
    }

    /// Delete every document matching a query string
    pub async fn delete_by_query(&self, query: &str) -> Result<UpdateResponse, ClientError> {
        self.update(json!({ "delete": { "query": query } })).await
    }

    /// Hard commit, waiting for a new searcher
    pub async fn commit(&self) -> Result<UpdateResponse, ClientError> {
        self.update(json!({ "commit": { "waitSearcher": true } })).await
    }

    /// Soft commit: visible to searchers, not flushed to stable storage
    pub async fn soft_commit(&self) -> Result<UpdateResponse, ClientError> {
        self.update(json!({ "commit": { "softCommit": true, "waitSearcher": true } }))
            .await
    }

    /// Discard uncommitted changes
    pub async fn rollback(&self) -> Result<UpdateResponse, ClientError> {
        self.update(json!({ "rollback": {} })).await
    }

    /// Ping the core
    pub async fn ping(&self) -> Result<PingResponse, ClientError> {
        self.execute(SolrRequest::get("/admin/ping")).await
    }

    /// Real-time get, served from the update log as well as the index.
    ///
    /// One `id` parameter per id: the engine splits `ids` on commas.
    pub async fn realtime_get(&self, ids: &[String]) -> Result<QueryResponse, ClientError> {
        let request = SolrRequest::get("/get").params(ids.iter().map(|id| ("id", id.as_str())));
        self.execute(request).await
    }

    /// Name declared in the core's schema
    pub async fn schema_name(&self) -> Result<Option<String>, ClientError> {
        let response: SchemaNameResponse = self.execute(SolrRequest::get("/schema/name")).await?;
        Ok(response.name)
    }

    async fn update(&self, body: Value) -> Result<UpdateResponse, ClientError> {
        self.execute(SolrRequest::post("/update").json(body)).await
    }

    /// Check the status and decode the body
    async fn parse_response<R: DeserializeOwned>(response: Response) -> Result<R, ClientError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.msg)
                .unwrap_or(text);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Positive, finite timeout in seconds
fn request_timeout(seconds: f64) -> Result<Duration, ClientError> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(timeout) if !timeout.is_zero() => Ok(timeout),
        _ => Err(ClientError::InvalidSettings(format!(
            "request_timeout must be a positive number of seconds, got {}",
            seconds
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = SolrClient::new("http://localhost:8983/solr");
        assert!(client.is_ok());
    }

    #[test]
    fn test_endpoint_with_core() {
        let client = SolrClient::new("http://localhost:8983/solr/")
            .unwrap()
            .with_core(Some("products"));
        assert_eq!(
            client.endpoint("/select").unwrap().as_str(),
            "http://localhost:8983/solr/products/select"
        );
        assert_eq!(
            client.endpoint("admin/ping").unwrap().as_str(),
            "http://localhost:8983/solr/products/admin/ping"
        );
    }

    #[test]
    fn test_endpoint_without_core() {
        let client = SolrClient::new("http://localhost:8983/solr").unwrap();
        assert!(client.core().is_none());
        assert_eq!(
            client.endpoint("/update").unwrap().as_str(),
            "http://localhost:8983/solr/update"
        );
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        for timeout in [-1.0, 0.0, f64::NAN, f64::INFINITY, 1e300] {
            let result = SolrClient::with_settings(&SolrSettings {
                request_timeout: timeout,
                ..SolrSettings::default()
            });
            assert!(matches!(result, Err(ClientError::InvalidSettings(_))), "{}", timeout);
        }
        assert!(request_timeout(0.5).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let result = SolrClient::new("not a url");
        assert!(matches!(result, Err(ClientError::Url(_))));
    }
}
