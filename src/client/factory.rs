//! Client factory handed to the template

use super::error::ClientError;
use super::http::SolrClient;

/// Hands out a client for a core; called once per remote call
pub trait SolrClientFactory: Send + Sync {
    /// Client bound to `core`, or to the factory's default core when `None`
    fn client(&self, core: Option<&str>) -> Result<SolrClient, ClientError>;
}

/// Factory sharing one HTTP connection pool across cores
#[derive(Debug, Clone)]
pub struct HttpSolrClientFactory {
    client: SolrClient,
}

impl HttpSolrClientFactory {
    pub fn new(client: SolrClient) -> Self {
        Self { client }
    }

    /// Default core of the wrapped client
    pub fn default_core(&self) -> Option<&str> {
        self.client.core()
    }
}

impl SolrClientFactory for HttpSolrClientFactory {
    fn client(&self, core: Option<&str>) -> Result<SolrClient, ClientError> {
        match core {
            Some(core) => Ok(self.client.with_core(Some(core))),
            None => Ok(self.client.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_binds_core() {
        let client = SolrClient::new("http://localhost:8983/solr")
            .unwrap()
            .with_core(Some("default"));
        let factory = HttpSolrClientFactory::new(client);

        assert_eq!(factory.default_core(), Some("default"));
        assert_eq!(factory.client(None).unwrap().core(), Some("default"));
        assert_eq!(factory.client(Some("other")).unwrap().core(), Some("other"));
    }
}
