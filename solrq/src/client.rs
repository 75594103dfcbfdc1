//! Solr clients
//!
//! [`SolrClient`] is the seam between query compilation and the network:
//! [`HttpSolrClient`] talks to a Solr core over HTTP, tests plug in their
//! own implementations.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};
use crate::params::SolrParams;
use crate::results::SolrResults;

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Executes a compiled query against a Solr index.
#[async_trait]
pub trait SolrClient: Send + Sync {
    /// Run `q` with the extra request parameters and return the parsed results.
    async fn search(&self, q: &str, params: &SolrParams) -> Result<SolrResults>;
}

/// Solr client using the `select` request handler of one core.
#[derive(Debug, Clone)]
pub struct HttpSolrClient {
    client: Client,
    select_url: Url,
}

impl HttpSolrClient {
    /// Create a client for the core at `base_url`, e.g. `http://localhost:8983/solr/erudit/`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Reuse an existing (connection pooled) `reqwest` client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        let select_url = base.join("select")?;

        Ok(Self { client, select_url })
    }

    pub fn select_url(&self) -> &Url {
        &self.select_url
    }
}

#[async_trait]
impl SolrClient for HttpSolrClient {
    async fn search(&self, q: &str, params: &SolrParams) -> Result<SolrResults> {
        tracing::debug!(url = %self.select_url, q, "Sending Solr select request");

        let response = self
            .client
            .get(self.select_url.clone())
            .query(&[("q", q), ("wt", "json")])
            .query(&params.pairs())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let results = SolrResults::from_json(&body)?;

        tracing::debug!(hits = results.hits, docs = results.docs.len(), "Solr select done");
        Ok(results)
    }
}
