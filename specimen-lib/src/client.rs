//! Main SpecimenClient

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::model::{QueryResponse, TaxonNode, TaxonomyPayload};
use crate::query::{GenusQuery, QueryState};

const TAXONOMY_PATH: &str = "/api/taxonomy_json";
const BUILD_QUERY_PATH: &str = "/api/build_query";
const QUERY_PATH: &str = "/api/query";

/// Client for the specimen search server.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks.
///
/// # Example
///
/// ```ignore
/// use specimen_lib::SpecimenClient;
///
/// let client = SpecimenClient::builder()
///     .url("http://localhost:8000")
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// let forest = client.fetch_taxonomy().await?;
/// ```
#[derive(Clone)]
pub struct SpecimenClient {
    inner: Arc<SpecimenClientInner>,
}

struct SpecimenClientInner {
    base_url: String,
    http_client: Client,
    timeout: Option<Duration>,
}

impl SpecimenClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> SpecimenClientBuilder<Missing> {
        SpecimenClientBuilder::new()
    }

    /// Returns the server base URL.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Fetches the taxonomy and normalizes it to a forest.
    pub async fn fetch_taxonomy(&self) -> Result<Vec<TaxonNode>, ApiError> {
        let request = self.inner.http_client.get(self.endpoint(TAXONOMY_PATH));
        let payload: TaxonomyPayload = self.send(request).await?;
        let forest = payload.into_forest();

        info!("Loaded taxonomy: {} root(s)", forest.len());
        Ok(forest)
    }

    /// Posts the form state and returns the built query and its rows.
    pub async fn build_query(&self, state: &QueryState) -> Result<QueryResponse, ApiError> {
        debug!(
            "Building query: {} taxa, rank {:?}",
            state.taxonomy.len(),
            state.identification_rank
        );
        let request = self
            .inner
            .http_client
            .post(self.endpoint(BUILD_QUERY_PATH))
            .json(state);
        self.send(request).await
    }

    /// Runs the plain genus query.
    pub async fn run_query(
        &self,
        query: &GenusQuery,
    ) -> Result<Vec<Vec<serde_json::Value>>, ApiError> {
        let mut url = url::Url::parse(&self.endpoint(QUERY_PATH))
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().extend_pairs(query.pairs());

        let request = self.inner.http_client.get(url);
        self.send(request).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(&self, mut request: RequestBuilder) -> Result<T, ApiError> {
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            } else {
                body
            };
            warn!("Request failed with HTTP {}", status.as_u16());
            return Err(ApiError::http(status.as_u16(), message));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::parse_with_body(e.to_string(), body))
    }
}

impl std::fmt::Debug for SpecimenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecimenClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`SpecimenClient`].
///
/// The server URL is required and checked at compile time; it is parsed
/// when [`build`](SpecimenClientBuilder::build) is called.
pub struct SpecimenClientBuilder<Url> {
    url: Url,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl SpecimenClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the server base URL.
    pub fn url(self, url: impl Into<String>) -> SpecimenClientBuilder<Set<String>> {
        SpecimenClientBuilder {
            url: Set(url.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for SpecimenClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> SpecimenClientBuilder<U> {
    /// Sets the per-request timeout. Requests never time out by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl SpecimenClientBuilder<Set<String>> {
    /// Builds the [`SpecimenClient`].
    ///
    /// Fails if the URL is not an absolute `http`/`https` URL.
    pub fn build(self) -> Result<SpecimenClient, ApiError> {
        let parsed =
            url::Url::parse(&self.url.0).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.url.0, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                self.url.0,
                parsed.scheme()
            )));
        }

        let http_client = self.http_client.unwrap_or_else(|| {
            let mut builder = Client::builder();
            if let Some(timeout) = self.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            builder.build().expect("Failed to build HTTP client")
        });

        Ok(SpecimenClient {
            inner: Arc::new(SpecimenClientInner {
                base_url: self.url.0,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_path() {
        let client = SpecimenClient::builder()
            .url("http://localhost:8000/")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(TAXONOMY_PATH), "http://localhost:8000/api/taxonomy_json");
        assert_eq!(client.base_url(), "http://localhost:8000/");
    }

    #[test]
    fn test_rejects_bad_urls() {
        let err = SpecimenClient::builder().url("not a url").build().unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));

        let err = SpecimenClient::builder().url("ftp://example.org").build().unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }
}
