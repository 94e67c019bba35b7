//! Adzuna job search API client.
//!
//! Provides a client for the paged job search endpoint with rate limiting,
//! request validation, and status mapping.
//!
//! ### Endpoint
//!
//! - **URL**: `{base}/jobs/{country}/search/{page}`
//! - **Authentication**: `app_id` and `app_key` query parameters.
//! - **Rate Limiting**: a minimum interval between requests from this client.
//!   Retries are left to the caller, since every call is billed.
//! - **Status mapping**: 401/403 auth, 429 rate limited, other 4xx/5xx HTTP error.

pub mod error;
pub mod request;
pub mod response;

pub use error::AdzunaError;
pub use request::JobsRequest;
pub use response::AdzunaResponse;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jobcache_core::config::AppConfig;
use jobcache_core::model::SearchQuery;
use jobcache_core::{JobSource, RawJobPage, SourceError};
use reqwest::header;
use tokio::sync::Mutex;
use url::Url;

/// Minimum interval between requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(200);

/// Job API client configuration.
#[derive(Debug, Clone)]
pub struct AdzunaConfig {
    pub app_id: String,
    pub app_key: String,
    /// Base URL (default: https://api.adzuna.com/v1/api).
    pub base_url: String,
    /// Per-call timeout (default: 10s).
    pub timeout: Duration,
    pub user_agent: String,
    pub min_interval: Duration,
}

impl AdzunaConfig {
    /// Build client settings from the application config.
    ///
    /// Returns an error if either credential is missing.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, AdzunaError> {
        let (app_id, app_key) = config
            .require_api_credentials()
            .map_err(|e| AdzunaError::MissingCredentials(e.to_string()))?;

        Ok(Self {
            app_id: app_id.to_string(),
            app_key: app_key.to_string(),
            base_url: config.api_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            min_interval: MIN_REQUEST_INTERVAL,
        })
    }
}

/// Rate limiter to enforce request intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self { last_request: Mutex::new(None), min_interval }
    }

    /// Wait until the interval since the previous request has passed.
    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Job search API client.
#[derive(Debug, Clone)]
pub struct AdzunaClient {
    http: reqwest::Client,
    config: AdzunaConfig,
    base_url: Url,
    rate_limiter: Arc<RateLimiter>,
}

impl AdzunaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: AdzunaConfig) -> Result<Self, AdzunaError> {
        if config.app_id.is_empty() {
            return Err(AdzunaError::MissingCredentials("app_id".to_string()));
        }
        if config.app_key.is_empty() {
            return Err(AdzunaError::MissingCredentials("app_key".to_string()));
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| AdzunaError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(AdzunaError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| AdzunaError::Network(Arc::new(e)))?;

        Ok(Self { http, rate_limiter: Arc::new(RateLimiter::new(config.min_interval)), config, base_url })
    }

    /// Create a client from the application config.
    pub fn from_config(config: &AppConfig) -> Result<Self, AdzunaError> {
        Self::new(AdzunaConfig::from_app_config(config)?)
    }

    /// `{base}/jobs/{country}/search/{page}`
    fn endpoint(&self, req: &JobsRequest) -> Result<Url, AdzunaError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AdzunaError::InvalidBaseUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(["jobs", req.country.as_str(), "search", &req.page.to_string()]);
        Ok(url)
    }

    /// Fetch one page of results.
    ///
    /// This method handles rate limiting, request validation, and status mapping.
    pub async fn search(&self, req: &JobsRequest) -> Result<AdzunaResponse, AdzunaError> {
        req.validate()?;
        let url = self.endpoint(req)?;

        self.rate_limiter.acquire().await;

        let start = Instant::now();
        tracing::debug!(what = %req.what, page = req.page, country = %req.country, "querying job API");

        let http_response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(&[("app_id", &self.config.app_id), ("app_key", &self.config.app_key)])
            .query(req)
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!(%status, "job API response status");

        if status == 401 || status == 403 {
            return Err(AdzunaError::AuthError);
        }

        if status == 429 {
            return Err(AdzunaError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(AdzunaError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let response: AdzunaResponse = serde_json::from_slice(&bytes).map_err(|e| AdzunaError::Parse(e.to_string()))?;

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            results = response.results.len(),
            count = response.count,
            "job API page fetched"
        );

        Ok(response)
    }
}

#[async_trait]
impl JobSource for AdzunaClient {
    fn name(&self) -> &str {
        "adzuna"
    }

    async fn fetch_page(&self, query: &SearchQuery, page: u32, per_page: u32) -> Result<RawJobPage, SourceError> {
        let req = JobsRequest::new(query.raw_keywords.trim(), query.raw_location.trim(), query.country.as_str())
            .page(page)
            .results_per_page(per_page);

        Ok(self.search(&req).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;

    fn config(base_url: &str) -> AdzunaConfig {
        AdzunaConfig {
            app_id: "id".to_string(),
            app_key: "key".to_string(),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
            user_agent: "job-cache/test".to_string(),
            min_interval: Duration::ZERO,
        }
    }

    #[test]
    fn test_client_new_missing_credentials() {
        let mut cfg = config("https://api.adzuna.com/v1/api");
        cfg.app_key.clear();
        assert!(matches!(AdzunaClient::new(cfg), Err(AdzunaError::MissingCredentials(_))));
    }

    #[test]
    fn test_client_from_app_config_requires_credentials() {
        let result = AdzunaClient::from_config(&AppConfig::default());
        assert!(matches!(result, Err(AdzunaError::MissingCredentials(_))));
    }

    #[test]
    fn test_endpoint_path() {
        let client = AdzunaClient::new(config("https://api.adzuna.com/v1/api/")).unwrap();
        let req = JobsRequest::new("chef", "", "gb").page(3);
        assert_eq!(client.endpoint(&req).unwrap().as_str(), "https://api.adzuna.com/v1/api/jobs/gb/search/3");
    }

    #[tokio::test]
    async fn test_fetch_page_sends_credentials_and_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/v1/api/jobs/gb/search/2")
                    .header("accept", "application/json")
                    .query_param("app_id", "id")
                    .query_param("app_key", "key")
                    .query_param("what", "Head Chef")
                    .query_param("where", "Leeds")
                    .query_param("results_per_page", "20");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"count": 42, "results": [{"id": "1", "title": "Chef"}]}"#);
            })
            .await;
        let client = AdzunaClient::new(config(&server.url("/v1/api"))).unwrap();
        let query = SearchQuery::new("Head Chef", "Leeds", 0, "gb");

        let page = client.fetch_page(&query, 2, 20).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.count, 42);
        assert_eq!(page.records.len(), 1);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        for (status, expected) in [(401, "auth"), (403, "auth"), (429, "rate"), (500, "http")] {
            let server = MockServer::start_async().await;
            let mock = server
                .mock_async(|when, then| {
                    when.method("GET").path("/v1/api/jobs/gb/search/1");
                    then.status(status).header("content-type", "application/json").body("{}");
                })
                .await;
            let client = AdzunaClient::new(config(&server.url("/v1/api"))).unwrap();

            let err = client.search(&JobsRequest::new("chef", "", "gb")).await.unwrap_err();

            mock.assert_async().await;
            let matched = match expected {
                "auth" => matches!(err, AdzunaError::AuthError),
                "rate" => matches!(err, AdzunaError::RateLimited),
                _ => matches!(err, AdzunaError::HttpError { status: 500 }),
            };
            assert!(matched, "status {status} mapped to {err:?}");
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET").path("/v1/api/jobs/gb/search/1");
                then.status(200).header("content-type", "application/json").body("not json");
            })
            .await;
        let client = AdzunaClient::new(config(&server.url("/v1/api"))).unwrap();

        let err = client.search(&JobsRequest::new("chef", "", "gb")).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, AdzunaError::Parse(_)));
    }

    #[tokio::test]
    async fn test_invalid_request_not_sent() {
        let client = AdzunaClient::new(config("http://127.0.0.1:9/v1/api")).unwrap();
        let err = client.search(&JobsRequest::new("", "", "gb")).await.unwrap_err();
        assert!(matches!(err, AdzunaError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
