//! Direct journey search over HTTP.
//!
//! Posts a search keyed by numeric location codes straight to the site's
//! search API and decodes the response graph. One request per call, no
//! retries.

use chrono::{DateTime, FixedOffset};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, info};

use crate::error::SearchError;
use crate::graph::RawSearchGraph;
use crate::request::{LocationCode, SearchRequestBody};

/// Default site the searches run against.
pub const DEFAULT_BASE_URL: &str = "https://www.thetrainline.com";

/// Path of the journey search API, relative to the base URL.
pub const SEARCH_PATH: &str = "/api/journey-search/";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "TRAINLINE_BASE_URL";

/// Configuration for the search client.
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    /// Base URL of the site (no trailing slash)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SearchClientConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Read overrides from the environment (`TRAINLINE_BASE_URL`).
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.is_empty() => Self::new().with_base_url(url),
            _ => Self::new(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the journey search API.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    search_url: String,
}

impl SearchClient {
    pub fn new(config: SearchClientConfig) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            search_url: format!("{}{SEARCH_PATH}", config.base_url),
        })
    }

    /// Search for journeys between two location codes.
    ///
    /// Arguments are validated before any network activity. Transport
    /// failures and non-success statuses are returned as they are.
    pub async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        departure_at: DateTime<FixedOffset>,
    ) -> Result<RawSearchGraph, SearchError> {
        let origin = LocationCode::parse(origin)?;
        let destination = LocationCode::parse(destination)?;
        let body = SearchRequestBody::single(&origin, &destination, departure_at);

        info!(
            origin = origin.as_str(),
            destination = destination.as_str(),
            %departure_at,
            "searching journeys by code"
        );

        let response = self.http.post(&self.search_url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "received search response");

        RawSearchGraph::from_json_str(&body)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn departure() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2023, 12, 3, 15, 30, 0)
            .unwrap()
    }

    #[test]
    fn config_builder() {
        let config = SearchClientConfig::new()
            .with_base_url("http://localhost:8080/")
            .with_timeout(5);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = SearchClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn search_url_under_base() {
        let client =
            SearchClient::new(SearchClientConfig::new().with_base_url("http://example.com"))
                .unwrap();
        assert_eq!(client.search_url, "http://example.com/api/journey-search/");
    }

    #[tokio::test]
    async fn invalid_codes_fail_before_any_request() {
        // Port 9 (discard) is never listening; an attempted request would
        // surface as `Http`, not `InvalidArgument`.
        let client =
            SearchClient::new(SearchClientConfig::new().with_base_url("http://127.0.0.1:9"))
                .unwrap();

        for (from, to) in [("", "5097"), ("3358", ""), ("Berlin Hbf", "5097")] {
            let err = client.fetch(from, to, departure()).await.unwrap_err();
            assert!(matches!(err, SearchError::InvalidArgument(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn connection_failure_is_forwarded() {
        let client = SearchClient::new(
            SearchClientConfig::new()
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(2),
        )
        .unwrap();

        let err = client.fetch("3358", "5097", departure()).await.unwrap_err();
        assert!(matches!(err, SearchError::Http(_)), "{err:?}");
    }
}
