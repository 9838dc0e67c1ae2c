// src/fetcher/http.rs
use super::Fetcher;
use crate::error::FetchError;
use crate::types::Document;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

const CHALLENGE_MARKERS: &[&str] = &[
    "our systems have detected unusual traffic",
    "/sorry/index",
];

/// Plain GET with a browser-like request signature.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Self::with_user_agent(timeout, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(Self::browser_headers())
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }

    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers
    }

    fn looks_like_challenge(body: &str) -> bool {
        let lower = body.to_lowercase();
        CHALLENGE_MARKERS.iter().any(|marker| lower.contains(marker))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        info!(url = %url, "Fetching search results");

        let network_error = |e: reqwest::Error| {
            warn!(url = %url, error = %e, timeout = e.is_timeout(), "HTTP request failed");
            FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Search page returned error status");
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(network_error)?;

        if Self::looks_like_challenge(&body) {
            warn!(url = %url, "Search page is a challenge page");
            return Err(FetchError::Blocked {
                url: url.to_string(),
            });
        }

        debug!(url = %final_url, bytes = body.len(), "Fetched search results");
        Ok(Document::new(final_url, body))
    }
}
