// src/error.rs
//! Typed failures surfaced by the search pipeline.

use thiserror::Error;

/// Failures of a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure, timeout, or broken body read. Eligible for retry.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Non-2xx response.
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// 2xx response that is actually a challenge / unusual-traffic page.
    #[error("request to {url} was blocked by the remote site")]
    Blocked { url: String },

    /// The HTTP client could not be constructed. Never retried.
    #[error("failed to create HTTP client: {message}")]
    Client { message: String },
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network { .. })
    }
}

/// The document as a whole does not look like a results page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,

    #[error("document is not markup")]
    NotMarkup,
}

/// Reasons the language-model delegate could not produce filters.
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("delegate request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("delegate returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("delegate reply was not a JSON object: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to parse results page: {0}")]
    Parse(#[from] ParseError),

    #[error("search cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("failed to set up fetcher: {0}")]
    Fetcher(#[source] FetchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_errors_are_retryable() {
        let network = FetchError::Network {
            url: "https://example.com".to_string(),
            message: "timed out".to_string(),
        };
        let http = FetchError::Http {
            url: "https://example.com".to_string(),
            status: 403,
        };
        let blocked = FetchError::Blocked {
            url: "https://example.com".to_string(),
        };
        let client = FetchError::Client {
            message: "bad user agent".to_string(),
        };

        assert!(network.is_retryable());
        assert!(!http.is_retryable());
        assert!(!blocked.is_retryable());
        assert!(!client.is_retryable());
    }

    #[test]
    fn test_search_error_wraps_fetch_error_message() {
        let err: SearchError = FetchError::Http {
            url: "https://example.com".to_string(),
            status: 429,
        }
        .into();
        assert_eq!(err.to_string(), "HTTP 429 from https://example.com");
    }
}
