// src/fetcher/retry.rs
use super::Fetcher;
use crate::error::FetchError;
use crate::types::Document;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never less than 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
        }
    }

    /// Delay before retry number `retry` (1-based): doubles each time, capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Retries transient network failures with exponential backoff.
///
/// HTTP-level failures (error statuses, challenge pages) are returned immediately.
pub struct RetryingFetcher<F: Fetcher> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.fetch(url).await {
                Ok(document) => return Ok(document),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        url = %url,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Fetch failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::HttpFetcher;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    /// Replays a scripted sequence of outcomes.
    struct ScriptedFetcher {
        outcomes: Mutex<Vec<Result<&'static str, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(mut outcomes: Vec<Result<&'static str, FetchError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .outcomes
                .lock()
                .unwrap()
                .pop()
                .expect("scripted fetcher ran out of outcomes");
            next.map(|body| Document::new(url.clone(), body))
        }
    }

    fn network() -> FetchError {
        FetchError::Network {
            url: "https://example.com/".to_string(),
            message: "connection reset".to_string(),
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1), Duration::from_millis(5))
    }

    fn url() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(350));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(fast_policy(0).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let fetcher = RetryingFetcher::new(
            ScriptedFetcher::new(vec![Err(network()), Ok("<html></html>")]),
            fast_policy(3),
        );

        let document = fetcher.fetch(&url()).await.unwrap();
        assert_eq!(document.body, "<html></html>");
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stops_at_attempt_limit() {
        let fetcher = RetryingFetcher::new(
            ScriptedFetcher::new(vec![Err(network()), Err(network()), Err(network())]),
            fast_policy(3),
        );

        assert!(matches!(
            fetcher.fetch(&url()).await,
            Err(FetchError::Network { .. })
        ));
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_http_error_is_not_retried() {
        let fetcher = RetryingFetcher::new(
            ScriptedFetcher::new(vec![Err(FetchError::Http {
                url: "https://example.com/".to_string(),
                status: 403,
            })]),
            fast_policy(3),
        );

        assert!(matches!(
            fetcher.fetch(&url()).await,
            Err(FetchError::Http { status: 403, .. })
        ));
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_forbidden_response_is_requested_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(403)
            .expect(1)
            .create_async()
            .await;

        let fetcher = RetryingFetcher::new(
            HttpFetcher::new(Duration::from_secs(5)).unwrap(),
            fast_policy(3),
        );
        let url = Url::parse(&server.url()).unwrap();

        assert!(matches!(
            fetcher.fetch(&url).await,
            Err(FetchError::Http { status: 403, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_timeouts_stop_at_attempt_limit() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(socket);
            }
        });

        let fetcher = RetryingFetcher::new(
            HttpFetcher::new(Duration::from_millis(150)).unwrap(),
            fast_policy(2),
        );
        let url = Url::parse(&format!("http://{}/", addr)).unwrap();

        assert!(matches!(
            fetcher.fetch(&url).await,
            Err(FetchError::Network { .. })
        ));
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
    }
}
