// src/fetcher/mod.rs
use crate::error::FetchError;
use crate::types::Document;
use async_trait::async_trait;
use url::Url;

pub mod http;
pub mod rate_limit;
pub mod retry;

pub use http::HttpFetcher;
pub use rate_limit::{FetchLimiter, RateLimitedFetcher};
pub use retry::{RetryPolicy, RetryingFetcher};

/// One network retrieval of a search URL. Implementations never retry internally.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Document, FetchError>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for std::sync::Arc<F> {
    async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        (**self).fetch(url).await
    }
}
