// src/fetcher/rate_limit.rs
//! Process-wide request pacing for the fetcher, backed by `governor`.

use super::Fetcher;
use crate::error::FetchError;
use crate::types::Document;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::{Arc, OnceLock};
use tracing::debug;
use url::Url;

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 2;

static GLOBAL_LIMITER: OnceLock<FetchLimiter> = OnceLock::new();

/// Cloneable handle to a shared limiter. Safe to use from concurrent pipelines.
#[derive(Clone)]
pub struct FetchLimiter {
    inner: Arc<DirectRateLimiter>,
}

impl FetchLimiter {
    /// A zero rate is treated as one request per second.
    pub fn per_second(requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            inner: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
        }
    }

    /// The limiter shared by every pipeline in this process.
    ///
    /// The first caller fixes the rate.
    pub fn global(requests_per_second: u32) -> Self {
        GLOBAL_LIMITER
            .get_or_init(|| Self::per_second(requests_per_second))
            .clone()
    }

    pub async fn until_ready(&self) {
        self.inner.until_ready().await;
    }
}

/// Waits on a shared limiter before every fetch.
pub struct RateLimitedFetcher<F: Fetcher> {
    inner: F,
    limiter: FetchLimiter,
}

impl<F: Fetcher> RateLimitedFetcher<F> {
    pub fn new(inner: F, limiter: FetchLimiter) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for RateLimitedFetcher<F> {
    async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        self.limiter.until_ready().await;
        debug!(url = %url, "Rate limiter permit acquired");
        self.inner.fetch(url).await
    }
}
