// src/pipeline.rs
use crate::config::SearchConfig;
use crate::error::{ConfigError, FetchError, SearchError};
use crate::fetcher::{FetchLimiter, Fetcher, HttpFetcher, RateLimitedFetcher, RetryingFetcher};
use crate::interpreter::{build_interpreter, QueryInterpreter};
use crate::parser::ListingParser;
use crate::types::{FilterSet, SearchResults};
use crate::url_builder::UrlBuilder;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use url::Url;

/// Filters and URL for a query, before anything is fetched.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub filters: FilterSet,
    pub url: Url,
}

/// Query -> filters -> URL -> page -> listings, strictly in that order.
///
/// Instances hold no per-query state; the only thing shared between
/// instances is the fetch rate limiter.
pub struct JobSearch {
    interpreter: Box<dyn QueryInterpreter>,
    url_builder: UrlBuilder,
    fetcher: Arc<dyn Fetcher>,
    parser: ListingParser,
}

impl JobSearch {
    pub fn new(
        interpreter: Box<dyn QueryInterpreter>,
        url_builder: UrlBuilder,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            interpreter,
            url_builder,
            fetcher,
            parser: ListingParser::new(),
        }
    }

    /// Wire the full stack from configuration: HTTP fetcher wrapped in retry
    /// and the process-wide rate limiter.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ConfigError> {
        let url_builder =
            UrlBuilder::new(&config.base_url).map_err(|_| ConfigError::InvalidValue {
                key: "base_url".to_string(),
                value: config.base_url.clone(),
            })?;

        let http = HttpFetcher::with_user_agent(config.timeout(), &config.user_agent)
            .map_err(ConfigError::Fetcher)?;
        let limited = RateLimitedFetcher::new(http, FetchLimiter::global(config.requests_per_second));
        let fetcher = RetryingFetcher::new(limited, config.retry_policy());

        let interpreter = build_interpreter(config.delegate_settings().as_ref());

        Ok(Self::new(interpreter, url_builder, Arc::new(fetcher)))
    }

    pub fn with_parser(mut self, parser: ListingParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn interpreter_name(&self) -> &'static str {
        self.interpreter.name()
    }

    /// Interpret and build the URL without touching the network.
    pub async fn plan(&self, query: &str) -> SearchPlan {
        let filters = self.interpreter.interpret(query).await;
        let url = self.url_builder.build(&filters);
        info!("Planned search {} with {} interpreter", url, self.interpreter.name());
        SearchPlan { filters, url }
    }

    pub async fn search(&self, query: &str) -> Result<SearchResults, SearchError> {
        self.search_with_cancel(query, &CancellationToken::new()).await
    }

    /// Like [`search`](Self::search), aborting as soon as `cancel` fires.
    ///
    /// A cancelled search yields no filters and no listings.
    pub async fn search_with_cancel(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<SearchResults, SearchError> {
        let plan = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            plan = self.plan(query) => plan,
        };

        let document = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Search cancelled during fetch of {}", plan.url);
                return Err(SearchError::Cancelled);
            }
            fetched = self.fetcher.fetch(&plan.url) => fetched.map_err(|e: FetchError| {
                error!("Fetch failed for {}: {}", plan.url, e);
                e
            })?,
        };

        let listings = self.parser.parse(&document).map_err(|e| {
            error!("Results page could not be parsed: {}", e);
            e
        })?;

        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        Ok(SearchResults {
            filters: plan.filters,
            url: plan.url.to_string(),
            listings,
            fetched_at: Utc::now(),
        })
    }
}
