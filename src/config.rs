// src/config.rs
//! Loading of search settings from YAML and the environment.
//!
//! Nothing below `pipeline` reads the environment; values flow in from here.

use crate::error::ConfigError;
use crate::fetcher::http::DEFAULT_USER_AGENT;
use crate::fetcher::rate_limit::DEFAULT_REQUESTS_PER_SECOND;
use crate::fetcher::RetryPolicy;
use crate::interpreter::llm::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::interpreter::DelegateSettings;
use crate::url_builder::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub requests_per_second: u32,
    pub user_agent: String,
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 4000,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            llm: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

impl SearchConfig {
    /// Read settings from a YAML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: SearchConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `CAREERS_*` and `OPENAI_*` environment overrides.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(base_url) = lookup("CAREERS_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(timeout) = lookup("CAREERS_TIMEOUT_SECS") {
            self.timeout_secs = timeout.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "CAREERS_TIMEOUT_SECS".to_string(),
                value: timeout.clone(),
            })?;
        }

        if let Some(api_key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.llm.get_or_insert_with(LlmConfig::default).api_key = api_key;
        }
        if let Some(llm) = self.llm.as_mut() {
            if let Some(model) = lookup("OPENAI_MODEL") {
                llm.model = model;
            }
            if let Some(api_base) = lookup("OPENAI_API_BASE") {
                llm.api_base = api_base;
            }
        }

        Ok(self)
    }

    /// Drop the delegate so the heuristic interpreter is used.
    pub fn without_llm(mut self) -> Self {
        self.llm = None;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        )
    }

    /// Delegate settings, present only when an API key is configured.
    pub fn delegate_settings(&self) -> Option<DelegateSettings> {
        let llm = self.llm.as_ref()?;
        if llm.api_key.trim().is_empty() {
            return None;
        }

        Some(DelegateSettings {
            api_key: llm.api_key.clone(),
            model: llm.model.clone(),
            api_base: llm.api_base.clone(),
            timeout: Duration::from_secs(llm.timeout_secs.max(1)),
        })
    }
}
