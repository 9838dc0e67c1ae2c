// src/interpreter/mod.rs
use crate::types::FilterSet;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

pub mod delegate;
pub mod heuristic;
pub mod llm;

pub use delegate::DelegatingInterpreter;
pub use heuristic::HeuristicInterpreter;
pub use llm::{FilterExtractor, LlmExtractor};

/// Turns a raw query into a FilterSet. Never fails; the worst case is an empty set.
#[async_trait]
pub trait QueryInterpreter: Send + Sync {
    async fn interpret(&self, query: &str) -> FilterSet;

    fn name(&self) -> &'static str;
}

/// Delegate settings handed in by whoever loads configuration.
#[derive(Debug, Clone)]
pub struct DelegateSettings {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Picks the interpreter strategy once, at construction time.
///
/// Without settings (or with an empty key) this is exactly the heuristic interpreter.
pub fn build_interpreter(settings: Option<&DelegateSettings>) -> Box<dyn QueryInterpreter> {
    let Some(settings) = settings.filter(|s| !s.api_key.trim().is_empty()) else {
        info!("Using heuristic query interpreter");
        return Box::new(HeuristicInterpreter::new());
    };

    match LlmExtractor::new(settings.api_key.clone(), settings.timeout) {
        Ok(extractor) => {
            info!("Using language-model query interpreter ({})", settings.model);
            let extractor = extractor
                .with_model(settings.model.clone())
                .with_api_base(settings.api_base.clone());
            Box::new(DelegatingInterpreter::new(Box::new(extractor)))
        }
        Err(e) => {
            warn!("Failed to create language-model client, using heuristic: {}", e);
            Box::new(HeuristicInterpreter::new())
        }
    }
}
