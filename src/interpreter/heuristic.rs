// src/interpreter/heuristic.rs
use super::QueryInterpreter;
use crate::types::FilterSet;
use crate::vocabulary::{self, best_match, match_location, normalize_text};
use async_trait::async_trait;
use tracing::debug;

/// Keyword matcher over the vocabulary tables. Pure, never calls out.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicInterpreter;

impl HeuristicInterpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, query: &str) -> FilterSet {
        let normalized = normalize_text(query);
        if normalized.is_empty() {
            return FilterSet::default();
        }

        let filters = FilterSet {
            location: match_location(&normalized).map(str::to_string),
            target_level: best_match(vocabulary::TARGET_LEVELS, &normalized),
            degree: best_match(vocabulary::DEGREES, &normalized),
            employment_type: best_match(vocabulary::EMPLOYMENT_TYPES, &normalized),
            remote: best_match(vocabulary::REMOTE, &normalized),
        };

        debug!("Heuristic filters for {:?}: {:?}", query, filters);
        filters
    }
}

#[async_trait]
impl QueryInterpreter for HeuristicInterpreter {
    async fn interpret(&self, query: &str) -> FilterSet {
        self.extract(query)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
