// src/interpreter/delegate.rs
use super::heuristic::HeuristicInterpreter;
use super::llm::FilterExtractor;
use super::QueryInterpreter;
use crate::error::DelegateError;
use crate::types::{Degree, EmploymentType, FilterSet, TargetLevel, WireValue};
use crate::vocabulary::normalize_location;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Prefers the language-model delegate, falls back to the heuristic on any failure.
pub struct DelegatingInterpreter {
    delegate: Box<dyn FilterExtractor>,
    fallback: HeuristicInterpreter,
}

impl DelegatingInterpreter {
    pub fn new(delegate: Box<dyn FilterExtractor>) -> Self {
        Self {
            delegate,
            fallback: HeuristicInterpreter::new(),
        }
    }

    async fn try_delegate(&self, query: &str) -> Result<FilterSet, DelegateError> {
        let reply = self.delegate.extract(query).await?;
        let object = extract_json_object(&reply)?;
        Ok(validate_reply(&object))
    }
}

#[async_trait]
impl QueryInterpreter for DelegatingInterpreter {
    async fn interpret(&self, query: &str) -> FilterSet {
        if query.trim().is_empty() {
            return FilterSet::default();
        }

        match self.try_delegate(query).await {
            Ok(filters) => {
                info!("Delegate produced filters: {:?}", filters);
                filters
            }
            Err(e) => {
                warn!("Interpretation degraded, using heuristic: {}", e);
                self.fallback.extract(query)
            }
        }
    }

    fn name(&self) -> &'static str {
        "delegate"
    }
}

/// Pulls the outermost `{...}` block out of a model reply.
///
/// Replies written with single quotes are retried with double quotes.
pub fn extract_json_object(reply: &str) -> Result<Map<String, Value>, DelegateError> {
    let block = outer_braces(reply)
        .ok_or_else(|| DelegateError::Malformed(reply.trim().to_string()))?;

    let parsed = serde_json::from_str::<Value>(block)
        .or_else(|_| serde_json::from_str::<Value>(&block.replace('\'', "\"")))
        .map_err(|_| DelegateError::Malformed(reply.trim().to_string()))?;

    match parsed {
        Value::Object(map) => Ok(map),
        _ => Err(DelegateError::Malformed(reply.trim().to_string())),
    }
}

fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Keeps only values that belong to the closed vocabularies.
///
/// Locations must resolve through the gazetteer, exactly as the heuristic path requires.
pub fn validate_reply(object: &Map<String, Value>) -> FilterSet {
    let filters = FilterSet {
        location: object
            .get("location")
            .and_then(Value::as_str)
            .and_then(normalize_location)
            .map(str::to_string),
        target_level: wire_field::<TargetLevel>(object, "target_level"),
        degree: wire_field::<Degree>(object, "degree"),
        employment_type: wire_field::<EmploymentType>(object, "employment_type"),
        remote: object
            .get("remote")
            .or_else(|| object.get("has_remote"))
            .and_then(bool_field),
    };

    for key in object.keys() {
        if !matches!(
            key.as_str(),
            "location" | "target_level" | "degree" | "employment_type" | "remote" | "has_remote"
        ) {
            debug!("Ignoring unknown delegate key: {}", key);
        }
    }

    filters
}

fn wire_field<T: WireValue>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let raw = object.get(key)?.as_str()?;
    let value = T::from_wire(raw);
    if value.is_none() {
        debug!("Discarding out-of-vocabulary {}: {}", key, raw);
    }
    value
}

fn bool_field(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
