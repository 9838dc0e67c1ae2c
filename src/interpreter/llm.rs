// src/interpreter/llm.rs
use crate::error::DelegateError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = "You extract job-search filters into JSON.";

const EXTRACTION_PROMPT: &str = r#"You are a helpful assistant that extracts structured job search filters from a user's natural language query.
Return a JSON object with keys optionally present:
- location: a city or country name
- target_level: one of INTERN_AND_APPRENTICE, EARLY, MID, ADVANCED
- degree: one of PURSUING_DEGREE, COMPLETED_DEGREE
- employment_type: one of FULL_TIME, PART_TIME, INTERN
- remote: true or false
Only include keys that are clearly present.

Example:
Input: "Internships in Bangalore for pursuing degree"
Output: {"location": "Bangalore, India", "target_level": "INTERN_AND_APPRENTICE", "degree": "PURSUING_DEGREE"}

Input: {user_query}
Output:
"#;

/// Anything that can turn a raw query into a raw JSON-ish reply.
#[async_trait]
pub trait FilterExtractor: Send + Sync {
    async fn extract(&self, query: &str) -> Result<String, DelegateError>;
}

/// OpenAI-compatible chat-completions client.
pub struct LlmExtractor {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl LlmExtractor {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, DelegateError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (proxies, compatible servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn build_prompt(query: &str) -> String {
        // serde_json quoting keeps the query from breaking out of the example block
        let quoted = serde_json::to_string(query).unwrap_or_else(|_| format!("\"{}\"", query));
        EXTRACTION_PROMPT.replace("{user_query}", &quoted)
    }
}

#[async_trait]
impl FilterExtractor for LlmExtractor {
    async fn extract(&self, query: &str) -> Result<String, DelegateError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(query),
                },
            ],
            temperature: 0.0,
            max_tokens: 300,
        };

        info!("Sending filter extraction request with model {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Filter extraction API error {}: {}", status, body);
            return Err(DelegateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DelegateError::Malformed("reply had no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_quoted_query() {
        let prompt = LlmExtractor::build_prompt("jobs in \"London\"");
        assert!(prompt.contains(r#"Input: "jobs in \"London\"""#));
        assert!(!prompt.contains("{user_query}"));
    }

    #[tokio::test]
    async fn test_extract_returns_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "choices": [
                    {"message": {"role": "assistant", "content": "{\"location\": \"London\"}"}}
                ]
            }"#,
            )
            .create_async()
            .await;

        let extractor = LlmExtractor::new("sk-test", Duration::from_secs(5))
            .unwrap()
            .with_api_base(server.url());
        let reply = extractor.extract("jobs in London").await.unwrap();

        assert_eq!(reply, r#"{"location": "London"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_extract_surfaces_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let extractor = LlmExtractor::new("sk-bad", Duration::from_secs(5))
            .unwrap()
            .with_api_base(server.url());

        match extractor.extract("anything").await {
            Err(DelegateError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_with_no_choices_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let extractor = LlmExtractor::new("sk-test", Duration::from_secs(5))
            .unwrap()
            .with_api_base(server.url());

        assert!(matches!(
            extractor.extract("anything").await,
            Err(DelegateError::Malformed(_))
        ));
    }
}
