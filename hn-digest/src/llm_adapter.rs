use crate::rate_limit::RetryableError;
use crate::traits::TextGenerator;
use crate::types::{GenerationConfig, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Failures of a text generation call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl RetryableError for GenerationError {
    fn is_transient(&self) -> bool {
        matches!(self, GenerationError::RateLimited { .. })
    }
}

/// Anthropic Messages API client.
pub struct AnthropicGenerator {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    api_base: String,
}

impl AnthropicGenerator {
    pub fn new(api_key: impl Into<String>, config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request<'a>(&'a self, system: &'a str, user: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Text segments of a reply, skipping non-text blocks.
fn text_segments(response: MessagesResponse) -> Vec<String> {
    response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect()
}

fn classify_failure(status: StatusCode, body: String) -> GenerationError {
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    if status == StatusCode::TOO_MANY_REQUESTS {
        GenerationError::RateLimited { message }
    } else {
        GenerationError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    fn adapter_name(&self) -> String {
        format!("anthropic ({})", self.model)
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
    ) -> std::result::Result<Vec<String>, GenerationError> {
        debug!("Sending {} chars to {}", user.len(), self.model);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&self.request(system, user))
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, body));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Json(e.to_string()))?;

        Ok(text_segments(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_transient() {
        let body = r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#;
        let error = classify_failure(StatusCode::TOO_MANY_REQUESTS, body.to_string());
        assert_eq!(
            error,
            GenerationError::RateLimited {
                message: "slow down".to_string()
            }
        );
        assert!(error.is_transient());
    }

    #[test]
    fn other_failures_are_fatal() {
        let error = classify_failure(StatusCode::UNAUTHORIZED, "bad key".to_string());
        assert_eq!(
            error,
            GenerationError::Api {
                status: 401,
                message: "bad key".to_string()
            }
        );
        assert!(!error.is_transient());
        assert!(!GenerationError::Http("reset".into()).is_transient());
    }

    #[test]
    fn keeps_text_segments_in_order() {
        let response: MessagesResponse = serde_json::from_str(
            r###"{"content":[
                {"type":"text","text":"## One"},
                {"type":"tool_use","id":"x","name":"n","input":{}},
                {"type":"text","text":"\n## Two"}
            ]}"###,
        )
        .unwrap();
        assert_eq!(text_segments(response), vec!["## One", "\n## Two"]);
    }

    #[test]
    fn request_carries_system_and_user() {
        let generator = AnthropicGenerator::new("key", &GenerationConfig::default()).unwrap();
        let json = serde_json::to_value(generator.request("be terse", "hello")).unwrap();
        assert_eq!(json["system"], "be terse");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(generator.adapter_name(), "anthropic (claude-3-7-sonnet-20250219)");
    }
}
