//! Cerebras chat client
//!
//! OpenAI-compatible chat completions used for the "talk to your plant"
//! conversation.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Client for the chat completion API
#[derive(Clone)]
pub struct CerebrasClient {
    api_endpoint: String,
    api_key: String,
    model: String,
    http_client: Client,
}

/// One message of a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

impl CerebrasClient {
    /// Create a new chat client
    pub fn new(api_endpoint: String, api_key: String, model: String, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            api_key,
            model,
            http_client,
        }
    }

    /// Run one completion over the given conversation and return the reply text
    pub async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String> {
        if self.api_key.is_empty() {
            return Err(AppError::Configuration(
                "Chat model API key not configured".to_string(),
            ));
        }

        let url = format!("{}/chat/completions", self.api_endpoint);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.7,
            max_tokens: 500,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::ChatModel))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ChatModel(format!(
                "Chat API returned {}: {}",
                status, body
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ChatModel(format!("Failed to parse response: {}", e)))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|reply| !reply.is_empty())
            .ok_or_else(|| AppError::ChatModel("Empty reply from chat model".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let messages = vec![ChatMessage::system("be a plant"), ChatMessage::user("hello")];
        let request = ChatCompletionRequest {
            model: "llama3.1-8b",
            messages: &messages,
            temperature: 0.7,
            max_tokens: 500,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_response_parsing() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":" I need water! "}}]}"#,
        )
        .unwrap();
        assert_eq!(response.choices[0].message.content.trim(), "I need water!");
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let client = CerebrasClient::new(
            "http://localhost".to_string(),
            String::new(),
            "m".to_string(),
            Duration::from_secs(1),
        );
        let result = client.complete(&[ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
