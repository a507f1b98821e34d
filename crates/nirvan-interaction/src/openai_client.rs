//! OpenAiCompletionClient - Direct REST client for OpenAI-style chat completions.
//!
//! Configuration priority for the API key: ~/.config/nirvan/secret.json > environment variables

use async_trait::async_trait;
use nirvan_core::chat::ChatMessage;
use nirvan_core::config::{CompletionConfig, DEFAULT_COMPLETION_BASE_URL, DEFAULT_COMPLETION_MODEL};
use nirvan_core::{NirvanError, Result};
use nirvan_infrastructure::storage::SecretStorage;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_MAX_TOKENS: u32 = 300;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Reply used when the endpoint answers successfully but without text.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm having trouble responding right now.";

/// One completion call: a system turn followed by the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub turns: Vec<ChatMessage>,
    /// Overrides the client's default when set.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(system_instruction: impl Into<String>, turns: Vec<ChatMessage>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            turns,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Anything that can turn a [`CompletionRequest`] into reply text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Client implementation that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl std::fmt::Debug for OpenAiCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompletionClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompletionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Builds a client from the completion section of the app config.
    ///
    /// Priority for the key:
    /// 1. ~/.config/nirvan/secret.json
    /// 2. Environment variables (OPENAI_API_KEY, OPENAI_MODEL_NAME)
    ///
    /// A model named next to the key wins over the configured one.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        match SecretStorage::new() {
            Ok(storage) => Self::from_config_with_secrets(config, &storage),
            Err(e) => {
                tracing::debug!("Secret storage unavailable: {}", e);
                Self::from_config_with_env(config)
            }
        }
    }

    pub fn from_config_with_secrets(
        config: &CompletionConfig,
        storage: &SecretStorage,
    ) -> Result<Self> {
        match storage.load() {
            Ok(secrets) => {
                if let Some(openai) = secrets.openai {
                    let model = openai.model_name.unwrap_or_else(|| config.model.clone());
                    return Ok(Self::new(openai.api_key)
                        .apply_config(config)
                        .with_model(model));
                }
                tracing::debug!("{} has no openai section", storage.path().display());
            }
            Err(e) => tracing::debug!("No usable secret file: {}", e),
        }
        Self::from_config_with_env(config)
    }

    fn from_config_with_env(config: &CompletionConfig) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            NirvanError::config(
                "OPENAI_API_KEY not found in ~/.config/nirvan/secret.json or environment variables",
            )
        })?;
        let model = env::var("OPENAI_MODEL_NAME").unwrap_or_else(|_| config.model.clone());
        Ok(Self::new(api_key).apply_config(config).with_model(model))
    }

    fn apply_config(self, config: &CompletionConfig) -> Self {
        self.with_base_url(config.base_url.clone())
            .with_model(config.model.clone())
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature)
    }

    /// Points the client at another OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the default maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_body(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: request.system_instruction.clone(),
        });
        messages.extend(request.turns.iter().map(|turn| WireMessage {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }));

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: self.temperature,
        }
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                NirvanError::network(None, format!("OpenAI API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| NirvanError::malformed(format!("Failed to parse OpenAI response: {err}")))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_body(request);
        tracing::debug!(
            "Requesting completion from {} ({} messages, max_tokens={})",
            self.model,
            body.messages.len(),
            body.max_tokens
        );
        self.send_request(&body).await.inspect_err(|e| {
            tracing::warn!("Completion request failed: {}", e);
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| NirvanError::malformed("OpenAI API returned no choices"))?;

    Ok(choice
        .message
        .content
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string()))
}

fn map_http_error(status: StatusCode, body: &str) -> NirvanError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .unwrap_or_else(|| "Unknown error".to_string());

    NirvanError::network(Some(status.as_u16()), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nirvan_core::chat::ChatMessage;

    #[test]
    fn test_body_starts_with_system_turn() {
        let client = OpenAiCompletionClient::new("sk-test");
        let request = CompletionRequest::new(
            "You are terse.",
            vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
        );

        let body = serde_json::to_value(client.build_body(&request)).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are terse.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][2]["role"], "assistant");
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_request_max_tokens_overrides_default() {
        let client = OpenAiCompletionClient::new("sk-test").with_max_tokens(120);
        let plain = client.build_body(&CompletionRequest::new("s", vec![]));
        let drafted = client.build_body(&CompletionRequest::new("s", vec![]).with_max_tokens(350));
        assert_eq!(plain.max_tokens, 120);
        assert_eq!(drafted.max_tokens, 350);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAiCompletionClient::new("k").with_base_url("http://localhost:9000/v1/");
        assert_eq!(client.endpoint(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn test_map_http_error_prefers_server_message() {
        let err = map_http_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#,
        );
        assert_eq!(
            err,
            NirvanError::network(Some(401), "Incorrect API key provided")
        );

        let err = map_http_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err, NirvanError::network(Some(502), "Unknown error"));
    }

    #[test]
    fn test_extract_text_response() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"Breathe."}}]}"#).unwrap();
        assert_eq!(extract_text_response(parsed).unwrap(), "Breathe.");

        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(extract_text_response(parsed).unwrap(), EMPTY_REPLY_FALLBACK);

        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_text_response(parsed),
            Err(NirvanError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_secret_file_model_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(
            &path,
            r#"{"openai":{"api_key":"sk-file","model_name":"gpt-4o-mini"}}"#,
        )
        .unwrap();

        let client = OpenAiCompletionClient::from_config_with_secrets(
            &CompletionConfig::default(),
            &SecretStorage::with_path(path),
        )
        .unwrap();
        assert_eq!(client.model(), "gpt-4o-mini");
        assert_eq!(client.api_key, "sk-file");
    }
}
