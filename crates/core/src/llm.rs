//! Model clients used by the insight service.

use crate::config::InsightSettings;
use crate::constants::{INSIGHT_MAX_TOKENS, INSIGHT_TEMPERATURE, MESSAGES_API_VERSION};
use crate::error::{InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A text-generation backend.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Identifier reported back to callers as `model_used`.
    fn model(&self) -> &str;

    /// Generate a completion for a single user prompt.
    async fn generate(&self, prompt: &str) -> InsightResult<String>;
}

/// HTTP client for a Messages-API compatible endpoint.
pub struct MessagesApiClient {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl MessagesApiClient {
    /// Builds a client from the configured settings.
    ///
    /// # Errors
    /// - `InsightError::NotConfigured` if no endpoint URL is set.
    /// - `InsightError::ClientBuild` if the HTTP client cannot be constructed.
    pub fn from_settings(settings: &InsightSettings) -> InsightResult<Self> {
        let endpoint = settings
            .api_url
            .clone()
            .ok_or(InsightError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(InsightError::ClientBuild)?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            timeout_secs: settings.timeout_secs,
            client,
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Option<MessageContent>,
}

/// Model output arrives either as one string or as a list of typed parts.
#[derive(Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

impl MessageContent {
    fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Parts(parts) => parts.into_iter().filter_map(|p| p.text).collect(),
        }
    }
}

/// Extracts the generated text from a raw Messages-API response body.
pub(crate) fn parse_messages_response(body: &str) -> InsightResult<String> {
    let parsed: MessagesResponse =
        serde_json::from_str(body).map_err(|e| InsightError::ResponseParsing(e.to_string()))?;
    Ok(parsed.content.map(MessageContent::into_text).unwrap_or_default())
}

#[async_trait::async_trait]
impl LlmClient for MessagesApiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> InsightResult<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: INSIGHT_MAX_TOKENS,
            temperature: INSIGHT_TEMPERATURE,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("anthropic-version", MESSAGES_API_VERSION)
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                InsightError::Connection(self.endpoint.clone())
            } else if e.is_timeout() {
                InsightError::Timeout(self.timeout_secs)
            } else {
                InsightError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InsightError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(InsightError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_messages_response(&text)
    }
}
