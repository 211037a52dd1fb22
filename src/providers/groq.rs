//! Groq provider implementation for Jarvis
//!
//! Talks to Groq's OpenAI-compatible chat completions endpoint. The
//! credential is supplied per call so the invoker can rotate through a pool
//! of API keys while sharing one HTTP client.

use crate::config::LlmConfig;
use crate::credentials::Credential;
use crate::error::{JarvisError, Result};
use crate::providers::{ChatMessage, ChatProvider, Prompt};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Groq chat completions provider
///
/// # Examples
///
/// ```
/// use jarvis::config::LlmConfig;
/// use jarvis::providers::GroqProvider;
///
/// let provider = GroqProvider::new(&LlmConfig::default());
/// assert!(provider.is_ok());
/// ```
pub struct GroqProvider {
    client: Client,
    api_base: String,
    model: String,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Response body from `/chat/completions`
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqProvider {
    /// Create a new Groq provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("jarvis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JarvisError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Groq provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Configured model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Map a non-success response to a classified error
fn classify_failure(status: StatusCode, body: &str) -> JarvisError {
    let lowered = body.to_lowercase();
    if status == StatusCode::TOO_MANY_REQUESTS
        || lowered.contains("rate limit")
        || lowered.contains("rate_limit")
        || lowered.contains("tokens per day")
    {
        JarvisError::RateLimited(format!("Groq returned {}: {}", status, body))
    } else {
        JarvisError::Provider(format!("Groq returned error {}: {}", status, body))
    }
}

#[async_trait]
impl ChatProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, credential: &Credential, prompt: &Prompt) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let request = CompletionRequest {
            model: &self.model,
            messages: prompt.to_messages(),
            stream: false,
        };

        tracing::debug!(
            "Sending Groq request: {} messages, key={}",
            request.messages.len(),
            credential.masked()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Groq request failed: {}", e);
                JarvisError::Provider(format!("Groq request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Groq returned error {}: {}", status, error_text);
            return Err(classify_failure(status, &error_text).into());
        }

        let body: CompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Groq response: {}", e);
            JarvisError::Provider(format!("Failed to parse Groq response: {}", e))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                JarvisError::Provider("Groq response contained no message content".to_string())
                    .into()
            })
    }
}
