//! External text-completion collaborator: the trait the engine consumes, plus
//! an OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::{CompletionOptions, Config};
use crate::error::{CompletionError, ConfigError};

const USER_AGENT: &str = concat!("analysis-engine/", env!("CARGO_PKG_VERSION"));

/// One completion request: system framing, user prompt, generation options.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
  pub system: &'a str,
  pub prompt: &'a str,
  pub options: &'a CompletionOptions,
}

/// A text-completion capability. Any `Err` is treated the same by the engine.
#[async_trait]
pub trait CompletionClient: Send + Sync {
  /// Identifier for logs (e.g. "openai").
  fn name(&self) -> &'static str;

  async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, CompletionError>;
}

// ---------------------------------------------------------------------------
// Chat-completions wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: [ChatMessage<'a>; 2],
  max_tokens: u32,
  temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'static str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
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
  content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
  http_client: reqwest::Client,
  endpoint: String,
  api_key: String,
}

impl OpenAiClient {
  pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
    let http_client = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(timeout)
      .build()
      .map_err(|e| ConfigError::Client(e.to_string()))?;

    Ok(Self {
      http_client,
      endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
      api_key,
    })
  }

  /// Build from config; `None` when no API key is configured.
  pub fn from_config(config: &Config) -> Result<Option<Self>, ConfigError> {
    match &config.api_key {
      Some(key) => Self::new(
        key.clone(),
        &config.base_url,
        Duration::from_secs(config.timeout_secs),
      )
      .map(Some),
      None => Ok(None),
    }
  }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
  fn name(&self) -> &'static str {
    "openai"
  }

  async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, CompletionError> {
    let body = ChatRequest {
      model: &request.options.model,
      messages: [
        ChatMessage {
          role: "system",
          content: request.system,
        },
        ChatMessage {
          role: "user",
          content: request.prompt,
        },
      ],
      max_tokens: request.options.max_output_tokens,
      temperature: request.options.temperature,
    };

    tracing::debug!(
      model = %request.options.model,
      prompt_chars = request.prompt.len(),
      "Requesting completion"
    );

    let response = self
      .http_client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let error_text = response.text().await.unwrap_or_default();
      return Err(status_error(status, error_text));
    }

    let chat: ChatResponse = response.json().await?;
    extract_content(chat)
  }
}

/// Map a non-2xx response status to a collaborator error.
fn status_error(status: StatusCode, body: String) -> CompletionError {
  match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CompletionError::Auth,
    StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited,
    _ => CompletionError::Api(status.as_u16(), body),
  }
}

fn extract_content(chat: ChatResponse) -> Result<String, CompletionError> {
  chat
    .choices
    .into_iter()
    .next()
    .and_then(|c| c.message.content)
    .map(|s| s.trim().to_string())
    .ok_or_else(|| CompletionError::MalformedResponse("no choices[0].message.content".into()))
}
