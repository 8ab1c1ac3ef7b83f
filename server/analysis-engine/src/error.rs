//! Structured error types for the analysis engine.
//!
//! None of these escape `Engine::analyze`; they exist for logs and for the
//! binary's startup path.

use thiserror::Error;

/// Failure of the external completion collaborator.
#[derive(Debug, Error)]
pub enum CompletionError {
  #[error("transport: {0}")]
  Transport(String),

  #[error("timed out")]
  Timeout,

  #[error("authentication rejected")]
  Auth,

  #[error("rate limited")]
  RateLimited,

  #[error("api error {0}: {1}")]
  Api(u16, String),

  #[error("malformed response: {0}")]
  MalformedResponse(String),
}

impl From<reqwest::Error> for CompletionError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      Self::Timeout
    } else if e.is_decode() {
      Self::MalformedResponse(e.to_string())
    } else {
      Self::Transport(e.to_string())
    }
  }
}

/// Completion text that cannot be turned into an assessment.
#[derive(Debug, Error)]
pub enum ValidationError {
  #[error("no JSON object found in completion")]
  NoJsonObject,

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("schema: {field}: {reason}")]
  Schema { field: String, reason: String },
}

impl ValidationError {
  pub fn schema(field: &str, reason: &str) -> Self {
    Self::Schema {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }
}

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config: {key}: {reason}")]
  Invalid { key: String, reason: String },

  #[error("env file {path}: {reason}")]
  EnvFile { path: String, reason: String },

  #[error("http client: {0}")]
  Client(String),
}

impl ConfigError {
  pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
    Self::Invalid {
      key: key.to_string(),
      reason: reason.into(),
    }
  }
}
