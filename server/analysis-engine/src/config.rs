//! Engine configuration with sane defaults, resolved once at startup.

use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 600;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Generation options passed to the completion collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
  pub model: String,
  pub max_output_tokens: u32,
  pub temperature: f32,
}

impl Default for CompletionOptions {
  fn default() -> Self {
    Self {
      model: DEFAULT_MODEL.to_string(),
      max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
      temperature: DEFAULT_TEMPERATURE,
    }
  }
}

/// Engine configuration. `api_key == None` disables the AI path for the
/// lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
  pub api_key: Option<String>,
  pub base_url: String,
  /// Per-request timeout for the completion call, in seconds.
  pub timeout_secs: u64,
  pub options: CompletionOptions,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api_key: None,
      base_url: DEFAULT_BASE_URL.to_string(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
      options: CompletionOptions::default(),
    }
  }
}

impl Config {
  /// Resolve from process environment variables.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Resolve from the process environment, falling back to `KEY=value` pairs
  /// in `path`. Process variables win; a missing file is not an error.
  pub fn from_env_and_file(path: &Path) -> Result<Self, ConfigError> {
    let file = read_env_file(path)?;
    Self::from_layers(|key| std::env::var(key).ok(), &file)
  }

  fn from_layers<F>(primary: F, fallback: &HashMap<String, String>) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    Self::from_lookup(|key| primary(key).or_else(|| fallback.get(key).cloned()))
  }

  /// Resolve from an arbitrary key lookup. Blank values count as unset.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| {
      lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    };

    let mut config = Config {
      api_key: get("OPENAI_API_KEY"),
      ..Config::default()
    };

    if let Some(url) = get("OPENAI_BASE_URL") {
      config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(model) = get("ANALYSIS_MODEL") {
      config.options.model = model;
    }
    if let Some(raw) = get("ANALYSIS_MAX_TOKENS") {
      config.options.max_output_tokens = raw
        .parse()
        .map_err(|e| ConfigError::invalid("ANALYSIS_MAX_TOKENS", format!("{}", e)))?;
    }
    if let Some(raw) = get("ANALYSIS_TEMPERATURE") {
      let t: f32 = raw
        .parse()
        .map_err(|e| ConfigError::invalid("ANALYSIS_TEMPERATURE", format!("{}", e)))?;
      if !(0.0..=2.0).contains(&t) {
        return Err(ConfigError::invalid("ANALYSIS_TEMPERATURE", "must be within 0..=2"));
      }
      config.options.temperature = t;
    }
    if let Some(raw) = get("ANALYSIS_TIMEOUT_SECS") {
      config.timeout_secs = raw
        .parse()
        .map_err(|e| ConfigError::invalid("ANALYSIS_TIMEOUT_SECS", format!("{}", e)))?;
    }

    Ok(config)
  }

  pub fn ai_enabled(&self) -> bool {
    self.api_key.is_some()
  }
}

/// Read a dotenv-style file into a map without touching the process
/// environment. Missing file yields an empty map.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
  let env_file_error = |e: dotenvy::Error| ConfigError::EnvFile {
    path: path.display().to_string(),
    reason: e.to_string(),
  };
  let iter = match dotenvy::from_path_iter(path) {
    Ok(iter) => iter,
    Err(e) if e.not_found() => return Ok(HashMap::new()),
    Err(e) => return Err(env_file_error(e)),
  };
  iter
    .map(|item| item.map_err(env_file_error))
    .collect()
}
