//! Core engine: chooses the completion or heuristic path and assembles the
//! final assessment.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::completion::{CompletionClient, CompletionRequest, OpenAiClient};
use crate::config::{CompletionOptions, Config};
use crate::error::ConfigError;
use crate::normalize;
use crate::prompt;
use crate::score;
use crate::types::*;
use crate::validate;

/// The risk analysis engine. Stateless across calls; the optional client is
/// fixed at construction.
#[derive(Clone)]
pub struct Engine {
  client: Option<Arc<dyn CompletionClient>>,
  options: CompletionOptions,
}

impl Engine {
  pub fn new(client: Option<Arc<dyn CompletionClient>>, options: CompletionOptions) -> Self {
    match &client {
      Some(c) => info!(client = c.name(), model = %options.model, "Completion client configured"),
      None => warn!("No completion client configured, using heuristic analysis"),
    }
    Self { client, options }
  }

  /// Heuristic scoring only; the collaborator is never called.
  pub fn heuristic_only() -> Self {
    Self::new(None, CompletionOptions::default())
  }

  pub fn with_client(client: Arc<dyn CompletionClient>, options: CompletionOptions) -> Self {
    Self::new(Some(client), options)
  }

  /// Build from config: an OpenAI client when an API key is present.
  pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
    let client = OpenAiClient::from_config(config)?
      .map(|c| Arc::new(c) as Arc<dyn CompletionClient>);
    Ok(Self::new(client, config.options.clone()))
  }

  pub fn is_ai_enabled(&self) -> bool {
    self.client.is_some()
  }

  /// Analyze one test run. Never fails; worst case is the heuristic assessment.
  pub async fn analyze(&self, telemetry: &TestExecutionTelemetry) -> AssessmentRecord {
    self.analyze_detailed(telemetry).await.record
  }

  /// Like [`Engine::analyze`], also reporting which path produced the record.
  pub async fn analyze_detailed(&self, telemetry: &TestExecutionTelemetry) -> Analysis {
    let summary = normalize::summarize(telemetry);
    debug!(?summary, "Normalized telemetry");

    let client = match &self.client {
      Some(c) => c,
      None => return fallback(&summary, FallbackReason::Unconfigured),
    };

    let prompt_text = prompt::build_prompt(&summary, telemetry);
    let request = CompletionRequest {
      system: prompt::SYSTEM_PROMPT,
      prompt: &prompt_text,
      options: &self.options,
    };

    // Single attempt; no retries.
    let text = match client.complete(&request).await {
      Ok(text) => text,
      Err(e) => {
        warn!(
          reason = FallbackReason::CollaboratorFailed.as_str(),
          client = client.name(),
          error = %e,
          "Completion failed, falling back to heuristic analysis"
        );
        return fallback(&summary, FallbackReason::CollaboratorFailed);
      }
    };

    match validate::parse_completion(&text, &summary) {
      Ok(record) => {
        debug!(risk_level = record.risk_level.as_str(), score = record.score, "Completion accepted");
        Analysis {
          record,
          path: AnalysisPath::Completion,
        }
      }
      Err(e) => {
        warn!(
          reason = FallbackReason::UnusableOutput.as_str(),
          client = client.name(),
          error = %e,
          completion_chars = text.len(),
          "Unusable completion, falling back to heuristic analysis"
        );
        fallback(&summary, FallbackReason::UnusableOutput)
      }
    }
  }
}

fn fallback(summary: &TelemetrySummary, reason: FallbackReason) -> Analysis {
  Analysis {
    record: score::assess(summary),
    path: AnalysisPath::Fallback(reason),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::completion::CompletionClient;
  use crate::error::CompletionError;
  use crate::normalize::fixtures::telemetry;
  use async_trait::async_trait;
  use std::sync::Mutex;

  /// Replies with a canned result and records every prompt it receives.
  struct Scripted {
    reply: Result<String, ()>,
    prompts: Mutex<Vec<String>>,
  }

  impl Scripted {
    fn new(reply: Result<&str, ()>) -> Arc<Self> {
      Arc::new(Self {
        reply: reply.map(str::to_string),
        prompts: Mutex::new(Vec::new()),
      })
    }

    fn calls(&self) -> usize {
      self.prompts.lock().unwrap().len()
    }
  }

  #[async_trait]
  impl CompletionClient for Scripted {
    fn name(&self) -> &'static str {
      "scripted"
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, CompletionError> {
      self.prompts.lock().unwrap().push(request.prompt.to_string());
      self.reply.clone().map_err(|_| CompletionError::Timeout)
    }
  }

  fn engine(client: &Arc<Scripted>) -> Engine {
    Engine::with_client(client.clone(), CompletionOptions::default())
  }

  #[tokio::test]
  async fn unconfigured_engine_uses_heuristic() {
    let t = telemetry(10, 5, 20, 20, 0);
    let out = Engine::heuristic_only().analyze_detailed(&t).await;
    assert_eq!(out.path, AnalysisPath::Fallback(FallbackReason::Unconfigured));
    assert_eq!(out.record, score::heuristic_assessment(&t));
  }

  #[tokio::test]
  async fn valid_completion_is_used() {
    let client = Scripted::new(Ok(
      r#"{"riskLevel":"critical","score":30,"recommendations":["x","y","z"],"summary":"Bad."}"#,
    ));
    let out = engine(&client).analyze_detailed(&telemetry(10, 5, 20, 20, 0)).await;
    assert_eq!(out.path, AnalysisPath::Completion);
    assert_eq!(out.record.risk_level, RiskLevel::Critical);
    assert_eq!(out.record.score, 30);
    assert_eq!(client.calls(), 1);
  }

  #[tokio::test]
  async fn collaborator_failure_falls_back() {
    let client = Scripted::new(Err(()));
    let t = telemetry(4, 4, 10, 8, 3);
    let out = engine(&client).analyze_detailed(&t).await;
    assert_eq!(out.path, AnalysisPath::Fallback(FallbackReason::CollaboratorFailed));
    assert_eq!(out.record, score::heuristic_assessment(&t));
    assert_eq!(client.calls(), 1);
  }

  #[tokio::test]
  async fn prose_completion_falls_back() {
    let client = Scripted::new(Ok("I think this looks fine."));
    let t = telemetry(10, 5, 20, 20, 0);
    let out = engine(&client).analyze_detailed(&t).await;
    assert_eq!(out.path, AnalysisPath::Fallback(FallbackReason::UnusableOutput));
    assert_eq!(out.record, score::heuristic_assessment(&t));
  }

  #[tokio::test]
  async fn prompt_carries_counts() {
    let client = Scripted::new(Ok("{}"));
    engine(&client).analyze(&telemetry(6, 2, 3, 3, 1)).await;
    let prompts = client.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("- Total pages tested: 6"));
    assert!(prompts[0].contains("- Pages passed: 2"));
  }

  #[test]
  fn from_default_config_has_no_client() {
    let engine = Engine::from_config(&Config::default()).unwrap();
    assert!(!engine.is_ai_enabled());
  }
}
