//! Ecommerce test-run risk analysis engine.
//!
//! Turns one test run's telemetry into an [`AssessmentRecord`]: risk level,
//! score (0-100), recommendations and a short summary. An optional completion
//! collaborator may produce the assessment; any failure on that path degrades
//! to the deterministic heuristic scorer, so analysis itself never fails.

pub mod completion;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod prompt;
pub mod score;
pub mod types;
pub mod validate;

pub use completion::{CompletionClient, CompletionRequest, OpenAiClient};
pub use config::{CompletionOptions, Config};
pub use engine::Engine;
pub use error::{CompletionError, ConfigError, ValidationError};
pub use types::{
  Analysis, AnalysisPath, AssessmentRecord, FallbackReason, RiskLevel, TelemetrySummary,
  TestExecutionTelemetry,
};
