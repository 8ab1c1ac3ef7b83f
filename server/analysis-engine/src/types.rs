//! Core types for the analysis engine (JSON contracts + internal models).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the test runner sends)
// ---------------------------------------------------------------------------

/// Telemetry of one completed test run. Unknown fields are silently ignored.
///
/// The top-level sequences have no serde default: a payload without them is an
/// upstream contract breach and is rejected at deserialization.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestExecutionTelemetry {
  pub product_page_tests: Vec<PageTest>,
  pub image_validation: Vec<ImageCheck>,
  pub error_detection: ErrorDetection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTest {
  #[serde(default)]
  pub url: String,
  pub passed: bool,
  pub elements: PageElements,
  #[serde(default)]
  pub performance: PagePerformance,
  #[serde(default)]
  pub errors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElements {
  pub title: ElementCheck,
  pub price: ElementCheck,
  pub add_to_cart: ElementCheck,
  pub description: ElementCheck,
  pub variants: ElementCheck,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ElementCheck {
  pub present: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub clickable: Option<bool>,
}

/// Page timings in milliseconds.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PagePerformance {
  pub load_time: f64,
  pub time_to_interactive: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCheck {
  pub loaded: bool,
  /// HTTP status as reported by the test runner; may be negative or absent for
  /// loads that never reached the server.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alt_text: Option<String>,
  #[serde(default)]
  pub dimensions: ImageDimensions,
  #[serde(default)]
  pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageDimensions {
  pub width: u32,
  pub height: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetection {
  pub js_errors: Vec<JsError>,
  pub network_errors: Vec<NetworkError>,
  pub console_warnings: Vec<ConsoleWarning>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsError {
  pub message: String,
  #[serde(default)]
  pub source: String,
  #[serde(default)]
  pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkError {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<i64>,
  #[serde(default)]
  pub url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default)]
  pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleWarning {
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Normalized summary
// ---------------------------------------------------------------------------

/// Fixed-shape counts derived from one telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySummary {
  pub product_pages_total: usize,
  pub product_pages_passed: usize,
  pub images_total: usize,
  pub images_loaded: usize,
  pub js_errors_count: usize,
  pub network_errors_count: usize,
  pub warnings_count: usize,
}

impl TelemetrySummary {
  pub fn images_failed(&self) -> usize {
    self.images_total.saturating_sub(self.images_loaded)
  }
}

// ---------------------------------------------------------------------------
// Risk level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
  Low,
  Medium,
  High,
  Critical,
}

impl RiskLevel {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "low" => Some(Self::Low),
      "medium" => Some(Self::Medium),
      "high" => Some(Self::High),
      "critical" => Some(Self::Critical),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "low",
      Self::Medium => "medium",
      Self::High => "high",
      Self::Critical => "critical",
    }
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// The assessment handed to persistence and dashboards. Always fully populated.
///
/// `recommendations` holds at most 3 entries on the heuristic path; the
/// completion path passes the collaborator's list through uncapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
  pub risk_level: RiskLevel,
  pub score: u8,
  pub recommendations: Vec<String>,
  pub summary: String,
}

/// Why the engine used the heuristic scorer instead of the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
  /// No completion client was configured at startup.
  Unconfigured,
  /// The collaborator call itself failed (transport, auth, rate limit, timeout).
  CollaboratorFailed,
  /// The collaborator answered, but the text was not a usable assessment.
  UnusableOutput,
}

impl FallbackReason {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Unconfigured => "unconfigured",
      Self::CollaboratorFailed => "collaborator_failed",
      Self::UnusableOutput => "unusable_output",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "path", content = "reason")]
pub enum AnalysisPath {
  Completion,
  Fallback(FallbackReason),
}

/// An assessment together with the route that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
  pub record: AssessmentRecord,
  pub path: AnalysisPath,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn risk_level_parses_loosely() {
    assert_eq!(RiskLevel::from_str_loose("Critical"), Some(RiskLevel::Critical));
    assert_eq!(RiskLevel::from_str_loose(" medium "), Some(RiskLevel::Medium));
    assert_eq!(RiskLevel::from_str_loose("severe"), None);
  }

  #[test]
  fn assessment_serializes_camel_case() {
    let record = AssessmentRecord {
      risk_level: RiskLevel::High,
      score: 42,
      recommendations: vec!["Resolve image loading issues".into()],
      summary: "ok".into(),
    };
    let json = serde_json::to_string(&record).unwrap();
    assert_eq!(
      json,
      r#"{"riskLevel":"high","score":42,"recommendations":["Resolve image loading issues"],"summary":"ok"}"#
    );
  }

  #[test]
  fn unread_leaves_are_tolerated() {
    let json = r#"{
      "productPageTests": [{
        "passed": false,
        "elements": {
          "title": {"present": true}, "price": {"present": false},
          "addToCart": {"present": true}, "description": {"present": true},
          "variants": {"present": false}
        }
      }],
      "imageValidation": [
        {"loaded": false, "status": -1, "dimensions": {"width": 0}},
        {"loaded": true}
      ],
      "errorDetection": {
        "jsErrors": [],
        "networkErrors": [{"status": -1, "url": "https://cdn.example.com/a.png", "error": "net::ERR_FAILED"}, {}],
        "consoleWarnings": [{}]
      }
    }"#;
    let t: TestExecutionTelemetry = serde_json::from_str(json).unwrap();
    assert_eq!(t.image_validation[0].status, Some(-1));
    assert_eq!(t.image_validation[1].status, None);
    assert_eq!(t.error_detection.network_errors[0].status, Some(-1));
    assert_eq!(t.error_detection.network_errors.len(), 2);
    assert_eq!(t.product_page_tests[0].performance.load_time, 0.0);
  }

  #[test]
  fn images_failed_saturates_on_inconsistent_counts() {
    let s = TelemetrySummary {
      images_total: 2,
      images_loaded: 5,
      ..Default::default()
    };
    assert_eq!(s.images_failed(), 0);
  }

  #[test]
  fn missing_top_level_array_is_rejected() {
    let json = r#"{"productPageTests": [], "errorDetection": {"jsErrors": [], "networkErrors": [], "consoleWarnings": []}}"#;
    let err = serde_json::from_str::<TestExecutionTelemetry>(json).unwrap_err();
    assert!(err.to_string().contains("imageValidation"));
  }
}
