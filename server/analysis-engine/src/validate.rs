//! Turn collaborator text into an assessment, or report why it cannot be used.
//!
//! Extraction slices from the first `{` to the last `}`. Prose containing its
//! own braces around the object breaks this; the caller falls back in that case.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::types::*;

pub const DEFAULT_SUMMARY: &str = "Analysis completed";
pub const DEFAULT_SCORE: u8 = 75;

/// Candidate JSON object span: first `{` through last `}`.
pub fn extract_json_span(text: &str) -> Option<&str> {
  let start = text.find('{')?;
  let end = text.rfind('}')?;
  if end < start {
    return None;
  }
  Some(&text[start..=end])
}

/// Parse and validate completion text. Missing fields get independent defaults;
/// present fields of the wrong shape reject the whole completion.
pub fn parse_completion(
  text: &str,
  summary: &TelemetrySummary,
) -> Result<AssessmentRecord, ValidationError> {
  let span = extract_json_span(text).ok_or(ValidationError::NoJsonObject)?;
  let value: Value = serde_json::from_str(span)?;
  let obj = value
    .as_object()
    .ok_or_else(|| ValidationError::schema("$", "expected a JSON object"))?;

  let summary_text = match field(obj, "summary") {
    None => None,
    Some(Value::String(s)) if s.trim().is_empty() => None,
    Some(Value::String(s)) => Some(s.clone()),
    Some(_) => return Err(ValidationError::schema("summary", "expected a string")),
  };

  let recommendations = match field(obj, "recommendations") {
    None => Vec::new(),
    Some(Value::Array(items)) => items
      .iter()
      .map(|item| {
        item
          .as_str()
          .map(str::to_string)
          .ok_or_else(|| ValidationError::schema("recommendations", "expected strings"))
      })
      .collect::<Result<Vec<_>, _>>()?,
    Some(_) => {
      return Err(ValidationError::schema(
        "recommendations",
        "expected an array",
      ))
    }
  };

  let risk_level = match field(obj, "riskLevel") {
    None => None,
    Some(Value::String(s)) if s.trim().is_empty() => None,
    Some(Value::String(s)) => Some(
      RiskLevel::from_str_loose(s)
        .ok_or_else(|| ValidationError::schema("riskLevel", "expected low|medium|high|critical"))?,
    ),
    Some(_) => return Err(ValidationError::schema("riskLevel", "expected a string")),
  };

  let score = match field(obj, "score") {
    None => None,
    Some(v) => Some(parse_score(v)?),
  };

  Ok(AssessmentRecord {
    risk_level: risk_level.unwrap_or_else(|| failure_rate_risk_level(summary)),
    score: score.unwrap_or(DEFAULT_SCORE),
    recommendations,
    summary: summary_text.unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
  })
}

/// Present, non-null field.
fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
  obj.get(key).filter(|v| !v.is_null())
}

/// Whole or fractional number in 0..=100, rounded to an integer.
fn parse_score(v: &Value) -> Result<u8, ValidationError> {
  let n = v
    .as_f64()
    .ok_or_else(|| ValidationError::schema("score", "expected a number"))?;
  let n = n.round();
  if !(0.0..=100.0).contains(&n) {
    return Err(ValidationError::schema("score", "out of range 0..=100"));
  }
  Ok(n as u8)
}

/// Tier from the product-page failure rate. Used only to fill a missing
/// `riskLevel` in an otherwise valid completion.
///
/// Thresholds are compared in integers (`failed / total > n / 10`), so exactly
/// 10%, 30% and 50% fall into the lower tier. No pages means no failures.
pub fn failure_rate_risk_level(summary: &TelemetrySummary) -> RiskLevel {
  let total = summary.product_pages_total;
  let failed = total.saturating_sub(summary.product_pages_passed);
  let exceeds = |tenths: usize| failed * 10 > total * tenths;
  if exceeds(5) {
    RiskLevel::Critical
  } else if exceeds(3) {
    RiskLevel::High
  } else if exceeds(1) {
    RiskLevel::Medium
  } else {
    RiskLevel::Low
  }
}
