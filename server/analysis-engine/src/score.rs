//! Heuristic risk scorer: the deterministic fallback. Never fails.

use crate::normalize;
use crate::types::*;

pub const MAX_RECOMMENDATIONS: usize = 3;

/// Score 0–100: mean of page pass rate and image success rate, rounded.
pub fn compute_score(summary: &TelemetrySummary) -> u8 {
  let pass = summary.page_pass_rate() * 100.0;
  let images = summary.image_success_rate() * 100.0;
  ((pass + images) / 2.0).round().clamp(0.0, 100.0) as u8
}

/// Tier from the combined score.
pub fn score_risk_level(score: u8) -> RiskLevel {
  if score > 80 {
    RiskLevel::Low
  } else if score > 60 {
    RiskLevel::Medium
  } else if score > 40 {
    RiskLevel::High
  } else {
    RiskLevel::Critical
  }
}

/// Fixed-priority recommendations, capped at 3.
pub fn compute_recommendations(summary: &TelemetrySummary) -> Vec<String> {
  let mut out = Vec::new();
  if summary.product_pages_passed < summary.product_pages_total {
    out.push("Fix missing critical elements on product pages".to_string());
  }
  if summary.images_loaded < summary.images_total {
    out.push("Resolve image loading issues".to_string());
  }
  if summary.js_errors_count > 0 {
    out.push("Address JavaScript errors".to_string());
  }
  out.truncate(MAX_RECOMMENDATIONS);
  out
}

pub fn compute_summary(score: u8, summary: &TelemetrySummary) -> String {
  format!(
    "Test completed with {}% overall score. {}/{} product pages passed validation.",
    score, summary.product_pages_passed, summary.product_pages_total
  )
}

/// Build a complete assessment from counts alone.
pub fn assess(summary: &TelemetrySummary) -> AssessmentRecord {
  let score = compute_score(summary);
  AssessmentRecord {
    risk_level: score_risk_level(score),
    score,
    recommendations: compute_recommendations(summary),
    summary: compute_summary(score, summary),
  }
}

/// Convenience: normalize then assess.
pub fn heuristic_assessment(telemetry: &TestExecutionTelemetry) -> AssessmentRecord {
  assess(&normalize::summarize(telemetry))
}
