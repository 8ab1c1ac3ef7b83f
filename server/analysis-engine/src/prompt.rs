//! Render the instruction text sent to the completion collaborator.
//!
//! The thresholds stated here classify by product-page pass rate, unlike the
//! heuristic scorer which classifies by the combined score.

use std::fmt::Write;

use crate::normalize;
use crate::types::*;

/// Number of JS error messages quoted in the prompt.
pub const PROMPT_JS_ERROR_SAMPLE: usize = 3;

pub const SYSTEM_PROMPT: &str = "You are an expert QA engineer analyzing ecommerce website test results. \
Always respond ONLY with valid JSON matching the required schema.";

const SCHEMA_AND_RULES: &str = r#"Analyze the following ecommerce website test results and respond ONLY in valid JSON with this schema:

{
  "riskLevel": "low | medium | high | critical",
  "score": number (0-100),
  "recommendations": [ "string", "string", "string" ],
  "summary": "short summary under 50 words"
}

Rules:
- Risk level must be determined as:
  - "critical" if product page pass rate < 50%
  - "high" if pass rate < 70%
  - "medium" if pass rate < 85%
  - "low" otherwise
- Provide exactly 3 recommendations, each under 15 words, actionable.
- Summary must be clear and concise.
"#;

/// Build the user prompt for one telemetry record.
pub fn build_prompt(summary: &TelemetrySummary, telemetry: &TestExecutionTelemetry) -> String {
  let issues = normalize::critical_element_issues(&telemetry.product_page_tests);
  let issues = if issues.is_empty() {
    "None".to_string()
  } else {
    issues.join(", ")
  };

  let mut out = String::from(SCHEMA_AND_RULES);
  // Writing to a String cannot fail.
  let _ = write!(
    out,
    "
Test Results:
Product Page Tests:
- Total pages tested: {}
- Pages passed: {}
- Critical elements missing: {}

Image Loading:
- Total images: {}
- Successfully loaded: {}
- Failed to load: {}

Errors Detected:
- JavaScript errors: {}
- Network failures: {}
- Console warnings: {}

Most critical JavaScript errors:
",
    summary.product_pages_total,
    summary.product_pages_passed,
    issues,
    summary.images_total,
    summary.images_loaded,
    summary.images_failed(),
    summary.js_errors_count,
    summary.network_errors_count,
    summary.warnings_count,
  );

  let errors = normalize::top_js_errors(&telemetry.error_detection, PROMPT_JS_ERROR_SAMPLE);
  if errors.is_empty() {
    out.push_str("- None\n");
  }
  for message in errors {
    let _ = writeln!(out, "- {}", message);
  }
  out
}
