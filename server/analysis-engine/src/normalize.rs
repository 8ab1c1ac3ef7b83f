//! Derive aggregate counts from raw test-run telemetry. Pure; no I/O.

use crate::types::*;

/// Count pages, images and errors in one telemetry record.
pub fn summarize(telemetry: &TestExecutionTelemetry) -> TelemetrySummary {
  let errors = &telemetry.error_detection;
  TelemetrySummary {
    product_pages_total: telemetry.product_page_tests.len(),
    product_pages_passed: telemetry
      .product_page_tests
      .iter()
      .filter(|t| t.passed)
      .count(),
    images_total: telemetry.image_validation.len(),
    images_loaded: telemetry.image_validation.iter().filter(|i| i.loaded).count(),
    js_errors_count: errors.js_errors.len(),
    network_errors_count: errors.network_errors.len(),
    warnings_count: errors.console_warnings.len(),
  }
}

/// Fraction of `passed` over `total` in [0, 1]. No items means no failures.
pub fn pass_rate(passed: usize, total: usize) -> f64 {
  if total == 0 {
    1.0
  } else {
    passed as f64 / total as f64
  }
}

impl TelemetrySummary {
  pub fn page_pass_rate(&self) -> f64 {
    pass_rate(self.product_pages_passed, self.product_pages_total)
  }

  pub fn image_success_rate(&self) -> f64 {
    pass_rate(self.images_loaded, self.images_total)
  }
}

/// Missing critical product-page elements across all page tests,
/// de-duplicated in first-seen order.
pub fn critical_element_issues(tests: &[PageTest]) -> Vec<&'static str> {
  let mut issues: Vec<&'static str> = Vec::new();
  let mut push = |issue: &'static str| {
    if !issues.contains(&issue) {
      issues.push(issue);
    }
  };
  for test in tests {
    if !test.elements.title.present {
      push("Missing product titles");
    }
    if !test.elements.price.present {
      push("Missing price display");
    }
    if !test.elements.add_to_cart.present {
      push("Missing add to cart buttons");
    }
  }
  issues
}

/// First `n` JS error messages, original order.
pub fn top_js_errors(errors: &ErrorDetection, n: usize) -> Vec<&str> {
  errors
    .js_errors
    .iter()
    .take(n)
    .map(|e| e.message.as_str())
    .collect()
}


#[cfg(test)]
mod tests {
  use super::fixtures::*;
  use super::*;

  #[test]
  fn summarize_counts_everything() {
    let mut t = telemetry(10, 5, 20, 18, 4);
    t.error_detection.network_errors.push(NetworkError {
      status: Some(503),
      url: "https://shop.example.com/api/cart".into(),
      error: None,
      timestamp: String::new(),
    });
    t.error_detection.console_warnings.push(ConsoleWarning {
      message: "deprecated API".into(),
      timestamp: String::new(),
    });

    let s = summarize(&t);
    assert_eq!(s.product_pages_total, 10);
    assert_eq!(s.product_pages_passed, 5);
    assert_eq!(s.images_total, 20);
    assert_eq!(s.images_loaded, 18);
    assert_eq!(s.images_failed(), 2);
    assert_eq!(s.js_errors_count, 4);
    assert_eq!(s.network_errors_count, 1);
    assert_eq!(s.warnings_count, 1);
  }

  #[test]
  fn empty_dimensions_count_as_full_success() {
    let s = summarize(&telemetry(0, 0, 0, 0, 0));
    assert_eq!(s.page_pass_rate(), 1.0);
    assert_eq!(s.image_success_rate(), 1.0);
  }

  #[test]
  fn critical_issues_are_deduplicated_in_order() {
    let mut a = page(false);
    a.elements.price = element(false);
    let mut b = page(false);
    b.elements.title = element(false);
    b.elements.price = element(false);
    let c = page(true);

    assert_eq!(
      critical_element_issues(&[a, b, c]),
      vec!["Missing price display", "Missing product titles"]
    );
    assert!(critical_element_issues(&[page(true)]).is_empty());
  }

  #[test]
  fn top_js_errors_preserves_order() {
    let t = telemetry(0, 0, 0, 0, 5);
    assert_eq!(
      top_js_errors(&t.error_detection, 3),
      vec!["TypeError #0", "TypeError #1", "TypeError #2"]
    );
  }
}
