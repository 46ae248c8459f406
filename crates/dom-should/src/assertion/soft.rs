//! Soft expectations.
//!
//! Collect several matcher failures against a fixture before failing the
//! test, instead of stopping at the first one.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::AssertionResult;

/// A single failed expectation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Failure message produced by the matcher
    pub message: String,
    /// Position of this expectation in the checked sequence
    pub index: usize,
}

impl AssertionFailure {
    /// Create a new assertion failure
    #[must_use]
    pub fn new(message: impl Into<String>, index: usize) -> Self {
        Self {
            message: message.into(),
            index,
        }
    }
}

/// How a [`SoftExpectations`] collector reacts to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssertionMode {
    /// Collect all failures (default)
    #[default]
    Collect,
    /// Ignore further checks after the first failure
    FailFast,
}

/// Collector for matcher results.
///
/// ```
/// use dom_should::{should, SoftExpectations};
/// use dom_should::dom::Document;
///
/// let doc = Document::parse(r#"<p class="a">x</p>"#).unwrap();
/// let mut soft = SoftExpectations::new();
/// soft.check(should(&doc, "p").unwrap().have_class("a"));
/// soft.check(should(&doc, "p").unwrap().have_class("b"));
/// assert_eq!(soft.failure_count(), 1);
/// assert!(soft.verify().is_err());
/// ```
#[derive(Debug, Default)]
pub struct SoftExpectations {
    failures: Vec<AssertionFailure>,
    mode: AssertionMode,
    checked: usize,
}

impl SoftExpectations {
    /// Create a new collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a specific mode
    #[must_use]
    pub fn with_mode(mode: AssertionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Record the outcome of one expectation
    pub fn check(&mut self, result: AssertionResult) {
        if self.mode == AssertionMode::FailFast && !self.failures.is_empty() {
            return;
        }
        self.checked += 1;
        if !result.passed {
            let failure = AssertionFailure::new(result.message, self.checked - 1);
            self.failures.push(failure);
        }
    }

    /// Record a failure that did not come from a matcher
    pub fn fail(&mut self, message: impl Into<String>) {
        self.check(AssertionResult::fail(message));
    }

    /// All failures so far
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Number of failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of expectations checked
    #[must_use]
    pub const fn checked_count(&self) -> usize {
        self.checked
    }

    /// Whether every checked expectation passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fail with every collected message if anything failed
    ///
    /// # Errors
    ///
    /// Returns an error listing all failure messages
    pub fn verify(&self) -> Result<(), SoftAssertionError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(SoftAssertionError::new(&self.failures))
        }
    }

    /// Forget everything collected so far
    pub fn clear(&mut self) {
        self.failures.clear();
        self.checked = 0;
    }

    /// Counts of checked, passed and failed expectations
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        AssertionSummary {
            total: self.checked,
            passed: self.checked - self.failures.len(),
            failed: self.failures.len(),
        }
    }
}

/// Summary of collected results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Total expectations checked
    pub total: usize,
    /// Expectations that passed
    pub passed: usize,
    /// Expectations that failed
    pub failed: usize,
}

/// Error returned by [`SoftExpectations::verify`]
#[derive(Debug, Clone)]
pub struct SoftAssertionError {
    /// All failure messages
    pub failures: Vec<String>,
}

impl SoftAssertionError {
    /// Create a new error from failures
    #[must_use]
    pub fn new(failures: &[AssertionFailure]) -> Self {
        Self {
            failures: failures.iter().map(|f| f.message.clone()).collect(),
        }
    }
}

impl fmt::Display for SoftAssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} expectation(s) failed:", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            writeln!(f, "  {}. {failure}", i + 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for SoftAssertionError {}
