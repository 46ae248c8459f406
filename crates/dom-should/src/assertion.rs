//! Assertion context, verdicts and collection inspection.

mod soft;

pub use soft::{AssertionFailure, AssertionMode, AssertionSummary, SoftAssertionError, SoftExpectations};

use std::fmt;

use crate::config::ShouldConfig;
use crate::query::{ElementCollection, ElementQuery};

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message, empty on success
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Panic with the failure message unless the assertion passed
    #[track_caller]
    pub fn assert(&self) {
        assert!(self.passed, "{}", self.message);
    }
}

impl fmt::Display for AssertionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            f.write_str("passed")
        } else {
            write!(f, "failed: {}", self.message)
        }
    }
}

/// Per-invocation state handed to a matcher.
///
/// The matcher sets a description, then records exactly one verdict. The
/// context is consumed by [`AssertionContext::finish`].
#[derive(Debug, Clone)]
pub struct AssertionContext<N> {
    target: ElementCollection<N>,
    description: String,
    negated: bool,
    verdict: Option<bool>,
}

impl<N> AssertionContext<N> {
    /// Create a context for `target`
    #[must_use]
    pub fn new(target: ElementCollection<N>) -> Self {
        Self {
            target,
            description: String::new(),
            negated: false,
            verdict: None,
        }
    }

    /// Invert the expectation
    #[must_use]
    pub fn negated(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    /// Collection under test
    #[must_use]
    pub fn target(&self) -> &ElementCollection<N> {
        &self.target
    }

    /// Whether the expectation is inverted
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Set the failure-message description (`to have class x`)
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Current description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Record the raw matcher verdict, before negation
    pub fn record(&mut self, verdict: bool) {
        self.verdict = Some(verdict);
    }

    /// Raw verdict, if one was recorded
    #[must_use]
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }

    /// Turn the recorded verdict into an [`AssertionResult`].
    ///
    /// `subject` is the rendered target used in the failure message. A
    /// context with no recorded verdict fails.
    #[must_use]
    pub fn finish(self, subject: &str) -> AssertionResult {
        let Some(verdict) = self.verdict else {
            return AssertionResult::fail(format!(
                "no verdict recorded for {subject} {}",
                self.description
            ));
        };
        if verdict != self.negated {
            AssertionResult::pass()
        } else {
            let not = if self.negated { "not " } else { "" };
            AssertionResult::fail(format!("expected {subject} {not}{}", self.description))
        }
    }
}

/// Render a collection for failure messages.
///
/// Selector-tagged collections read `SELECTOR(sel) matching N elements: ...`;
/// untagged ones are the comma-joined outer markup of their elements. At most
/// `config.max_inspect_elements` elements are rendered.
pub fn inspect<Q: ElementQuery>(
    query: &Q,
    collection: &ElementCollection<Q::Node>,
    config: &ShouldConfig,
) -> String {
    let mut elements: Vec<String> = collection
        .iter()
        .take(config.max_inspect_elements)
        .map(|node| query.outer_html(node))
        .collect();
    if collection.len() > config.max_inspect_elements {
        elements.push(format!(
            "... {} more",
            collection.len() - config.max_inspect_elements
        ));
    }
    let listed = elements.join(", ");

    match collection.selector() {
        Some(selector) => {
            let mut out = format!(
                "SELECTOR({selector}) matching {} elements",
                collection.len()
            );
            if !listed.is_empty() {
                out.push_str(": ");
                out.push_str(&listed);
            }
            out
        }
        None => listed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    mod result_tests {
        use super::*;

        #[test]
        fn test_pass() {
            let result = AssertionResult::pass();
            assert!(result.passed);
            assert!(result.message.is_empty());
            assert_eq!(result.to_string(), "passed");
        }

        #[test]
        fn test_fail() {
            let result = AssertionResult::fail("boom");
            assert!(!result.passed);
            assert_eq!(result.to_string(), "failed: boom");
        }

        #[test]
        #[should_panic(expected = "boom")]
        fn test_assert_panics_on_failure() {
            AssertionResult::fail("boom").assert();
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_pass_and_fail() {
            let mut ctx = AssertionContext::new(ElementCollection::single(1u8));
            ctx.set_description("to have class x");
            ctx.record(true);
            assert!(ctx.finish("<p>").passed);

            let mut ctx = AssertionContext::new(ElementCollection::single(1u8));
            ctx.set_description("to have class x");
            ctx.record(false);
            assert_eq!(ctx.finish("<p>").message, "expected <p> to have class x");
        }

        #[test]
        fn test_negated() {
            let mut ctx = AssertionContext::new(ElementCollection::single(1u8)).negated(true);
            ctx.set_description("to be visible");
            ctx.record(true);
            assert_eq!(ctx.finish("<p>").message, "expected <p> not to be visible");

            let mut ctx = AssertionContext::new(ElementCollection::single(1u8)).negated(true);
            ctx.record(false);
            assert!(ctx.finish("<p>").passed);
        }

        #[test]
        fn test_missing_verdict_fails() {
            let ctx: AssertionContext<u8> = AssertionContext::new(ElementCollection::empty());
            assert!(!ctx.finish("x").passed);
        }
    }

    mod inspect_tests {
        use super::*;

        #[test]
        fn test_selector_form() {
            let doc = Document::parse("<i></i><i></i>").unwrap();
            let found = doc.resolve("i").unwrap();
            assert_eq!(
                inspect(&doc, &found, &ShouldConfig::default()),
                "SELECTOR(i) matching 2 elements: <i></i>, <i></i>"
            );
        }

        #[test]
        fn test_selector_no_match() {
            let doc = Document::new();
            let found = doc.resolve("i").unwrap();
            assert_eq!(
                inspect(&doc, &found, &ShouldConfig::default()),
                "SELECTOR(i) matching 0 elements"
            );
        }

        #[test]
        fn test_untagged_and_capped() {
            let doc = Document::parse("<b></b><b></b><b></b>").unwrap();
            let found = ElementCollection::new(doc.resolve("b").unwrap().nodes().to_vec());
            let config = ShouldConfig::default().with_max_inspect_elements(2);
            assert_eq!(inspect(&doc, &found, &config), "<b></b>, <b></b>, ... 1 more");
        }
    }
}
