//! Fluent entry point.
//!
//! ```
//! use dom_should::should;
//! use dom_should::dom::Document;
//!
//! let doc = Document::parse(r#"<ul><li class="done">a</li></ul>"#).unwrap();
//! should(&doc, "li").unwrap().have_class("done").assert();
//! should(&doc, "li").unwrap().not().be_hidden().assert();
//! ```

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::assertion::{inspect, AssertionContext, AssertionResult};
use crate::config::ShouldConfig;
use crate::matcher::{Matcher, TextExpectation};
use crate::query::{ElementCollection, ElementQuery, HandlerId};
use crate::result::ShouldResult;

/// Resolve `selector` against `query` and start an expectation
///
/// # Errors
///
/// Returns [`crate::ShouldError::InvalidSelector`] if the selector does not parse
pub fn should<'q, Q: ElementQuery>(query: &'q Q, selector: &str) -> ShouldResult<Should<'q, Q>> {
    Ok(Should::new(query, query.resolve(selector)?))
}

/// Expectations over one element collection
#[derive(Debug)]
pub struct Should<'q, Q: ElementQuery> {
    query: &'q Q,
    target: ElementCollection<Q::Node>,
    config: ShouldConfig,
    negated: bool,
}

impl<'q, Q: ElementQuery> Should<'q, Q> {
    /// Start an expectation over an already resolved collection
    #[must_use]
    pub fn new(query: &'q Q, target: ElementCollection<Q::Node>) -> Self {
        Self {
            query,
            target,
            config: ShouldConfig::default(),
            negated: false,
        }
    }

    /// Evaluate with a non-default configuration
    #[must_use]
    pub fn with_config(mut self, config: ShouldConfig) -> Self {
        self.config = config;
        self
    }

    /// Invert every following check
    #[must_use]
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Collection under test
    #[must_use]
    pub fn target(&self) -> &ElementCollection<Q::Node> {
        &self.target
    }

    /// Evaluate any matcher
    ///
    /// # Errors
    ///
    /// Propagates renderer and selector errors raised by the matcher
    pub fn satisfy(&self, matcher: &Matcher) -> ShouldResult<AssertionResult> {
        let subject = inspect(self.query, &self.target, &self.config);
        let mut ctx = AssertionContext::new(self.target.clone()).negated(self.negated);
        matcher.evaluate(self.query, &mut ctx, &self.config)?;
        Ok(ctx.finish(&subject))
    }

    // Matchers below never raise, so an error can only be reported as a
    // failed expectation.
    fn check(&self, matcher: &Matcher) -> AssertionResult {
        self.satisfy(matcher)
            .unwrap_or_else(|err| AssertionResult::fail(err.to_string()))
    }

    /// Some element carries `class`
    #[must_use]
    pub fn have_class(&self, class: &str) -> AssertionResult {
        self.check(&Matcher::HaveClass(class.to_string()))
    }

    /// Every property has the expected computed value
    #[must_use]
    pub fn have_css<K, V>(&self, css: impl IntoIterator<Item = (K, V)>) -> AssertionResult
    where
        K: Into<String>,
        V: Into<String>,
    {
        let css: BTreeMap<String, String> = css
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.check(&Matcher::HaveCss(css))
    }

    /// Some element is visible
    #[must_use]
    pub fn be_visible(&self) -> AssertionResult {
        self.check(&Matcher::Visible)
    }

    /// Some element is hidden
    #[must_use]
    pub fn be_hidden(&self) -> AssertionResult {
        self.check(&Matcher::Hidden)
    }

    /// Some element is a selected option
    #[must_use]
    pub fn be_selected(&self) -> AssertionResult {
        self.check(&Matcher::Selected)
    }

    /// Some element is checked
    #[must_use]
    pub fn be_checked(&self) -> AssertionResult {
        self.check(&Matcher::Checked)
    }

    /// Some element has no children
    #[must_use]
    pub fn be_empty(&self) -> AssertionResult {
        self.check(&Matcher::Empty)
    }

    /// First element is attached to its document
    #[must_use]
    pub fn be_in_dom(&self) -> AssertionResult {
        self.check(&Matcher::InDom)
    }

    /// Collection is non-empty
    #[must_use]
    pub fn exist(&self) -> AssertionResult {
        self.check(&Matcher::Exist)
    }

    /// Collection has exactly `length` elements
    #[must_use]
    pub fn have_length(&self, length: usize) -> AssertionResult {
        self.check(&Matcher::HaveLength(length))
    }

    /// Attribute is present
    #[must_use]
    pub fn have_attr(&self, name: &str) -> AssertionResult {
        self.check(&Matcher::HaveAttr {
            name: name.to_string(),
            expected: None,
        })
    }

    /// Attribute equals `value`
    #[must_use]
    pub fn have_attr_value(&self, name: &str, value: &str) -> AssertionResult {
        self.check(&Matcher::HaveAttr {
            name: name.to_string(),
            expected: Some(value.to_string()),
        })
    }

    /// Property is present
    #[must_use]
    pub fn have_prop(&self, name: &str) -> AssertionResult {
        self.check(&Matcher::HaveProp {
            name: name.to_string(),
            expected: None,
        })
    }

    /// Property equals `value`
    #[must_use]
    pub fn have_prop_value(&self, name: &str, value: impl Into<Value>) -> AssertionResult {
        self.check(&Matcher::HaveProp {
            name: name.to_string(),
            expected: Some(value.into()),
        })
    }

    /// `id` equals
    #[must_use]
    pub fn have_id(&self, id: &str) -> AssertionResult {
        self.check(&Matcher::HaveId(id.to_string()))
    }

    /// Inner markup equals `html` once normalized
    ///
    /// # Errors
    ///
    /// Returns the renderer's error if `html` cannot be parsed
    pub fn have_html(&self, html: &str) -> ShouldResult<AssertionResult> {
        self.satisfy(&Matcher::HaveHtml(html.to_string()))
    }

    /// Inner markup contains `html` once normalized
    ///
    /// # Errors
    ///
    /// Returns the renderer's error if `html` cannot be parsed
    pub fn contain_html(&self, html: &str) -> ShouldResult<AssertionResult> {
        self.satisfy(&Matcher::ContainHtml(html.to_string()))
    }

    /// Trimmed text equals `text`
    #[must_use]
    pub fn have_text(&self, text: impl Into<TextExpectation>) -> AssertionResult {
        self.check(&Matcher::HaveText(text.into()))
    }

    /// Trimmed text matches `pattern`
    #[must_use]
    pub fn match_text(&self, pattern: &Regex) -> AssertionResult {
        self.check(&Matcher::HaveText(TextExpectation::Pattern(pattern.clone())))
    }

    /// Trimmed text contains `text`
    #[must_use]
    pub fn contain_text(&self, text: impl Into<TextExpectation>) -> AssertionResult {
        self.check(&Matcher::ContainText(text.into()))
    }

    /// Form value equals
    #[must_use]
    pub fn have_value(&self, value: &str) -> AssertionResult {
        self.check(&Matcher::HaveValue(value.to_string()))
    }

    /// Data entry is present
    #[must_use]
    pub fn have_data(&self, key: &str) -> AssertionResult {
        self.check(&Matcher::HaveData {
            key: key.to_string(),
            expected: None,
        })
    }

    /// Data entry equals `value`
    #[must_use]
    pub fn have_data_value(&self, key: &str, value: impl Into<Value>) -> AssertionResult {
        self.check(&Matcher::HaveData {
            key: key.to_string(),
            expected: Some(value.into()),
        })
    }

    /// Some descendant matches `selector`
    ///
    /// # Errors
    ///
    /// Returns [`crate::ShouldError::InvalidSelector`] for an unparseable selector
    pub fn contain_element(&self, selector: &str) -> ShouldResult<AssertionResult> {
        self.satisfy(&Matcher::ContainElement(selector.to_string()))
    }

    /// Some element matches `selector`
    ///
    /// # Errors
    ///
    /// Returns [`crate::ShouldError::InvalidSelector`] for an unparseable selector
    pub fn be_matched_by(&self, selector: &str) -> ShouldResult<AssertionResult> {
        self.satisfy(&Matcher::MatchedBy(selector.to_string()))
    }

    /// Some element is disabled
    #[must_use]
    pub fn be_disabled(&self) -> AssertionResult {
        self.check(&Matcher::Disabled)
    }

    /// First element has focus
    #[must_use]
    pub fn be_focused(&self) -> AssertionResult {
        self.check(&Matcher::Focused)
    }

    /// A handler is bound for `event` (`type.ns1.ns2`)
    #[must_use]
    pub fn handle(&self, event: &str) -> AssertionResult {
        self.check(&Matcher::Handle(event.to_string()))
    }

    /// `handler` is bound for the type of `event`
    #[must_use]
    pub fn handle_with(&self, event: &str, handler: HandlerId) -> AssertionResult {
        self.check(&Matcher::HandleWith {
            event: event.to_string(),
            handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::result::ShouldError;

    #[test]
    fn test_invalid_selector() {
        let doc = Document::new();
        assert!(matches!(
            should(&doc, "div[").unwrap_err(),
            ShouldError::InvalidSelector { .. }
        ));
    }

    #[test]
    fn test_failure_message() {
        let doc = Document::parse(r#"<div class="foo bar"></div>"#).unwrap();
        let result = should(&doc, "div").unwrap().have_class("baz");
        assert!(!result.passed);
        assert!(result.message.ends_with("to have class baz"));
        assert!(result.message.starts_with("expected SELECTOR(div) matching 1 elements"));
    }

    #[test]
    fn test_not_toggles() {
        let doc = Document::parse("<p></p>").unwrap();
        let expectation = should(&doc, "p").unwrap();
        assert!(expectation.exist().passed);
        let negated = expectation.not();
        let result = negated.exist();
        assert!(!result.passed);
        assert!(result.message.ends_with("not to exist"));
        assert!(negated.not().exist().passed);
    }

    #[test]
    fn test_have_css_pairs() {
        let doc = Document::parse(r#"<div style="color: red; opacity: auto"></div>"#).unwrap();
        let expectation = should(&doc, "div").unwrap();
        assert!(expectation.have_css([("color", "red"), ("opacity", "auto")]).passed);
        assert!(!expectation.have_css([("color", "blue")]).passed);
    }

    #[test]
    fn test_html_errors_surface() {
        let doc = Document::parse("<div><b>x</b></div>").unwrap();
        let expectation = should(&doc, "div").unwrap();
        assert!(expectation.have_html("<B>x</B>").unwrap().passed);
        assert!(expectation.contain_html("<b class='x>").is_err());
    }

    #[test]
    fn test_text_forms() {
        let doc = Document::parse("<p> total: 12 </p>").unwrap();
        let expectation = should(&doc, "p").unwrap();
        assert!(expectation.have_text("total: 12").passed);
        assert!(expectation.contain_text("12").passed);
        assert!(expectation.match_text(&Regex::new(r"^total: \d+$").unwrap()).passed);
    }

    #[test]
    fn test_untrimmed_config() {
        let doc = Document::parse("<p> x </p>").unwrap();
        let expectation = should(&doc, "p")
            .unwrap()
            .with_config(ShouldConfig::default().with_trim_text(false));
        assert!(!expectation.have_text("x").passed);
        assert!(expectation.have_text(" x ").passed);
    }

    #[test]
    fn test_values() {
        let doc = Document::parse(r#"<input id="q" value="rust" data-page="2" disabled>"#).unwrap();
        let expectation = should(&doc, "#q").unwrap();
        assert!(expectation.have_value("rust").passed);
        assert!(expectation.have_id("q").passed);
        assert!(expectation.have_attr("disabled").passed);
        assert!(expectation.have_attr_value("value", "rust").passed);
        assert!(expectation.have_prop_value("disabled", true).passed);
        assert!(expectation.have_data_value("page", 2).passed);
        assert!(expectation.have_data("page").passed);
        assert!(!expectation.have_prop("nonsense").passed);
        assert!(expectation.be_disabled().passed);
    }

    #[test]
    fn test_handlers() {
        let doc = Document::parse("<a></a>").unwrap();
        let anchor = *doc.resolve("a").unwrap().first().unwrap();
        let handler = doc.bind(&anchor, "click.nav");
        let expectation = should(&doc, "a").unwrap();
        assert!(expectation.handle("click").passed);
        assert!(expectation.handle("click.nav").passed);
        assert!(!expectation.handle("click.other").passed);
        assert!(expectation.handle_with("click.other", handler).passed);
        assert!(!expectation.handle_with("click", HandlerId::new()).passed);
    }
}
