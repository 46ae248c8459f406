//! The matcher catalogue.
//!
//! Each [`Matcher`] variant is one named check over an element collection.
//! Evaluation sets the failure description on the [`AssertionContext`] and
//! records a boolean verdict; only markup the renderer rejects and selectors
//! the engine cannot parse surface as errors.
//!
//! Class and pseudo-state checks pass when any element qualifies. Attribute,
//! property, data, value, CSS, ID, HTML, focus and DOM-membership checks read
//! the first element. Text checks read the concatenated text of all elements.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::assertion::{inspect, AssertionContext};
use crate::config::ShouldConfig;
use crate::events;
use crate::normalize::normalize;
use crate::query::{ElementCollection, ElementQuery, HandlerId, PseudoState};
use crate::result::ShouldResult;

/// Expected text: a literal string or a pattern
#[derive(Debug, Clone)]
pub enum TextExpectation {
    /// Compared verbatim (equality or substring)
    Literal(String),
    /// Tested against the text
    Pattern(Regex),
}

impl TextExpectation {
    fn equals(&self, text: &str) -> bool {
        match self {
            Self::Literal(expected) => text == expected,
            Self::Pattern(re) => re.is_match(text),
        }
    }

    fn is_contained_in(&self, text: &str) -> bool {
        match self {
            Self::Literal(expected) => text.contains(expected.as_str()),
            Self::Pattern(re) => re.is_match(text),
        }
    }
}

impl fmt::Display for TextExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for TextExpectation {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_string())
    }
}

impl From<String> for TextExpectation {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl From<Regex> for TextExpectation {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

/// One check from the catalogue, with its arguments
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Some element carries the class token
    HaveClass(String),
    /// Every listed CSS property has the expected computed value
    HaveCss(BTreeMap<String, String>),
    /// Some element is visible
    Visible,
    /// Some element is hidden
    Hidden,
    /// Some element is a selected option
    Selected,
    /// Some element is checked
    Checked,
    /// Some element has no children
    Empty,
    /// First element is attached under its document root
    InDom,
    /// Collection is non-empty
    Exist,
    /// Collection has exactly this many elements
    HaveLength(usize),
    /// Attribute present, or equal to `expected`
    HaveAttr {
        /// Attribute name
        name: String,
        /// Expected value; `None` checks presence only
        expected: Option<String>,
    },
    /// Property present, or equal to `expected`
    HaveProp {
        /// Property name
        name: String,
        /// Expected value; `None` checks presence only
        expected: Option<Value>,
    },
    /// `id` attribute equals
    HaveId(String),
    /// Inner markup equals the normalized fragment
    HaveHtml(String),
    /// Inner markup contains the normalized fragment
    ContainHtml(String),
    /// Trimmed text equals, or matches the pattern
    HaveText(TextExpectation),
    /// Trimmed text contains, or matches the pattern
    ContainText(TextExpectation),
    /// Form value equals
    HaveValue(String),
    /// Data value present, or equal to `expected`
    HaveData {
        /// Data key
        key: String,
        /// Expected value; `None` checks presence only
        expected: Option<Value>,
    },
    /// Some descendant matches the selector
    ContainElement(String),
    /// Some element matches the selector
    MatchedBy(String),
    /// Some element is disabled
    Disabled,
    /// First element is its document's active element
    Focused,
    /// A handler is bound for the event (namespaces honoured)
    Handle(String),
    /// This handler is bound for the event type
    HandleWith {
        /// Event string; namespaces are ignored
        event: String,
        /// Handler identity
        handler: HandlerId,
    },
}

impl Matcher {
    /// Registered name of the matcher
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HaveClass(_) => "haveClass",
            Self::HaveCss(_) => "haveCss",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Selected => "selected",
            Self::Checked => "checked",
            Self::Empty => "emptyJq",
            Self::InDom => "inDOM",
            Self::Exist => "exist",
            Self::HaveLength(_) => "haveLength",
            Self::HaveAttr { .. } => "haveAttr",
            Self::HaveProp { .. } => "haveProp",
            Self::HaveId(_) => "haveId",
            Self::HaveHtml(_) => "haveHtml",
            Self::ContainHtml(_) => "containHtml",
            Self::HaveText(_) => "haveText",
            Self::ContainText(_) => "containText",
            Self::HaveValue(_) => "haveValue",
            Self::HaveData { .. } => "haveData",
            Self::ContainElement(_) => "containElement",
            Self::MatchedBy(_) => "matchedBy",
            Self::Disabled => "disabled",
            Self::Focused => "focused",
            Self::Handle(_) => "handle",
            Self::HandleWith { .. } => "handleWith",
        }
    }

    /// Evaluate against the context's target and record the verdict.
    ///
    /// # Errors
    ///
    /// Propagates renderer errors from HTML normalization and selector errors
    /// from `containElement` / `matchedBy`.
    pub fn evaluate<Q: ElementQuery>(
        &self,
        query: &Q,
        ctx: &mut AssertionContext<Q::Node>,
        config: &ShouldConfig,
    ) -> ShouldResult<()> {
        let target = ctx.target();
        let first = target.first();

        let (description, verdict) = match self {
            Self::HaveClass(class) => (
                format!("to have class {class}"),
                target.iter().any(|node| query.has_class(node, class)),
            ),
            Self::HaveCss(css) => (
                format!("to have css {}", css_json(css)),
                first.is_some_and(|node| has_css(query, node, css, config)),
            ),
            Self::Visible => ("to be visible".into(), any_is(query, target, PseudoState::Visible)),
            Self::Hidden => ("to be hidden".into(), any_is(query, target, PseudoState::Hidden)),
            Self::Selected => (
                "to be selected".into(),
                any_is(query, target, PseudoState::Selected),
            ),
            Self::Checked => ("to be checked".into(), any_is(query, target, PseudoState::Checked)),
            Self::Empty => ("to be empty".into(), any_is(query, target, PseudoState::Empty)),
            Self::InDom => (
                "to be in the DOM".into(),
                first.is_some_and(|node| {
                    query
                        .document_element(node)
                        .is_some_and(|root| query.contains(&root, node))
                }),
            ),
            Self::Exist => ("to exist".into(), !target.is_empty()),
            Self::HaveLength(length) => (format!("to have length {length}"), target.len() == *length),
            Self::HaveAttr { name, expected } => (
                format!(
                    "to have attribute {name} with value {}",
                    expected.as_deref().unwrap_or("undefined")
                ),
                has_property(
                    first.and_then(|node| query.attr(node, name)).as_ref(),
                    expected.as_ref(),
                ),
            ),
            Self::HaveProp { name, expected } => (
                format!(
                    "to have property {name} with value {}",
                    display_value(expected.as_ref())
                ),
                has_property(
                    first.and_then(|node| query.prop(node, name)).as_ref(),
                    expected.as_ref(),
                ),
            ),
            Self::HaveId(id) => (
                format!("to have ID {id}"),
                first.and_then(|node| query.attr(node, "id")).as_deref() == Some(id.as_str()),
            ),
            Self::HaveHtml(html) => {
                let expected = normalize(query, html)?;
                (
                    format!("to have HTML {html}"),
                    first.is_some_and(|node| query.html(node) == expected),
                )
            }
            Self::ContainHtml(html) => {
                let expected = normalize(query, html)?;
                (
                    format!("to contain HTML {html}"),
                    first.is_some_and(|node| query.html(node).contains(&expected)),
                )
            }
            Self::HaveText(text) => (
                format!("to have text {text}"),
                text.equals(&collection_text(query, target, config)),
            ),
            Self::ContainText(text) => (
                format!("to contain text {text}"),
                text.is_contained_in(&collection_text(query, target, config)),
            ),
            Self::HaveValue(value) => (
                format!("to have value {value}"),
                first.and_then(|node| query.val(node)).as_deref() == Some(value.as_str()),
            ),
            Self::HaveData { key, expected } => (
                format!(
                    "to have data {key} with value {}",
                    display_value(expected.as_ref())
                ),
                has_property(
                    first.and_then(|node| query.data(node, key)).as_ref(),
                    expected.as_ref(),
                ),
            ),
            Self::ContainElement(selector) => {
                let described = query.resolve(selector)?;
                (
                    format!("to contain {}", inspect(query, &described, config)),
                    !query.find(target.nodes(), selector)?.is_empty(),
                )
            }
            Self::MatchedBy(selector) => (
                format!("to be matched by selector {selector}"),
                !query.filter(target.nodes(), selector)?.is_empty(),
            ),
            Self::Disabled => ("to be disabled".into(), any_is(query, target, PseudoState::Disabled)),
            Self::Focused => (
                "to be focused".into(),
                first.is_some_and(|node| query.active_element(node).as_ref() == Some(node)),
            ),
            Self::Handle(event) => (
                format!("to handle {event}"),
                events::has_handler(query, target, event),
            ),
            Self::HandleWith { event, handler } => (
                format!("to handle {event} with {handler}"),
                events::has_handler_equal_to(query, target, event, *handler),
            ),
        };

        debug!(
            matcher = self.name(),
            verdict,
            negated = ctx.is_negated(),
            "matcher evaluated"
        );
        ctx.set_description(description);
        ctx.record(verdict);
        Ok(())
    }
}

fn any_is<Q: ElementQuery>(
    query: &Q,
    target: &ElementCollection<Q::Node>,
    state: PseudoState,
) -> bool {
    target.iter().any(|node| query.is(node, state))
}

/// Presence check when nothing is expected, equality otherwise.
fn has_property<T: PartialEq>(actual: Option<&T>, expected: Option<&T>) -> bool {
    match expected {
        None => actual.is_some(),
        Some(expected) => actual == Some(expected),
    }
}

fn has_css<Q: ElementQuery>(
    query: &Q,
    node: &Q::Node,
    css: &BTreeMap<String, String>,
    config: &ShouldConfig,
) -> bool {
    css.iter().all(|(property, expected)| {
        // Engines resolve keywords like `auto` inconsistently; the raw
        // request is accepted in their place.
        if config.is_css_passthrough(expected)
            && query.inline_style(node, property).as_deref() == Some(expected.as_str())
        {
            return true;
        }
        query.css(node, property).as_deref() == Some(expected.as_str())
    })
}

fn collection_text<Q: ElementQuery>(
    query: &Q,
    target: &ElementCollection<Q::Node>,
    config: &ShouldConfig,
) -> String {
    let text: String = target.iter().map(|node| query.text(node)).collect();
    if config.trim_text {
        text.trim().to_string()
    } else {
        text
    }
}

fn css_json(css: &BTreeMap<String, String>) -> Value {
    Value::Object(
        css.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
