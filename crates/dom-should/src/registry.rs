//! Named matcher registration.
//!
//! [`catalogue`] lists every matcher with its name, arity and whether it is
//! chainable (takes no arguments). A [`Registrar`] receives the definitions;
//! [`MatcherRegistry`] is the in-crate registrar that builds and evaluates
//! matchers by name from loosely typed [`MatcherArg`]s.

use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

use crate::assertion::{inspect, AssertionContext, AssertionResult};
use crate::config::ShouldConfig;
use crate::matcher::{Matcher, TextExpectation};
use crate::query::{ElementCollection, ElementQuery, HandlerId};
use crate::result::{ShouldError, ShouldResult};

/// Accepted argument count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// Fewest arguments accepted
    pub min: usize,
    /// Most arguments accepted
    pub max: usize,
}

impl Arity {
    /// Exactly `n` arguments
    #[must_use]
    pub const fn exact(n: usize) -> Self {
        Self { min: n, max: n }
    }

    /// Between `min` and `max` arguments, inclusive
    #[must_use]
    pub const fn range(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Whether `count` arguments are accepted
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        count >= self.min && count <= self.max
    }
}

/// A matcher argument before it is checked against the matcher's signature
#[derive(Debug, Clone)]
pub enum MatcherArg {
    /// String argument
    Str(String),
    /// Non-negative integer
    Int(usize),
    /// Arbitrary JSON value
    Value(Value),
    /// Property/value map for `haveCss`
    Css(BTreeMap<String, String>),
    /// Text pattern
    Pattern(Regex),
    /// Handler identity
    Handler(HandlerId),
}

impl From<&str> for MatcherArg {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for MatcherArg {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<usize> for MatcherArg {
    fn from(n: usize) -> Self {
        Self::Int(n)
    }
}

impl From<Value> for MatcherArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<BTreeMap<String, String>> for MatcherArg {
    fn from(css: BTreeMap<String, String>) -> Self {
        Self::Css(css)
    }
}

impl From<Regex> for MatcherArg {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<HandlerId> for MatcherArg {
    fn from(handler: HandlerId) -> Self {
        Self::Handler(handler)
    }
}

/// Builds a matcher from arguments already checked against the arity
pub type BuildFn = fn(&[MatcherArg]) -> ShouldResult<Matcher>;

/// A named matcher as exposed to a registrar
#[derive(Clone, Copy)]
pub struct MatcherDefinition {
    /// Registered name
    pub name: &'static str,
    /// Accepted argument count
    pub arity: Arity,
    /// Takes no arguments and reads as a property
    pub chainable: bool,
    builder: BuildFn,
}

impl MatcherDefinition {
    /// Create a definition
    #[must_use]
    pub const fn new(name: &'static str, arity: Arity, chainable: bool, builder: BuildFn) -> Self {
        Self {
            name,
            arity,
            chainable,
            builder,
        }
    }

    /// Build the matcher from `args`
    ///
    /// # Errors
    ///
    /// [`ShouldError::ArityMismatch`] for a wrong argument count,
    /// [`ShouldError::InvalidArgument`] for a wrongly typed argument
    pub fn build(&self, args: &[MatcherArg]) -> ShouldResult<Matcher> {
        if !self.arity.accepts(args.len()) {
            return Err(ShouldError::ArityMismatch {
                name: self.name.to_string(),
                min: self.arity.min,
                max: self.arity.max,
                got: args.len(),
            });
        }
        (self.builder)(args)
    }
}

impl fmt::Debug for MatcherDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherDefinition")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("chainable", &self.chainable)
            .finish_non_exhaustive()
    }
}

/// Anything that accepts matcher definitions
pub trait Registrar {
    /// Register one definition
    ///
    /// # Errors
    ///
    /// Implementations reject names they already hold
    fn register(&mut self, definition: MatcherDefinition) -> ShouldResult<()>;
}

/// Register the whole catalogue with `registrar`
///
/// # Errors
///
/// Propagates the first registration error
pub fn register_catalogue<R: Registrar + ?Sized>(registrar: &mut R) -> ShouldResult<()> {
    for definition in catalogue() {
        registrar.register(definition)?;
    }
    Ok(())
}

fn invalid(name: &str, index: usize, expected: &'static str) -> ShouldError {
    ShouldError::InvalidArgument {
        name: name.to_string(),
        index,
        expected,
    }
}

fn string_arg(name: &str, args: &[MatcherArg], index: usize) -> ShouldResult<String> {
    match args.get(index) {
        Some(MatcherArg::Str(s)) => Ok(s.clone()),
        _ => Err(invalid(name, index, "string")),
    }
}

fn opt_string_arg(name: &str, args: &[MatcherArg], index: usize) -> ShouldResult<Option<String>> {
    match args.get(index) {
        None => Ok(None),
        Some(MatcherArg::Str(s)) => Ok(Some(s.clone())),
        Some(MatcherArg::Int(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(invalid(name, index, "string")),
    }
}

fn opt_value_arg(args: &[MatcherArg], index: usize, name: &str) -> ShouldResult<Option<Value>> {
    match args.get(index) {
        None => Ok(None),
        Some(MatcherArg::Str(s)) => Ok(Some(Value::String(s.clone()))),
        Some(MatcherArg::Int(n)) => Ok(Some(Value::from(*n))),
        Some(MatcherArg::Value(v)) => Ok(Some(v.clone())),
        Some(_) => Err(invalid(name, index, "value")),
    }
}

fn text_arg(name: &str, args: &[MatcherArg], index: usize) -> ShouldResult<TextExpectation> {
    match args.get(index) {
        Some(MatcherArg::Str(s)) => Ok(TextExpectation::Literal(s.clone())),
        Some(MatcherArg::Pattern(re)) => Ok(TextExpectation::Pattern(re.clone())),
        _ => Err(invalid(name, index, "string or pattern")),
    }
}

/// Every matcher in the catalogue
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn catalogue() -> Vec<MatcherDefinition> {
    let none = Arity::exact(0);
    let one = Arity::exact(1);
    vec![
        MatcherDefinition::new("haveClass", one, false, |args| {
            Ok(Matcher::HaveClass(string_arg("haveClass", args, 0)?))
        }),
        MatcherDefinition::new("haveCss", one, false, |args| match args.first() {
            Some(MatcherArg::Css(css)) => Ok(Matcher::HaveCss(css.clone())),
            _ => Err(invalid("haveCss", 0, "css map")),
        }),
        MatcherDefinition::new("visible", none, true, |_| Ok(Matcher::Visible)),
        MatcherDefinition::new("hidden", none, true, |_| Ok(Matcher::Hidden)),
        MatcherDefinition::new("selected", none, true, |_| Ok(Matcher::Selected)),
        MatcherDefinition::new("checked", none, true, |_| Ok(Matcher::Checked)),
        MatcherDefinition::new("emptyJq", none, true, |_| Ok(Matcher::Empty)),
        MatcherDefinition::new("inDOM", none, true, |_| Ok(Matcher::InDom)),
        MatcherDefinition::new("exist", none, true, |_| Ok(Matcher::Exist)),
        MatcherDefinition::new("haveLength", one, false, |args| match args.first() {
            Some(MatcherArg::Int(n)) => Ok(Matcher::HaveLength(*n)),
            _ => Err(invalid("haveLength", 0, "integer")),
        }),
        MatcherDefinition::new("haveAttr", Arity::range(1, 2), false, |args| {
            Ok(Matcher::HaveAttr {
                name: string_arg("haveAttr", args, 0)?,
                expected: opt_string_arg("haveAttr", args, 1)?,
            })
        }),
        MatcherDefinition::new("haveProp", Arity::range(1, 2), false, |args| {
            Ok(Matcher::HaveProp {
                name: string_arg("haveProp", args, 0)?,
                expected: opt_value_arg(args, 1, "haveProp")?,
            })
        }),
        MatcherDefinition::new("haveId", one, false, |args| {
            Ok(Matcher::HaveId(string_arg("haveId", args, 0)?))
        }),
        MatcherDefinition::new("haveHtml", one, false, |args| {
            Ok(Matcher::HaveHtml(string_arg("haveHtml", args, 0)?))
        }),
        MatcherDefinition::new("containHtml", one, false, |args| {
            Ok(Matcher::ContainHtml(string_arg("containHtml", args, 0)?))
        }),
        MatcherDefinition::new("haveText", one, false, |args| {
            Ok(Matcher::HaveText(text_arg("haveText", args, 0)?))
        }),
        MatcherDefinition::new("containText", one, false, |args| {
            Ok(Matcher::ContainText(text_arg("containText", args, 0)?))
        }),
        MatcherDefinition::new("haveValue", one, false, |args| {
            Ok(Matcher::HaveValue(string_arg("haveValue", args, 0)?))
        }),
        MatcherDefinition::new("haveData", Arity::range(1, 2), false, |args| {
            Ok(Matcher::HaveData {
                key: string_arg("haveData", args, 0)?,
                expected: opt_value_arg(args, 1, "haveData")?,
            })
        }),
        MatcherDefinition::new("containElement", one, false, |args| {
            Ok(Matcher::ContainElement(string_arg("containElement", args, 0)?))
        }),
        MatcherDefinition::new("matchedBy", one, false, |args| {
            Ok(Matcher::MatchedBy(string_arg("matchedBy", args, 0)?))
        }),
        MatcherDefinition::new("disabled", none, true, |_| Ok(Matcher::Disabled)),
        MatcherDefinition::new("focused", none, true, |_| Ok(Matcher::Focused)),
        MatcherDefinition::new("handle", one, false, |args| {
            Ok(Matcher::Handle(string_arg("handle", args, 0)?))
        }),
        MatcherDefinition::new("handleWith", Arity::exact(2), false, |args| {
            let event = string_arg("handleWith", args, 0)?;
            match args.get(1) {
                Some(MatcherArg::Handler(handler)) => Ok(Matcher::HandleWith {
                    event,
                    handler: *handler,
                }),
                _ => Err(invalid("handleWith", 1, "handler")),
            }
        }),
    ]
}

/// Name-indexed matcher definitions
#[derive(Debug, Default)]
pub struct MatcherRegistry {
    definitions: HashMap<&'static str, MatcherDefinition>,
}

impl MatcherRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the whole catalogue
    #[must_use]
    pub fn with_catalogue() -> Self {
        Self {
            definitions: catalogue().into_iter().map(|d| (d.name, d)).collect(),
        }
    }

    /// Look up a definition
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MatcherDefinition> {
        self.definitions.get(name)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.definitions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered matchers
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Build the named matcher
    ///
    /// # Errors
    ///
    /// [`ShouldError::UnknownMatcher`] for an unregistered name, otherwise
    /// whatever [`MatcherDefinition::build`] reports
    pub fn build(&self, name: &str, args: &[MatcherArg]) -> ShouldResult<Matcher> {
        self.get(name)
            .ok_or_else(|| ShouldError::UnknownMatcher {
                name: name.to_string(),
            })?
            .build(args)
    }

    /// Build and evaluate the named matcher against `target`
    ///
    /// # Errors
    ///
    /// Lookup and build errors, plus anything the matcher itself propagates
    pub fn evaluate<Q: ElementQuery>(
        &self,
        name: &str,
        query: &Q,
        target: ElementCollection<Q::Node>,
        args: &[MatcherArg],
        negated: bool,
        config: &ShouldConfig,
    ) -> ShouldResult<AssertionResult> {
        let matcher = self.build(name, args)?;
        let subject = inspect(query, &target, config);
        let mut ctx = AssertionContext::new(target).negated(negated);
        matcher.evaluate(query, &mut ctx, config)?;
        Ok(ctx.finish(&subject))
    }
}

impl Registrar for MatcherRegistry {
    fn register(&mut self, definition: MatcherDefinition) -> ShouldResult<()> {
        if self.definitions.contains_key(definition.name) {
            return Err(ShouldError::DuplicateMatcher {
                name: definition.name.to_string(),
            });
        }
        debug!(matcher = definition.name, "registered matcher");
        self.definitions.insert(definition.name, definition);
        Ok(())
    }
}
