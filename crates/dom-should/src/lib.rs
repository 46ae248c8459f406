//! dom-should: element matchers for DOM assertions
//!
//! A catalogue of named matchers (`haveClass`, `visible`, `haveHtml`,
//! `handle`, ...) evaluated against element collections produced by any
//! query engine that implements [`ElementQuery`]. Failures read
//! `expected <inspected collection> [not ]<description>`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    dom-should Architecture                      │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ should()   │    │ Matcher    │    │ Element    │            │
//! │   │ Registry   │───►│ evaluate   │───►│ Query      │            │
//! │   │            │    │ (verdict)  │    │ (Document) │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                 │                                     │
//! │         ▼                 ▼                                     │
//! │   AssertionResult   normalize / events                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```
//! use dom_should::prelude::*;
//!
//! let doc = Document::parse(r#"<div class="foo bar"></div>"#).unwrap();
//! assert!(should(&doc, "div").unwrap().have_class("bar").passed);
//!
//! let miss = should(&doc, "div").unwrap().have_class("baz");
//! assert!(miss.message.ends_with("to have class baz"));
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod assertion;
mod config;
/// In-memory document implementing [`ElementQuery`]
pub mod dom;
/// Event-handler lookup with namespace matching
pub mod events;
mod matcher;
mod normalize;
mod query;
/// Named matcher registration
pub mod registry;
mod result;
mod should;

pub use assertion::{
    inspect, AssertionContext, AssertionFailure, AssertionMode, AssertionResult,
    AssertionSummary, SoftAssertionError, SoftExpectations,
};
pub use config::{ShouldConfig, DEFAULT_MAX_INSPECT_ELEMENTS};
pub use events::{has_handler, has_handler_equal_to, namespace_covers, EventSpec};
pub use matcher::{Matcher, TextExpectation};
pub use normalize::normalize;
pub use query::{
    BindingRecord, BindingTable, ElementCollection, ElementQuery, HandlerId, PseudoState,
};
pub use registry::{
    catalogue, register_catalogue, Arity, MatcherArg, MatcherDefinition, MatcherRegistry,
    Registrar,
};
pub use result::{ShouldError, ShouldResult};
pub use should::{should, Should};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    pub use super::config::*;
    pub use super::dom::{Document, NodeId};
    pub use super::matcher::*;
    pub use super::query::*;
    pub use super::registry::{MatcherArg, MatcherRegistry};
    pub use super::result::*;
    pub use super::should::*;
}
