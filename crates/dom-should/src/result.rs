//! Result and error types for dom-should.
//!
//! A failing matcher is not an error: it is an [`AssertionResult`](crate::AssertionResult)
//! with `passed == false`. The variants below cover the faults that are allowed
//! to escape a matcher evaluation (malformed markup, a broken selector) and the
//! framework-level misuse of the registry.

use thiserror::Error;

/// Result type for dom-should operations
pub type ShouldResult<T> = Result<T, ShouldError>;

/// Errors that can occur while registering or evaluating matchers
#[derive(Debug, Error)]
pub enum ShouldError {
    /// Markup handed to the renderer could not be parsed
    #[error("Malformed markup: {message}")]
    MalformedMarkup {
        /// Error message
        message: String,
    },

    /// Selector could not be parsed by the query engine
    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector {
        /// Offending selector
        selector: String,
        /// Error message
        message: String,
    },

    /// No matcher is registered under this name
    #[error("Unknown matcher: {name}")]
    UnknownMatcher {
        /// Requested matcher name
        name: String,
    },

    /// A matcher with this name is already registered
    #[error("Matcher already registered: {name}")]
    DuplicateMatcher {
        /// Matcher name
        name: String,
    },

    /// Matcher invoked with the wrong number of arguments
    #[error("Matcher {name} takes {min}..={max} arguments, got {got}")]
    ArityMismatch {
        /// Matcher name
        name: String,
        /// Minimum accepted arguments
        min: usize,
        /// Maximum accepted arguments
        max: usize,
        /// Arguments supplied
        got: usize,
    },

    /// Matcher argument has the wrong kind
    #[error("Invalid argument {index} for {name}: expected {expected}")]
    InvalidArgument {
        /// Matcher name
        name: String,
        /// Zero-based argument position
        index: usize,
        /// Description of the accepted kind
        expected: &'static str,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShouldError {
    /// Shorthand for a [`ShouldError::MalformedMarkup`]
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMarkup {
            message: message.into(),
        }
    }

    /// Shorthand for a [`ShouldError::InvalidSelector`]
    #[must_use]
    pub fn selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }
}
