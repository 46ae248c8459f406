//! Element query abstraction.
//!
//! The matchers never walk a DOM themselves. Everything they know about the
//! rendered tree comes through [`ElementQuery`], which a browser driver, a
//! headless engine or the in-memory [`Document`](crate::dom::Document)
//! implements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::result::ShouldResult;

/// Ordered result of a selector query.
///
/// The order is whatever the query engine produced; nothing in this crate
/// reorders or mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementCollection<N> {
    nodes: Vec<N>,
    selector: Option<String>,
}

impl<N> ElementCollection<N> {
    /// Create a collection with no originating selector
    #[must_use]
    pub fn new(nodes: Vec<N>) -> Self {
        Self {
            nodes,
            selector: None,
        }
    }

    /// Create an empty collection
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Create a collection holding a single element
    #[must_use]
    pub fn single(node: N) -> Self {
        Self::new(vec![node])
    }

    /// Tag the collection with the selector that produced it
    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Selector that produced this collection, if any
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the collection holds no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First element, the one singular matchers inspect
    #[must_use]
    pub fn first(&self) -> Option<&N> {
        self.nodes.first()
    }

    /// Element at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&N> {
        self.nodes.get(index)
    }

    /// Elements in query order
    #[must_use]
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Iterate over the elements in query order
    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }
}

impl<N> From<Vec<N>> for ElementCollection<N> {
    fn from(nodes: Vec<N>) -> Self {
        Self::new(nodes)
    }
}

/// Pseudo-state predicates the query engine evaluates (`:visible`, `:checked`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PseudoState {
    /// `:visible`
    Visible,
    /// `:hidden`
    Hidden,
    /// `:selected`
    Selected,
    /// `:checked`
    Checked,
    /// `:disabled`
    Disabled,
    /// `:empty`
    Empty,
}

impl PseudoState {
    /// Selector spelling of the state
    #[must_use]
    pub const fn as_selector(self) -> &'static str {
        match self {
            Self::Visible => ":visible",
            Self::Hidden => ":hidden",
            Self::Selected => ":selected",
            Self::Checked => ":checked",
            Self::Disabled => ":disabled",
            Self::Empty => ":empty",
        }
    }
}

impl fmt::Display for PseudoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_selector())
    }
}

/// Opaque identity of a bound event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerId(Uuid);

impl HandlerId {
    /// Allocate a fresh handler identity
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandlerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler:{}", self.0)
    }
}

/// One currently attached event handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRecord {
    /// Event type (`click`, `keyup`, ...)
    pub event_type: String,
    /// Namespace tags in the order they were bound
    pub namespace: Vec<String>,
    /// Identity of the bound handler
    pub handler: HandlerId,
}

impl BindingRecord {
    /// Build a record from a binding string such as `click.menu.open`
    #[must_use]
    pub fn parse(binding: &str, handler: HandlerId) -> Self {
        let mut parts = binding.split('.');
        let event_type = parts.next().unwrap_or_default().to_string();
        let namespace = parts
            .filter(|tag| !tag.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Self {
            event_type,
            namespace,
            handler,
        }
    }

    /// Namespace tags joined with dots, as engines usually expose them
    #[must_use]
    pub fn namespace_string(&self) -> String {
        self.namespace.join(".")
    }
}

/// Live handler table of one element, keyed by event type.
pub type BindingTable = BTreeMap<String, Vec<BindingRecord>>;

/// Read-only view of a rendered document.
///
/// Implementations answer against live state; callers must not cache the
/// answers across evaluations.
pub trait ElementQuery {
    /// Element handle
    type Node: Clone + PartialEq + fmt::Debug;

    /// Run a selector against the whole document
    fn resolve(&self, selector: &str) -> ShouldResult<ElementCollection<Self::Node>>;

    /// Whether `node` carries the class token
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Computed value of a CSS property
    fn css(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Raw inline style value, before the engine resolves it
    fn inline_style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Evaluate a pseudo-state predicate
    fn is(&self, node: &Self::Node, state: PseudoState) -> bool;

    /// Attribute value
    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// DOM property value
    fn prop(&self, node: &Self::Node, name: &str) -> Option<serde_json::Value>;

    /// Data value (`data-*` attributes and stored data)
    fn data(&self, node: &Self::Node, key: &str) -> Option<serde_json::Value>;

    /// Form control value
    fn val(&self, node: &Self::Node) -> Option<String>;

    /// Descendants of `nodes` matching `selector`
    fn find(
        &self,
        nodes: &[Self::Node],
        selector: &str,
    ) -> ShouldResult<ElementCollection<Self::Node>>;

    /// Members of `nodes` matching `selector`
    fn filter(
        &self,
        nodes: &[Self::Node],
        selector: &str,
    ) -> ShouldResult<ElementCollection<Self::Node>>;

    /// Serialized inner markup
    fn html(&self, node: &Self::Node) -> String;

    /// Serialized outer markup
    fn outer_html(&self, node: &Self::Node) -> String;

    /// Rendered text content
    fn text(&self, node: &Self::Node) -> String;

    /// Root element of the document that owns `node`
    fn document_element(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Whether `node` is a strict descendant of `root`
    fn contains(&self, root: &Self::Node, node: &Self::Node) -> bool;

    /// Focused element of the document that owns `node`
    fn active_element(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Render `html` into a detached container and return the container
    fn render_fragment(&self, html: &str) -> ShouldResult<ElementCollection<Self::Node>>;

    /// Inner markup of the first element of `collection`
    fn serialize_html(&self, collection: &ElementCollection<Self::Node>) -> String;

    /// Discard a container returned by [`render_fragment`](Self::render_fragment)
    /// once it has been read. Engines that do not retain fragments keep the
    /// default no-op.
    fn release_fragment(&self, _fragment: &ElementCollection<Self::Node>) {}

    /// Live handler table of `node`, `None` when nothing was ever bound
    fn handler_table(&self, node: &Self::Node) -> Option<BindingTable>;
}
