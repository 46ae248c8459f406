//! In-memory document implementing [`ElementQuery`].
//!
//! `Document` is the reference query engine: enough DOM to build fixtures,
//! bind handlers and answer every question the matchers ask, without a
//! browser. Nodes live in an arena owned by the document and are addressed by
//! [`NodeId`].
//!
//! ```
//! use dom_should::dom::Document;
//! use dom_should::ElementQuery;
//!
//! let doc = Document::parse(r#"<p class="lead">Hello</p>"#).unwrap();
//! let lead = doc.resolve("p.lead").unwrap();
//! assert_eq!(lead.len(), 1);
//! assert_eq!(doc.text(lead.first().unwrap()), "Hello");
//! ```

mod html;
mod selector;

use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

use crate::events::EventSpec;
use crate::query::{
    BindingRecord, BindingTable, ElementCollection, ElementQuery, HandlerId, PseudoState,
};
use crate::result::ShouldResult;

/// Handle of a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default)]
struct Element {
    tag_name: String,
    // Source order is kept so serialization reproduces it.
    attrs: Vec<(String, String)>,
    props: BTreeMap<String, Value>,
    data: BTreeMap<String, Value>,
    computed_style: BTreeMap<String, String>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn inline_style(&self, property: &str) -> Option<String> {
        self.attr("style")?
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(property))
            .map(|(_, value)| value.trim().to_string())
    }
}

#[derive(Debug, Clone)]
struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    html: NodeId,
    body: NodeId,
    active: Option<NodeId>,
    handlers: HashMap<NodeId, BindingTable>,
}

impl Dom {
    fn new() -> Self {
        let mut dom = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            html: NodeId(0),
            body: NodeId(0),
            active: None,
            handlers: HashMap::new(),
        };
        dom.html = dom.create_element(Some(dom.root), "html".into(), Vec::new());
        dom.create_element(Some(dom.html), "head".into(), Vec::new());
        dom.body = dom.create_element(Some(dom.html), "body".into(), Vec::new());
        dom
    }

    // Ids from another document may point past the arena.
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag_name.as_str())
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.element(*p).is_some())
    }

    fn element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        self.parent(id)
            .map(|p| {
                self.children(p)
                    .iter()
                    .copied()
                    .filter(|c| self.element(*c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn create_element(
        &mut self,
        parent: Option<NodeId>,
        tag_name: String,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind: NodeKind::Element(Element {
                tag_name,
                attrs,
                ..Element::default()
            }),
        });
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
            parent.children.push(id);
        }
        id
    }

    fn create_text(&mut self, parent: NodeId, text: String) {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind: NodeKind::Text(text),
        });
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id.0).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.retain(|c| *c != id);
        }
    }

    /// Drop every node created at or after `len`, unlinking them from
    /// `parent`, the only pre-existing node they can hang from.
    fn rollback(&mut self, len: usize, parent: Option<NodeId>) {
        self.nodes.truncate(len);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
            parent.children.retain(|c| c.0 < len);
        }
        if self.active.is_some_and(|active| active.0 >= len) {
            self.active = None;
        }
        self.handlers.retain(|node, _| node.0 < len);
    }

    /// Strict descendants of `id` in document order
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    fn contains(&self, root: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            if ancestor == root {
                return true;
            }
            current = self.parent(ancestor);
        }
        false
    }

    fn text_content(&self, id: NodeId) -> String {
        match self.node(id).map(|node| &node.kind) {
            None => return String::new(),
            Some(NodeKind::Text(text)) => return text.clone(),
            Some(_) => {}
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| match self.node(d).map(|node| &node.kind) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn css(&self, id: NodeId, property: &str) -> Option<String> {
        let element = self.element(id)?;
        let property = property.to_ascii_lowercase();
        if let Some(value) = element.computed_style.get(&property) {
            return Some(value.clone());
        }
        if let Some(value) = element.inline_style(&property) {
            return Some(value);
        }
        match property.as_str() {
            "display" => Some(default_display(&element.tag_name).to_string()),
            "opacity" => Some("1".to_string()),
            "visibility" => Some("visible".to_string()),
            _ => None,
        }
    }

    fn flag(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|element| {
            element
                .props
                .get(name)
                .and_then(Value::as_bool)
                .unwrap_or_else(|| element.attr(name).is_some())
        })
    }

    fn is_form_control(&self, id: NodeId) -> bool {
        matches!(
            self.tag_name(id),
            Some("button" | "input" | "select" | "textarea" | "option" | "optgroup" | "fieldset")
        )
    }

    fn is_rendered(&self, id: NodeId) -> bool {
        if id != self.html && !self.contains(self.html, id) {
            return false;
        }
        if self.tag_name(id) == Some("input")
            && self
                .element(id)
                .and_then(|e| e.attr("type"))
                .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        {
            return false;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if self.element(node).is_some_and(|e| e.attr("hidden").is_some())
                || self.css(node, "display").as_deref() == Some("none")
            {
                return false;
            }
            current = self.parent_element(node);
        }
        true
    }

    fn is_state(&self, id: NodeId, state: PseudoState) -> bool {
        if self.element(id).is_none() {
            return false;
        }
        match state {
            PseudoState::Visible => self.is_rendered(id),
            PseudoState::Hidden => !self.is_rendered(id),
            PseudoState::Selected => self.tag_name(id) == Some("option") && self.flag(id, "selected"),
            PseudoState::Checked => match self.tag_name(id) {
                Some("input") => self.flag(id, "checked"),
                Some("option") => self.flag(id, "selected"),
                _ => false,
            },
            PseudoState::Disabled => self.is_form_control(id) && self.flag(id, "disabled"),
            PseudoState::Empty => self.children(id).is_empty(),
        }
    }

    fn val(&self, id: NodeId) -> Option<String> {
        let element = self.element(id)?;
        if let Some(value) = element.props.get("value") {
            return Some(value_to_string(value));
        }
        match element.tag_name.as_str() {
            "input" => Some(element.attr("value").unwrap_or_default().to_string()),
            "textarea" => Some(self.text_content(id)),
            "option" => Some(
                element
                    .attr("value")
                    .map_or_else(|| self.text_content(id).trim().to_string(), ToOwned::to_owned),
            ),
            "select" => {
                let options: Vec<NodeId> = self
                    .descendants(id)
                    .into_iter()
                    .filter(|d| self.tag_name(*d) == Some("option"))
                    .collect();
                let chosen = options
                    .iter()
                    .copied()
                    .find(|o| self.flag(*o, "selected"))
                    .or_else(|| options.first().copied())?;
                self.val(chosen)
            }
            _ => None,
        }
    }

    fn prop(&self, id: NodeId, name: &str) -> Option<Value> {
        let element = self.element(id)?;
        if let Some(value) = element.props.get(name) {
            return Some(value.clone());
        }
        match name {
            "checked" | "selected" | "disabled" | "hidden" | "readonly" | "required" => {
                Some(Value::Bool(element.attr(name).is_some()))
            }
            "id" => Some(Value::String(element.attr("id").unwrap_or_default().into())),
            "className" => Some(Value::String(element.attr("class").unwrap_or_default().into())),
            "tagName" | "nodeName" => Some(Value::String(element.tag_name.to_ascii_uppercase())),
            "value" => self.val(id).map(Value::String),
            _ => None,
        }
    }

    fn data(&self, id: NodeId, key: &str) -> Option<Value> {
        let element = self.element(id)?;
        if let Some(value) = element.data.get(key) {
            return Some(value.clone());
        }
        element
            .attr(&format!("data-{}", kebab_case(key)))
            .map(parse_data_value)
    }
}

fn default_display(tag: &str) -> &'static str {
    match tag {
        "html" | "body" | "div" | "p" | "ul" | "ol" | "form" | "section" | "article"
        | "header" | "footer" | "nav" | "main" | "aside" | "h1" | "h2" | "h3" | "h4" | "h5"
        | "h6" | "pre" | "blockquote" | "fieldset" | "table" => "block",
        "li" => "list-item",
        "head" | "script" | "style" | "template" => "none",
        _ => "inline",
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convert a `data-*` attribute string the way engines do: booleans, null,
/// numbers that survive a round trip, and JSON objects/arrays are decoded.
fn parse_data_value(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        if int.to_string() == raw {
            return Value::from(int);
        }
    }
    if let Ok(float) = raw.parse::<f64>() {
        if float.is_finite() && float.to_string() == raw {
            return Value::from(float);
        }
    }
    if raw.starts_with('{') || raw.starts_with('[') {
        if let Ok(value) = serde_json::from_str(raw) {
            return value;
        }
    }
    Value::String(raw.to_string())
}

/// In-memory document.
///
/// Fixture setters take `&self`: the arena sits behind a `RefCell`, which also
/// keeps the document on one thread.
#[derive(Debug)]
pub struct Document {
    dom: RefCell<Dom>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document (`<html><head></head><body></body></html>`)
    #[must_use]
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(Dom::new()),
        }
    }

    /// Create a document whose body holds `html`
    ///
    /// # Errors
    ///
    /// Returns [`ShouldError::MalformedMarkup`](crate::ShouldError::MalformedMarkup)
    /// if the markup cannot be parsed
    pub fn parse(html: &str) -> ShouldResult<Self> {
        let doc = Self::new();
        doc.append_html(&doc.body(), html)?;
        Ok(doc)
    }

    /// The `<body>` element
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.dom.borrow().body
    }

    /// The `<html>` element
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.dom.borrow().html
    }

    /// Parse `html` and append it to `parent`. Nothing is appended when the
    /// markup is rejected or `parent` belongs to another document.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be parsed
    pub fn append_html(&self, parent: &NodeId, html: &str) -> ShouldResult<()> {
        let mut dom = self.dom.borrow_mut();
        if dom.node(*parent).is_none() {
            return Ok(());
        }
        let len = dom.nodes.len();
        if let Err(err) = html::parse_into(&mut dom, *parent, html) {
            dom.rollback(len, Some(*parent));
            return Err(err);
        }
        Ok(())
    }

    /// Parse `html` into a container that is not attached to the document
    /// and return its top-level elements
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be parsed
    pub fn create_detached(&self, html: &str) -> ShouldResult<ElementCollection<NodeId>> {
        let container = self.render_fragment(html)?;
        let dom = self.dom.borrow();
        let nodes = container
            .first()
            .map(|c| {
                dom.children(*c)
                    .iter()
                    .copied()
                    .filter(|n| dom.element(*n).is_some())
                    .collect()
            })
            .unwrap_or_default();
        Ok(ElementCollection::new(nodes))
    }

    /// Remove `node` from its parent
    pub fn detach(&self, node: &NodeId) {
        self.dom.borrow_mut().detach(*node);
    }

    /// Set or replace an attribute
    pub fn set_attr(&self, node: &NodeId, name: &str, value: &str) {
        if let Some(element) = self.dom.borrow_mut().element_mut(*node) {
            let name = name.to_ascii_lowercase();
            match element.attrs.iter_mut().find(|(key, _)| *key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => element.attrs.push((name, value.to_string())),
            }
        }
    }

    /// Remove an attribute
    pub fn remove_attr(&self, node: &NodeId, name: &str) {
        if let Some(element) = self.dom.borrow_mut().element_mut(*node) {
            element.attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        }
    }

    /// Set a DOM property, shadowing any attribute-derived value
    pub fn set_prop(&self, node: &NodeId, name: &str, value: impl Into<Value>) {
        if let Some(element) = self.dom.borrow_mut().element_mut(*node) {
            element.props.insert(name.to_string(), value.into());
        }
    }

    /// Store a data value, shadowing any `data-*` attribute
    pub fn set_data(&self, node: &NodeId, key: &str, value: impl Into<Value>) {
        if let Some(element) = self.dom.borrow_mut().element_mut(*node) {
            element.data.insert(key.to_string(), value.into());
        }
    }

    /// Override the computed value of a CSS property, as a layout engine
    /// would resolve it
    pub fn set_computed_style(&self, node: &NodeId, property: &str, value: &str) {
        if let Some(element) = self.dom.borrow_mut().element_mut(*node) {
            element
                .computed_style
                .insert(property.to_ascii_lowercase(), value.to_string());
        }
    }

    /// Focus `node`
    pub fn focus(&self, node: &NodeId) {
        let mut dom = self.dom.borrow_mut();
        if dom.element(*node).is_some() {
            dom.active = Some(*node);
        }
    }

    /// Clear focus
    pub fn blur(&self) {
        self.dom.borrow_mut().active = None;
    }

    /// Bind a fresh handler under `binding` (`type[.tag]*`) and return its identity
    pub fn bind(&self, node: &NodeId, binding: &str) -> HandlerId {
        let handler = HandlerId::new();
        self.bind_handler(node, binding, handler);
        handler
    }

    /// Bind an existing handler identity under `binding`
    pub fn bind_handler(&self, node: &NodeId, binding: &str, handler: HandlerId) {
        let record = BindingRecord::parse(binding, handler);
        trace!(node = node.0, binding, "binding handler");
        self.dom
            .borrow_mut()
            .handlers
            .entry(*node)
            .or_default()
            .entry(record.event_type.clone())
            .or_default()
            .push(record);
    }

    /// Remove handlers bound under at least the tags in `binding`
    pub fn unbind(&self, node: &NodeId, binding: &str) {
        let Some(spec) = EventSpec::parse(binding) else {
            return;
        };
        let mut dom = self.dom.borrow_mut();
        let Some(table) = dom.handlers.get_mut(node) else {
            return;
        };
        if let Some(records) = table.get_mut(spec.event_type()) {
            records.retain(|record| !spec.matches(record));
            if records.is_empty() {
                table.remove(spec.event_type());
            }
        }
    }

    fn collect_matching(
        &self,
        candidates: impl IntoIterator<Item = NodeId>,
        selector: &str,
    ) -> ShouldResult<Vec<NodeId>> {
        let list = selector::parse(selector)?;
        let dom = self.dom.borrow();
        let mut out: Vec<NodeId> = Vec::new();
        for node in candidates {
            if dom.matches_selector(node, &list) && !out.contains(&node) {
                out.push(node);
            }
        }
        Ok(out)
    }
}

impl ElementQuery for Document {
    type Node = NodeId;

    fn resolve(&self, selector: &str) -> ShouldResult<ElementCollection<NodeId>> {
        let candidates = {
            let dom = self.dom.borrow();
            dom.descendants(dom.root)
        };
        let nodes = self.collect_matching(candidates, selector)?;
        Ok(ElementCollection::new(nodes).with_selector(selector))
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.dom
            .borrow()
            .element(*node)
            .is_some_and(|e| e.has_class(class))
    }

    fn css(&self, node: &NodeId, property: &str) -> Option<String> {
        self.dom.borrow().css(*node, property)
    }

    fn inline_style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.dom
            .borrow()
            .element(*node)
            .and_then(|e| e.inline_style(property))
    }

    fn is(&self, node: &NodeId, state: PseudoState) -> bool {
        self.dom.borrow().is_state(*node, state)
    }

    fn attr(&self, node: &NodeId, name: &str) -> Option<String> {
        self.dom
            .borrow()
            .element(*node)
            .and_then(|e| e.attr(&name.to_ascii_lowercase()).map(ToOwned::to_owned))
    }

    fn prop(&self, node: &NodeId, name: &str) -> Option<Value> {
        self.dom.borrow().prop(*node, name)
    }

    fn data(&self, node: &NodeId, key: &str) -> Option<Value> {
        self.dom.borrow().data(*node, key)
    }

    fn val(&self, node: &NodeId) -> Option<String> {
        self.dom.borrow().val(*node)
    }

    fn find(&self, nodes: &[NodeId], selector: &str) -> ShouldResult<ElementCollection<NodeId>> {
        let candidates: Vec<NodeId> = {
            let dom = self.dom.borrow();
            nodes.iter().flat_map(|n| dom.descendants(*n)).collect()
        };
        Ok(ElementCollection::new(self.collect_matching(candidates, selector)?))
    }

    fn filter(
        &self,
        nodes: &[NodeId],
        selector: &str,
    ) -> ShouldResult<ElementCollection<NodeId>> {
        Ok(ElementCollection::new(
            self.collect_matching(nodes.iter().copied(), selector)?,
        ))
    }

    fn html(&self, node: &NodeId) -> String {
        html::serialize_children(&self.dom.borrow(), *node)
    }

    fn outer_html(&self, node: &NodeId) -> String {
        html::serialize_node(&self.dom.borrow(), *node)
    }

    fn text(&self, node: &NodeId) -> String {
        self.dom.borrow().text_content(*node)
    }

    fn document_element(&self, _node: &NodeId) -> Option<NodeId> {
        Some(self.dom.borrow().html)
    }

    fn contains(&self, root: &NodeId, node: &NodeId) -> bool {
        self.dom.borrow().contains(*root, *node)
    }

    fn active_element(&self, _node: &NodeId) -> Option<NodeId> {
        let dom = self.dom.borrow();
        Some(dom.active.unwrap_or(dom.body))
    }

    fn render_fragment(&self, html: &str) -> ShouldResult<ElementCollection<NodeId>> {
        let mut dom = self.dom.borrow_mut();
        let len = dom.nodes.len();
        let container = dom.create_element(None, "div".into(), Vec::new());
        if let Err(err) = html::parse_into(&mut dom, container, html) {
            dom.rollback(len, None);
            return Err(err);
        }
        Ok(ElementCollection::single(container))
    }

    fn release_fragment(&self, fragment: &ElementCollection<NodeId>) {
        let Some(container) = fragment.first() else {
            return;
        };
        let mut dom = self.dom.borrow_mut();
        let detached = dom.node(*container).is_some_and(|node| node.parent.is_none());
        // Only a fragment that is still the arena's tail can be reclaimed.
        let is_tail = dom.descendants(*container).len() + 1 + container.0 == dom.nodes.len();
        if detached && is_tail {
            trace!(nodes = dom.nodes.len() - container.0, "released fragment");
            dom.rollback(container.0, None);
        }
    }

    fn serialize_html(&self, collection: &ElementCollection<NodeId>) -> String {
        collection
            .first()
            .map(|node| self.html(node))
            .unwrap_or_default()
    }

    fn handler_table(&self, node: &NodeId) -> Option<BindingTable> {
        self.dom.borrow().handlers.get(node).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn first(doc: &Document, selector: &str) -> NodeId {
        *doc.resolve(selector).unwrap().first().unwrap()
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_resolve_document_order() {
            let doc = Document::parse("<ul><li id=a></li><li id=b><li id=c></li></li></ul>")
                .unwrap();
            let items = doc.resolve("li").unwrap();
            let ids: Vec<_> = items.iter().map(|n| doc.attr(n, "id").unwrap()).collect();
            assert_eq!(ids, vec!["a", "b", "c"]);
            assert_eq!(items.selector(), Some("li"));
        }

        #[test]
        fn test_descendant_and_child() {
            let doc = Document::parse(
                r#"<div class="menu"><ul><li><a href="/x">x</a></li></ul></div>"#,
            )
            .unwrap();
            assert_eq!(doc.resolve(".menu a").unwrap().len(), 1);
            assert_eq!(doc.resolve(".menu > a").unwrap().len(), 0);
            assert_eq!(doc.resolve("li > a[href^='/']").unwrap().len(), 1);
        }

        #[test]
        fn test_find_and_filter() {
            let doc = Document::parse(
                r#"<div id="outer"><p class="x"></p><span class="x"></span></div><p></p>"#,
            )
            .unwrap();
            let outer = doc.resolve("#outer").unwrap();
            assert_eq!(doc.find(outer.nodes(), "p").unwrap().len(), 1);
            let all_x = doc.resolve(".x").unwrap();
            assert_eq!(doc.filter(all_x.nodes(), "span").unwrap().len(), 1);
        }

        #[test]
        fn test_invalid_selector() {
            let doc = Document::new();
            assert!(doc.resolve("div[").is_err());
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_visibility() {
            let doc = Document::parse(
                r#"<div id="shown"></div><div style="display: none"><p id="inner"></p></div><div id="flag" hidden></div><input id="h" type="hidden">"#,
            )
            .unwrap();
            assert!(doc.is(&first(&doc, "#shown"), PseudoState::Visible));
            assert!(doc.is(&first(&doc, "#inner"), PseudoState::Hidden));
            assert!(doc.is(&first(&doc, "#flag"), PseudoState::Hidden));
            assert!(doc.is(&first(&doc, "#h"), PseudoState::Hidden));
        }

        #[test]
        fn test_detached_is_hidden() {
            let doc = Document::parse(r#"<div id="gone"></div>"#).unwrap();
            let gone = first(&doc, "#gone");
            doc.detach(&gone);
            assert!(doc.is(&gone, PseudoState::Hidden));
            assert!(!doc.contains(&doc.root(), &gone));
        }

        #[test]
        fn test_form_states() {
            let doc = Document::parse(
                r#"<input id="c" type="checkbox" checked><button id="b" disabled></button><select><option id="o1">a</option><option id="o2" selected>b</option></select>"#,
            )
            .unwrap();
            assert!(doc.is(&first(&doc, "#c"), PseudoState::Checked));
            assert!(doc.is(&first(&doc, "#b"), PseudoState::Disabled));
            assert!(doc.is(&first(&doc, "#o2"), PseudoState::Selected));
            assert!(!doc.is(&first(&doc, "#o1"), PseudoState::Selected));
            assert_eq!(doc.val(&first(&doc, "select")), Some("b".to_string()));
        }

        #[test]
        fn test_prop_shadows_attr() {
            let doc = Document::parse(r#"<input id="c" type="checkbox" checked>"#).unwrap();
            let c = first(&doc, "#c");
            doc.set_prop(&c, "checked", false);
            assert!(!doc.is(&c, PseudoState::Checked));
            assert_eq!(doc.prop(&c, "checked"), Some(json!(false)));
        }

        #[test]
        fn test_empty() {
            let doc = Document::parse(r#"<p id="e"></p><p id="t"> </p>"#).unwrap();
            assert!(doc.is(&first(&doc, "#e"), PseudoState::Empty));
            assert!(!doc.is(&first(&doc, "#t"), PseudoState::Empty));
        }

        #[test]
        fn test_focus() {
            let doc = Document::parse(r#"<input id="i">"#).unwrap();
            let input = first(&doc, "#i");
            assert_eq!(doc.active_element(&input), Some(doc.body()));
            doc.focus(&input);
            assert_eq!(doc.active_element(&input), Some(input));
            assert_eq!(doc.resolve(":focus").unwrap().len(), 1);
            doc.blur();
            assert_eq!(doc.resolve(":focus").unwrap().len(), 0);
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_css_sources() {
            let doc = Document::parse(r#"<div id="d" style="Opacity: 0.5; width:10px"></div>"#)
                .unwrap();
            let d = first(&doc, "#d");
            assert_eq!(doc.css(&d, "opacity"), Some("0.5".to_string()));
            assert_eq!(doc.css(&d, "display"), Some("block".to_string()));
            doc.set_computed_style(&d, "width", "12px");
            assert_eq!(doc.css(&d, "width"), Some("12px".to_string()));
            assert_eq!(doc.inline_style(&d, "width"), Some("10px".to_string()));
        }

        #[test]
        fn test_data_parsing() {
            let doc = Document::parse(
                r#"<div id="d" data-count="42" data-ratio="1.5" data-flag="true" data-cfg='{"a":1}' data-user-name="ann" data-zip="007"></div>"#,
            )
            .unwrap();
            let d = first(&doc, "#d");
            assert_eq!(doc.data(&d, "count"), Some(json!(42)));
            assert_eq!(doc.data(&d, "ratio"), Some(json!(1.5)));
            assert_eq!(doc.data(&d, "flag"), Some(json!(true)));
            assert_eq!(doc.data(&d, "cfg"), Some(json!({"a": 1})));
            assert_eq!(doc.data(&d, "userName"), Some(json!("ann")));
            assert_eq!(doc.data(&d, "zip"), Some(json!("007")));
            assert_eq!(doc.data(&d, "missing"), None);
        }

        #[test]
        fn test_data_unparseable_json_is_text() {
            let doc =
                Document::parse(r#"<div id="d" data-cfg='{"a":' data-list="[1,"></div>"#).unwrap();
            let d = first(&doc, "#d");
            assert_eq!(doc.data(&d, "cfg"), Some(json!(r#"{"a":"#)));
            assert_eq!(doc.data(&d, "list"), Some(json!("[1,")));
        }

        #[test]
        fn test_text_and_html() {
            let doc = Document::parse(r#"<div id="d"> <b>Hi</b> there </div>"#).unwrap();
            let d = first(&doc, "#d");
            assert_eq!(doc.text(&d), " Hi there ");
            assert_eq!(doc.html(&d), " <b>Hi</b> there ");
            assert_eq!(doc.outer_html(&d), r#"<div id="d"> <b>Hi</b> there </div>"#);
        }
    }

    mod handler_tests {
        use super::*;

        #[test]
        fn test_bind_and_table() {
            let doc = Document::parse("<a></a>").unwrap();
            let a = first(&doc, "a");
            assert!(doc.handler_table(&a).is_none());
            let id = doc.bind(&a, "click.x");
            let table = doc.handler_table(&a).unwrap();
            assert_eq!(table["click"].len(), 1);
            assert_eq!(table["click"][0].handler, id);
        }

        #[test]
        fn test_unbind_by_namespace() {
            let doc = Document::parse("<a></a>").unwrap();
            let a = first(&doc, "a");
            doc.bind(&a, "click.x");
            doc.bind(&a, "click.y");
            doc.unbind(&a, "click.x");
            let table = doc.handler_table(&a).unwrap();
            assert_eq!(table["click"].len(), 1);
            assert_eq!(table["click"][0].namespace, vec!["y"]);
        }
    }

    #[test]
    fn test_render_fragment_is_detached() {
        let doc = Document::new();
        let fragment = doc.render_fragment("<P>x</P>").unwrap();
        assert_eq!(doc.serialize_html(&fragment), "<p>x</p>");
        assert!(!doc.contains(&doc.root(), fragment.first().unwrap()));
    }

    #[test]
    fn test_create_detached() {
        let doc = Document::new();
        let nodes = doc.create_detached("<i></i>text<b></b>").unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(doc.is(nodes.first().unwrap(), PseudoState::Hidden));
    }

    mod arena_tests {
        use super::*;
        use crate::should::Should;
        use crate::{normalize, should};

        fn arena_len(doc: &Document) -> usize {
            doc.dom.borrow().nodes.len()
        }

        #[test]
        fn test_repeated_html_matchers_reuse_arena() {
            let doc = Document::parse("<div><b>x</b></div>").unwrap();
            let before = arena_len(&doc);
            let div = should(&doc, "div").unwrap();
            for _ in 0..100 {
                assert!(div.have_html("<b>x</b>").unwrap().passed);
                assert!(div.contain_html("<B>x</B>").unwrap().passed);
            }
            assert_eq!(arena_len(&doc), before);
        }

        #[test]
        fn test_rejected_fragment_leaves_no_nodes() {
            let doc = Document::parse("<p></p>").unwrap();
            let before = arena_len(&doc);
            assert!(normalize(&doc, "<i>a</i><b title='open>").is_err());
            assert_eq!(arena_len(&doc), before);
        }

        #[test]
        fn test_rejected_append_rolls_back() {
            let doc = Document::parse("<p>a</p>").unwrap();
            let before = arena_len(&doc);
            let body = doc.body();
            assert!(doc.append_html(&body, "<i>x</i><span class='x>").is_err());
            assert_eq!(arena_len(&doc), before);
            assert_eq!(doc.html(&body), "<p>a</p>");
            assert_eq!(doc.resolve("i").unwrap().len(), 0);
        }

        #[test]
        fn test_released_fragment_drops_handlers() {
            let doc = Document::new();
            let fragment = doc.render_fragment("<i></i>").unwrap();
            doc.bind(fragment.first().unwrap(), "click");
            doc.release_fragment(&fragment);

            let reused = doc.render_fragment("<i></i>").unwrap();
            assert_eq!(reused.first(), fragment.first());
            assert!(doc.handler_table(reused.first().unwrap()).is_none());
        }

        #[test]
        fn test_detached_fragments_are_kept() {
            let doc = Document::new();
            let nodes = doc.create_detached("<i></i>").unwrap();
            normalize(&doc, "<b></b>").unwrap();
            assert_eq!(doc.outer_html(nodes.first().unwrap()), "<i></i>");
        }

        #[test]
        fn test_foreign_node_ids_degrade() {
            let small = Document::new();
            let big = Document::parse("<div><p>x</p><p>y</p></div>").unwrap();
            let foreign = big.resolve("p").unwrap();
            let expectation = Should::new(&small, foreign.clone());

            assert!(!expectation.have_text("x").passed);
            assert!(!expectation.be_visible().passed);
            assert!(!expectation.be_in_dom().passed);
            assert!(!expectation.have_html("x").unwrap().passed);
            assert!(!expectation.contain_element("b").unwrap().passed);

            let node = foreign.first().unwrap();
            small.focus(node);
            assert!(!expectation.be_focused().passed);
            small.detach(node);
            assert!(small.append_html(node, "<i></i>").is_ok());
            assert_eq!(small.outer_html(node), "");
        }
    }
}
