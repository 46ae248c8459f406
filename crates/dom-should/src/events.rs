//! Event-binding inspection.
//!
//! An event string such as `click.menu.open` names an event type (`click`)
//! and a set of namespace tags (`menu`, `open`). A handler matches when it is
//! bound to that event type under at least those tags. Tag order is
//! irrelevant on both sides and the handler may carry extra tags.

use tracing::trace;

use crate::query::{BindingRecord, ElementCollection, ElementQuery, HandlerId};

/// Parsed event query: event type plus the requested namespace tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    event_type: String,
    namespaces: Vec<String>,
}

impl EventSpec {
    /// Parse `type[.tag]*`.
    ///
    /// Returns `None` when there is no event type to test against. Empty tags
    /// (`click..a`, `click.`) are dropped, so `click.` asks for any `click`
    /// handler. The tag list is kept sorted and deduplicated, which makes it
    /// the canonical form of the requested set.
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts = spec.split('.');
        let event_type = parts.next().filter(|t| !t.is_empty())?.to_string();
        let mut namespaces: Vec<String> = parts
            .filter(|tag| !tag.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        namespaces.sort_unstable();
        namespaces.dedup();
        Some(Self {
            event_type,
            namespaces,
        })
    }

    /// Event type (text before the first dot)
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Requested namespace tags, sorted
    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Whether `record` is bound under every requested tag.
    ///
    /// The event type is not compared here; callers look records up by type.
    #[must_use]
    pub fn matches(&self, record: &BindingRecord) -> bool {
        namespace_covers(&record.namespace, &self.namespaces)
    }
}

/// Whether the `bound` tags include every tag in `requested`.
///
/// `requested` must be sorted and deduplicated, as produced by
/// [`EventSpec::parse`].
#[must_use]
pub fn namespace_covers(bound: &[String], requested: &[String]) -> bool {
    if requested.is_empty() {
        return true;
    }
    let mut have: Vec<&str> = bound.iter().map(String::as_str).collect();
    have.sort_unstable();
    have.dedup();

    // Both sides ascending: a single forward walk decides containment.
    let mut have = have.into_iter();
    requested
        .iter()
        .all(|want| have.by_ref().any(|tag| tag == want))
}

/// Whether the first element of `target` has a handler for `event`.
///
/// With no namespace tags, any handler bound to the event type counts. With
/// tags, a single handler must carry all of them. An empty collection, a
/// missing handler table or an empty event string yields `false`.
pub fn has_handler<Q: ElementQuery>(
    query: &Q,
    target: &ElementCollection<Q::Node>,
    event: &str,
) -> bool {
    let Some(node) = target.first() else {
        return false;
    };
    let Some(spec) = EventSpec::parse(event) else {
        return false;
    };
    let Some(table) = query.handler_table(node) else {
        return false;
    };
    let Some(records) = table.get(spec.event_type()) else {
        return false;
    };

    if spec.namespaces().is_empty() {
        return !records.is_empty();
    }

    records.iter().any(|record| {
        let hit = spec.matches(record);
        trace!(
            event_type = spec.event_type(),
            requested = ?spec.namespaces(),
            bound = %record.namespace_string(),
            hit,
            "namespace match attempt"
        );
        hit
    })
}

/// Whether the first element of `target` has `handler` bound for `event`.
///
/// Namespace tags in `event` are ignored; only the event type and the
/// handler identity are compared.
pub fn has_handler_equal_to<Q: ElementQuery>(
    query: &Q,
    target: &ElementCollection<Q::Node>,
    event: &str,
    handler: HandlerId,
) -> bool {
    let Some(node) = target.first() else {
        return false;
    };
    let event_type = event.split('.').next().unwrap_or_default();
    query.handler_table(node).is_some_and(|table| {
        table
            .get(event_type)
            .is_some_and(|records| records.iter().any(|record| record.handler == handler))
    })
}
