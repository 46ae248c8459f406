//! HTML normalization.
//!
//! Engines re-case tags, re-quote attributes and re-encode entities when they
//! serialize. Markup comparisons push the expected fragment through the same
//! render/serialize round trip so both sides are in the engine's own form.

use tracing::trace;

use crate::query::ElementQuery;
use crate::result::ShouldResult;

/// Render `html` into a detached container, read its markup back and
/// release the container.
///
/// # Errors
///
/// Whatever the engine's renderer reports for unparseable markup is returned
/// unchanged.
pub fn normalize<Q: ElementQuery>(query: &Q, html: &str) -> ShouldResult<String> {
    let container = query.render_fragment(html)?;
    let normalized = query.serialize_html(&container);
    query.release_fragment(&container);
    trace!(input = html, output = %normalized, "normalized markup");
    Ok(normalized)
}
