//! JSON-LD structured markup harvesting.
//!
//! Merchant sites embed schema.org product data in `application/ld+json`
//! script blocks for SEO. This is the highest-value machine-readable signal
//! on a product page, so every parseable block is kept verbatim as a
//! [`serde_json::Value`] for downstream selection.

use dom_query::{Document, Selection};
use serde_json::Value;
use tracing::debug;

/// Outcome of parsing one script block.
///
/// Skipping is an explicit branch rather than a swallowed error: malformed
/// markup is common in the wild and must never abort sibling blocks.
#[derive(Debug)]
enum BlockOutcome {
    Parsed(Vec<Value>),
    Skipped,
}

fn parse_block(raw: &str) -> BlockOutcome {
    let raw = raw.trim();
    if raw.is_empty() {
        return BlockOutcome::Skipped;
    }

    match serde_json::from_str::<Value>(raw) {
        // A top-level array contributes each element separately so the
        // harvested list never nests
        Ok(Value::Array(items)) => BlockOutcome::Parsed(items),
        Ok(value) => BlockOutcome::Parsed(vec![value]),
        Err(err) => {
            debug!(error = %err, "skipping malformed structured markup block");
            BlockOutcome::Skipped
        }
    }
}

/// Extract every parseable JSON-LD block from the document, in order.
#[must_use]
pub fn extract_json_ld_blocks(doc: &Document) -> Vec<Value> {
    let mut blocks = Vec::new();

    for node in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
        let text = Selection::from(*node).text();
        match parse_block(&text) {
            BlockOutcome::Parsed(values) => blocks.extend(values),
            BlockOutcome::Skipped => {}
        }
    }

    blocks
}
