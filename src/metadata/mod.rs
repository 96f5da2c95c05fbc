//! Deterministic signal harvesting from product pages.
//!
//! One pass over a parsed document yields [`RawSignals`]: structured markup
//! (JSON-LD), meta tags, product-indicative `data-*` attributes, and
//! embedded hydration state. These are the machine-readable signals a
//! heuristic distiller would discard, so they are harvested before
//! distillation runs.

pub mod hydration;
pub mod json_ld;
pub mod meta_tags;
pub mod product_attrs;

use std::collections::BTreeMap;
use std::path::Path;

use dom_query::Document;
use serde_json::Value;

use crate::encoding;
use crate::error::{Error, Result};
use crate::options::Options;

pub use hydration::extract_hydration_objects;
pub use json_ld::extract_json_ld_blocks;
pub use meta_tags::extract_meta_map;
pub use product_attrs::extract_data_attrs;

/// Machine-readable signals harvested from one document.
///
/// Every bucket is present (possibly empty) for every document. Built once
/// per document; not mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct RawSignals {
    /// Flattened JSON-LD blocks in document order.
    pub json_ld: Vec<Value>,
    /// Meta name/property tags, keys lowercased, first occurrence wins.
    pub meta: BTreeMap<String, String>,
    /// Product-indicative `data-*` attributes, last occurrence wins.
    pub data_attrs: BTreeMap<String, String>,
    /// Embedded hydration-state objects in document order.
    pub hydration: Vec<Value>,
}

/// Harvest all signal buckets from a parsed document.
#[must_use]
pub fn collect_signals(doc: &Document, opts: &Options) -> RawSignals {
    RawSignals {
        json_ld: json_ld::extract_json_ld_blocks(doc),
        meta: meta_tags::extract_meta_map(doc),
        data_attrs: product_attrs::extract_data_attrs(doc, opts),
        hydration: hydration::extract_hydration_objects(doc),
    }
}

/// Read and parse an HTML document from disk.
///
/// Bytes are transcoded to UTF-8 first (see [`crate::encoding`]). A missing
/// or unreadable file is the only fatal condition at this stage; everything
/// downstream is best-effort.
pub fn load_document(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::InputMissing(format!("{}: {e}", path.display())))?;
    let html = encoding::transcode_to_utf8(&bytes);
    Ok(Document::from(html.as_str()))
}
