//! `data-*` attribute harvesting.
//!
//! E-commerce templates hang product identifiers off custom attributes
//! (`data-product-id`, `data-price`, `data-sku`). These rarely survive
//! content distillation, so they are captured here as plain strings.

use std::collections::BTreeMap;

use dom_query::Document;

use crate::options::Options;

/// Collect `data-*` attributes whose name contains a product-indicative
/// keyword (`product`, `price`, `sku`, `id`, `image`, `brand` by default).
///
/// Matching is substring-based on the lowercased attribute name, so
/// `data-analytics-id` is kept (contains `id`) while `data-foo` is dropped.
/// Later occurrences of an attribute name overwrite earlier ones.
#[must_use]
pub fn extract_data_attrs(doc: &Document, opts: &Options) -> BTreeMap<String, String> {
    let mut harvested = BTreeMap::new();

    for node in doc.select("*").nodes() {
        let attributes = node.attrs();
        for attr in &attributes {
            let name = attr.name.local.to_string();
            let lower = name.to_lowercase();
            if !lower.starts_with("data-") {
                continue;
            }
            if opts
                .data_attr_keywords
                .iter()
                .any(|keyword| lower.contains(keyword.as_str()))
            {
                harvested.insert(name, attr.value.to_string());
            }
        }
    }

    harvested
}
