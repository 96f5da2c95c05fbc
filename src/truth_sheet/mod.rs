//! Truth-sheet construction from raw signals.
//!
//! The truth sheet is the canonical draft record handed to the reasoning
//! step: every field the page states machine-readably, normalized into one
//! schema-shaped object. Structured markup is the primary source; embedded
//! hydration state fills colors, variants, and images it left out. Each
//! derivation is independently best-effort, so one malformed field never
//! costs the others.
//!
//! A field absent from every source stays absent. Serialization omits
//! empty fields, which keeps the prompt payload honest: the reasoning step
//! sees what the page said, not placeholder values.

pub mod embedded;
pub mod search;

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::metadata::RawSignals;
use crate::options::Options;
use crate::product::{Price, ProductVariant};
use crate::url_utils::{asset_identity, path_is_blocked, resolution_score};

/// Canonical draft product record derived from page signals.
///
/// Scalar fields are `None` and list fields empty when no source provided
/// them; both forms are omitted from the serialized sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TruthSheet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_features: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<ProductVariant>,
}

/// Build a truth sheet from one document's raw signals.
///
/// The first structured-markup object whose `@type` equals or includes
/// "Product" (searching `@graph` containers too) seeds the sheet; with no
/// such object every structured field starts absent. The `og:image` meta
/// value backfills an empty image list, and hydration objects then enrich
/// colors, variants, and images per [`embedded::extract_from_embedded`].
#[must_use]
pub fn build_truth_sheet(signals: &RawSignals, opts: &Options) -> TruthSheet {
    let mut sheet = TruthSheet::default();

    if let Some(product) = select_product_object(&signals.json_ld) {
        sheet.name = trimmed_string(product.get("name"));
        sheet.description = trimmed_string(product.get("description"));
        sheet.brand = derive_brand(product);
        sheet.category = derive_category(product);
        sheet.price = derive_price(product, opts);
        sheet.key_features = derive_key_features(product);
        sheet.image_urls = derive_image_urls(product, opts);
        sheet.video_url = derive_video_url(product);
        sheet.colors = coerce_color_list(product.get("color"));
        sheet.variants = derive_variants(product, opts);
        if sheet.variants.is_empty() {
            if let Some(variant) = synthesize_variant(product, &sheet) {
                sheet.variants.push(variant);
            }
        }
    }

    if sheet.image_urls.is_empty() {
        if let Some(og_image) = signals.meta.get("og:image") {
            if !og_image.is_empty() && !path_is_blocked(og_image, opts) {
                sheet.image_urls.push(og_image.clone());
            }
        }
    }

    for hydration in &signals.hydration {
        let findings = embedded::extract_from_embedded(hydration, opts);
        if sheet.colors.is_empty() && !findings.colors.is_empty() {
            sheet.colors = findings.colors;
        }
        if sheet.variants.is_empty() && !findings.variants.is_empty() {
            sheet.variants = findings.variants;
        }
        for url in findings.image_urls {
            if !path_is_blocked(&url, opts) && !sheet.image_urls.contains(&url) {
                sheet.image_urls.push(url);
            }
        }
    }

    sheet
}

/// Upgrade variant images to the best-scored rendition of the same asset.
///
/// Candidates are grouped by asset identity; a variant image is replaced
/// when a candidate sharing its identity scores strictly higher. This is
/// the only mutation the sheet sees after construction.
pub fn upgrade_variant_images(sheet: &mut TruthSheet, candidates: &[String], opts: &Options) {
    let mut best: HashMap<String, &String> = HashMap::new();
    for candidate in candidates {
        let identity = asset_identity(candidate);
        match best.get(&identity) {
            Some(existing)
                if resolution_score(existing, opts) >= resolution_score(candidate, opts) => {}
            _ => {
                best.insert(identity, candidate);
            }
        }
    }

    for variant in &mut sheet.variants {
        let Some(current) = variant.image_url.clone() else {
            continue;
        };
        if let Some(candidate) = best.get(&asset_identity(&current)) {
            if resolution_score(candidate, opts) > resolution_score(&current, opts) {
                debug!("upgrading variant image {current} -> {candidate}");
                variant.image_url = Some((*candidate).clone());
            }
        }
    }
}

/// Drop variant images sitting on non-product paths.
///
/// Top-level images are filtered during construction; variant lists keep
/// theirs by default so the reasoning step can still see them, and this
/// pass scrubs them on request.
pub fn scrub_variant_images(sheet: &mut TruthSheet, opts: &Options) {
    for variant in &mut sheet.variants {
        if let Some(url) = &variant.image_url {
            if path_is_blocked(url, opts) {
                variant.image_url = None;
            }
        }
    }
}

fn select_product_object(blocks: &[Value]) -> Option<&Map<String, Value>> {
    for block in blocks {
        let Some(obj) = block.as_object() else {
            continue;
        };
        if is_product_type(obj.get("@type")) {
            return Some(obj);
        }
        if let Some(Value::Array(graph)) = obj.get("@graph") {
            for entry in graph {
                if let Some(entry_obj) = entry.as_object() {
                    if is_product_type(entry_obj.get("@type")) {
                        return Some(entry_obj);
                    }
                }
            }
        }
    }
    None
}

fn is_product_type(type_value: Option<&Value>) -> bool {
    match type_value {
        Some(Value::String(s)) => s == "Product",
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Value::String(s) if s == "Product")),
        _ => false,
    }
}

fn derive_brand(product: &Map<String, Value>) -> Option<String> {
    match product.get("brand") {
        Some(Value::String(_)) => trimmed_string(product.get("brand")),
        Some(Value::Object(obj)) => trimmed_string(obj.get("name")),
        _ => None,
    }
}

fn derive_category(product: &Map<String, Value>) -> Option<String> {
    match product.get("category") {
        Some(Value::String(_)) => trimmed_string(product.get("category")),
        Some(Value::Object(obj)) => trimmed_string(obj.get("name")),
        _ => None,
    }
}

/// First offer with a parseable numeric `price` wins. `priceCurrency`
/// defaults when the offer omits it; `highPrice` becomes the compare-at
/// price when parseable.
fn derive_price(product: &Map<String, Value>, opts: &Options) -> Option<Price> {
    let offers = product.get("offers")?;
    let offer_list: Vec<&Value> = match offers {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    for offer in offer_list {
        let Some(obj) = offer.as_object() else {
            continue;
        };
        if let Some(amount) = parse_price_value(obj.get("price")) {
            let currency = trimmed_string(obj.get("priceCurrency"))
                .unwrap_or_else(|| opts.default_currency.clone());
            return Some(Price {
                amount,
                currency,
                compare_at_price: parse_price_value(obj.get("highPrice")),
            });
        }
    }
    None
}

/// `positiveNotes` entries when it yields anything, else `additionalProperty`
/// entries taking `value` or `name`. Ordered, deduplicated.
fn derive_key_features(product: &Map<String, Value>) -> Vec<String> {
    let mut features = Vec::new();

    if let Some(Value::Array(notes)) = product.get("positiveNotes") {
        for note in notes {
            match note {
                Value::String(_) => {
                    if let Some(text) = trimmed_string(Some(note)) {
                        features.push(text);
                    }
                }
                Value::Object(obj) => {
                    if let Some(text) = trimmed_string(obj.get("name")) {
                        features.push(text);
                    }
                }
                _ => {}
            }
        }
    }

    if features.is_empty() {
        if let Some(Value::Array(props)) = product.get("additionalProperty") {
            for prop in props {
                let Some(obj) = prop.as_object() else {
                    continue;
                };
                let text = string_or_number(obj.get("value"))
                    .or_else(|| trimmed_string(obj.get("name")));
                if let Some(text) = text {
                    features.push(text);
                }
            }
        }
    }

    dedupe_in_order(features)
}

fn derive_image_urls(product: &Map<String, Value>, opts: &Options) -> Vec<String> {
    let mut urls = Vec::new();
    for key in ["images", "image"] {
        if let Some(value) = product.get(key) {
            collect_image_values(value, &mut urls);
        }
    }
    dedupe_in_order(urls)
        .into_iter()
        .filter(|url| !path_is_blocked(url, opts))
        .collect()
}

fn derive_video_url(product: &Map<String, Value>) -> Option<String> {
    let video = product.get("video")?;
    let entry = match video {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match entry {
        Value::String(_) => trimmed_string(Some(entry)),
        Value::Object(obj) => {
            trimmed_string(obj.get("embedUrl")).or_else(|| trimmed_string(obj.get("contentUrl")))
        }
        _ => None,
    }
}

fn derive_variants(product: &Map<String, Value>, opts: &Options) -> Vec<ProductVariant> {
    let Some(has_variant) = product.get("hasVariant") else {
        return Vec::new();
    };
    let entries: Vec<&Value> = match has_variant {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    entries
        .iter()
        .filter_map(|entry| entry.as_object())
        .map(|obj| variant_from_object(obj, opts))
        .filter(|variant| *variant != ProductVariant::default())
        .collect()
}

fn variant_from_object(obj: &Map<String, Value>, opts: &Options) -> ProductVariant {
    let mut images = Vec::new();
    for key in ["images", "image"] {
        if let Some(value) = obj.get(key) {
            collect_image_values(value, &mut images);
        }
    }

    ProductVariant {
        sku: string_or_number(obj.get("sku")),
        color: trimmed_string(obj.get("color")),
        size: trimmed_string(obj.get("size")).or_else(|| trimmed_string(obj.get("width"))),
        price: parse_price_value(obj.get("price"))
            .or_else(|| derive_price(obj, opts).map(|p| p.amount)),
        image_url: images.into_iter().next(),
    }
}

/// With no `hasVariant` but a top-level `sku`, the product is its own
/// single variant.
fn synthesize_variant(product: &Map<String, Value>, sheet: &TruthSheet) -> Option<ProductVariant> {
    let sku = string_or_number(product.get("sku"))?;
    Some(ProductVariant {
        sku: Some(sku),
        color: sheet.colors.first().cloned(),
        size: None,
        price: sheet.price.as_ref().map(|p| p.amount),
        image_url: sheet.image_urls.first().cloned(),
    })
}

// --- shared JSON coercion helpers -----------------------------------------

/// Image field shapes: a URL string, an object with a `url` field, or a
/// list of either.
pub(crate) fn collect_image_values(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(_) => {
            if let Some(url) = trimmed_string(Some(value)) {
                out.push(url);
            }
        }
        Value::Object(obj) => {
            if let Some(url) = trimmed_string(obj.get("url")) {
                out.push(url);
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(_) => {
                        if let Some(url) = trimmed_string(Some(item)) {
                            out.push(url);
                        }
                    }
                    Value::Object(obj) => {
                        if let Some(url) = trimmed_string(obj.get("url")) {
                            out.push(url);
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

pub(crate) fn coerce_color_list(value: Option<&Value>) -> Vec<String> {
    let mut colors = Vec::new();
    match value {
        Some(Value::String(_)) => {
            if let Some(color) = trimmed_string(value) {
                colors.push(color);
            }
        }
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(_) => {
                        if let Some(color) = trimmed_string(Some(item)) {
                            colors.push(color);
                        }
                    }
                    Value::Object(obj) => {
                        if let Some(color) = trimmed_string(obj.get("name")) {
                            colors.push(color);
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
    dedupe_in_order(colors)
}

pub(crate) fn trimmed_string(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

pub(crate) fn string_or_number(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn parse_price_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn dedupe_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
