//! Enrichment from embedded hydration state.
//!
//! Server-rendered stores often carry richer variant data in their
//! hydration payload than in structured markup. Two specific shapes are
//! recognized: a `product.media` list paired positionally with
//! "COLOR"-typed question answers, and the colorway lists found in
//! Next.js/Nuxt page props. When neither matches, a bounded generic key
//! search sweeps the object for product-indicative fields.

use serde_json::Value;

use crate::options::Options;
use crate::product::ProductVariant;
use crate::truth_sheet::search::search_keys;
use crate::truth_sheet::{
    coerce_color_list, collect_image_values, dedupe_in_order, parse_price_value, string_or_number,
    trimmed_string,
};

/// Colors, variants, and image URLs pulled from one hydration object.
#[derive(Debug, Default, PartialEq)]
pub struct EmbeddedFindings {
    pub colors: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub image_urls: Vec<String>,
}

impl EmbeddedFindings {
    fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.variants.is_empty() && self.image_urls.is_empty()
    }

    fn merge(&mut self, other: EmbeddedFindings) {
        self.colors.extend(other.colors);
        self.variants.extend(other.variants);
        self.image_urls.extend(other.image_urls);
    }

    fn dedupe(mut self) -> Self {
        self.colors = dedupe_in_order(self.colors);
        self.image_urls = dedupe_in_order(self.image_urls);
        self
    }
}

/// Extract product signals from one embedded hydration object.
///
/// The specific heuristics run first; the generic key search only runs
/// when both came back empty, so a recognized shape is never diluted by
/// loose matches from elsewhere in the state tree.
#[must_use]
pub fn extract_from_embedded(object: &Value, opts: &Options) -> EmbeddedFindings {
    let mut findings = pair_media_questions(object);
    findings.merge(colorway_findings(object));

    if findings.is_empty() {
        findings = generic_findings(object, opts);
    }

    findings.dedupe()
}

/// `product.media` + `product.questions` pairing.
///
/// Some storefront states list gallery media and purchase questions as
/// parallel arrays; when a question is "COLOR"-typed, answer N names the
/// color shown by media entry N.
fn pair_media_questions(object: &Value) -> EmbeddedFindings {
    let mut findings = EmbeddedFindings::default();
    let Some(product) = object.get("product") else {
        return findings;
    };

    if let Some(Value::Array(media)) = product.get("media") {
        for entry in media {
            if let Some(url) = media_url(entry) {
                findings.image_urls.push(url);
            }
        }
    }

    let colors = color_question_answers(product);
    let paired = findings.image_urls.len().min(colors.len());
    for i in 0..paired {
        findings.variants.push(ProductVariant {
            color: Some(colors[i].clone()),
            image_url: Some(findings.image_urls[i].clone()),
            ..ProductVariant::default()
        });
    }
    findings.colors = colors;

    findings
}

fn media_url(entry: &Value) -> Option<String> {
    match entry {
        Value::String(_) => trimmed_string(Some(entry)),
        Value::Object(obj) => trimmed_string(obj.get("url"))
            .or_else(|| trimmed_string(obj.get("src")))
            .or_else(|| trimmed_string(obj.get("full"))),
        _ => None,
    }
}

/// Answers of the first "COLOR"-typed question, in listed order.
fn color_question_answers(product: &Value) -> Vec<String> {
    let Some(Value::Array(questions)) = product.get("questions") else {
        return Vec::new();
    };

    for question in questions {
        let Some(obj) = question.as_object() else {
            continue;
        };
        let question_type =
            trimmed_string(obj.get("type")).or_else(|| trimmed_string(obj.get("name")));
        if !question_type.is_some_and(|t| t.eq_ignore_ascii_case("color")) {
            continue;
        }

        let answers = match obj.get("answers").or_else(|| obj.get("values")) {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        };
        return answers
            .iter()
            .filter_map(|answer| match answer {
                Value::String(_) => trimmed_string(Some(answer)),
                Value::Object(a) => trimmed_string(a.get("value"))
                    .or_else(|| trimmed_string(a.get("text")))
                    .or_else(|| trimmed_string(a.get("name"))),
                _ => None,
            })
            .collect();
    }
    Vec::new()
}

/// Colorway lists in common Next.js/Nuxt page-prop shapes.
///
/// Scans the object itself plus the usual prop containers for a
/// `colorways` array whose entries carry a color name and rendition
/// images; squarish renditions are preferred since they fit the
/// near-square quality policy.
fn colorway_findings(object: &Value) -> EmbeddedFindings {
    let mut findings = EmbeddedFindings::default();

    let roots = [
        Some(object),
        object.get("props").and_then(|p| p.get("pageProps")),
        object.get("pageProps"),
        object.get("data"),
    ];

    for root in roots.into_iter().flatten() {
        for container in [Some(root), root.get("product")].into_iter().flatten() {
            let Some(Value::Array(colorways)) = container.get("colorways") else {
                continue;
            };
            for entry in colorways {
                let Some(obj) = entry.as_object() else {
                    continue;
                };
                let color = trimmed_string(obj.get("colorDescription"))
                    .or_else(|| trimmed_string(obj.get("color")))
                    .or_else(|| trimmed_string(obj.get("name")));
                let image = colorway_image(obj.get("images"))
                    .or_else(|| trimmed_string(obj.get("imageUrl")))
                    .or_else(|| trimmed_string(obj.get("image")));

                if let Some(color) = &color {
                    findings.colors.push(color.clone());
                }
                if let Some(image) = &image {
                    findings.image_urls.push(image.clone());
                }
                if color.is_some() || image.is_some() {
                    findings.variants.push(ProductVariant {
                        color,
                        image_url: image,
                        ..ProductVariant::default()
                    });
                }
            }
        }
    }

    findings
}

fn colorway_image(images: Option<&Value>) -> Option<String> {
    match images? {
        Value::Object(obj) => trimmed_string(obj.get("squarishURL"))
            .or_else(|| trimmed_string(obj.get("portraitURL")))
            .or_else(|| {
                obj.values()
                    .find_map(|v| trimmed_string(Some(v)).filter(|s| s.starts_with("http")))
            }),
        value @ (Value::String(_) | Value::Array(_)) => {
            let mut urls = Vec::new();
            collect_image_values(value, &mut urls);
            urls.into_iter().next()
        }
        _ => None,
    }
}

/// Bounded generic sweep for product-indicative keys.
fn generic_findings(object: &Value, opts: &Options) -> EmbeddedFindings {
    let mut findings = EmbeddedFindings::default();

    search_keys(
        object,
        &opts.hydration_keys,
        opts.hydration_depth,
        &mut |key, value| match key {
            "color" | "colors" | "colorway" => {
                findings.colors.extend(coerce_color_list(Some(value)));
            }
            "variant" | "variants" => {
                findings.variants.extend(generic_variants(value));
            }
            "image" | "images" | "media" | "gallery" => {
                collect_image_values(value, &mut findings.image_urls);
            }
            // Remaining keys (sku and friends) mark product-ness but
            // carry nothing placeable on their own.
            _ => {}
        },
    );

    findings
}

fn generic_variants(value: &Value) -> Vec<ProductVariant> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(|entry| entry.as_object())
        .map(|obj| {
            let mut images = Vec::new();
            for key in ["image", "images", "imageUrl"] {
                if let Some(v) = obj.get(key) {
                    collect_image_values(v, &mut images);
                }
            }
            ProductVariant {
                sku: string_or_number(obj.get("sku")),
                color: trimmed_string(obj.get("color")),
                size: trimmed_string(obj.get("size")),
                price: parse_price_value(obj.get("price")),
                image_url: images.into_iter().next(),
            }
        })
        .filter(|variant| *variant != ProductVariant::default())
        .collect()
}
