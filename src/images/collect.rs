//! Image candidate collection.
//!
//! One pass over a document gathers every plausible product-image URL:
//! `img` tags with their lazy-load attribute variants, responsive source
//! lists, social meta tags, and structured markup. Relative references are
//! resolved against an explicit base or the in-document `<base href>`;
//! whatever cannot be made absolute is dropped rather than guessed at.

use std::collections::HashSet;
use std::path::Path;

use dom_query::{Document, Selection};
use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::images::srcset::parse_best_from_srcset;
use crate::metadata::{self, json_ld};
use crate::url_utils::{dedupe_by_identity, normalize_image_url};

/// `img` attributes that carry a single URL.
const IMAGE_URL_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];

/// `img` attributes that carry a responsive source list.
const IMAGE_SRCSET_ATTRS: &[&str] = &["srcset", "data-srcset"];

/// Meta keys whose content is an image URL.
const IMAGE_META_KEYS: &[&str] = &["og:image", "og:image:secure_url", "twitter:image"];

struct Collector {
    base: Option<Url>,
    seen: HashSet<String>,
    urls: Vec<String>,
}

impl Collector {
    fn add(&mut self, raw: &str) {
        let Some(url) = normalize_image_url(raw, self.base.as_ref()) else {
            return;
        };
        if self.seen.insert(url.clone()) {
            self.urls.push(url);
        }
    }

    /// Structured-markup image values: a URL string, an object with a
    /// `url` field, or a list of either.
    fn add_json_images(&mut self, value: &Value) {
        match value {
            Value::String(s) => self.add(s),
            Value::Object(obj) => {
                if let Some(Value::String(url)) = obj.get("url") {
                    self.add(url);
                }
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(s) => self.add(s),
                        Value::Object(obj) => {
                            if let Some(Value::String(url)) = obj.get("url") {
                                self.add(url);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

/// Collect candidate image URLs from a document, in encounter order.
///
/// Exact duplicates are suppressed during collection; the final list is
/// deduplicated by asset identity, keeping the longest URL per identity
/// group (see [`crate::url_utils::dedupe_by_identity`]).
#[must_use]
pub fn collect_image_urls(doc: &Document, base_url: Option<&str>) -> Vec<String> {
    let mut collector = Collector {
        base: resolve_base(doc, base_url),
        seen: HashSet::new(),
        urls: Vec::new(),
    };

    for node in doc.select("img").nodes() {
        let img = Selection::from(*node);
        for attr in IMAGE_URL_ATTRS {
            if let Some(value) = img.attr(attr) {
                if !value.is_empty() {
                    collector.add(&value);
                }
            }
        }
        for attr in IMAGE_SRCSET_ATTRS {
            if let Some(value) = img.attr(attr) {
                if let Some(best) = parse_best_from_srcset(&value) {
                    collector.add(&best);
                }
            }
        }
    }

    for node in doc.select("meta").nodes() {
        let meta = Selection::from(*node);
        let raw_key = match meta.attr("property") {
            Some(p) if !p.is_empty() => p,
            _ => match meta.attr("name") {
                Some(n) => n,
                None => continue,
            },
        };
        let key = raw_key.trim().to_lowercase();
        if IMAGE_META_KEYS.contains(&key.as_str()) {
            if let Some(content) = meta.attr("content") {
                if !content.is_empty() {
                    collector.add(&content);
                }
            }
        }
    }

    for block in json_ld::extract_json_ld_blocks(doc) {
        let Some(obj) = block.as_object() else {
            continue;
        };
        for key in ["image", "images"] {
            if let Some(value) = obj.get(key) {
                collector.add_json_images(value);
            }
        }
    }

    dedupe_by_identity(&collector.urls)
}

/// Collect candidates from a document read from disk.
pub fn collect_image_urls_from_file(path: &Path, base_url: Option<&str>) -> Result<Vec<String>> {
    let doc = metadata::load_document(path)?;
    Ok(collect_image_urls(&doc, base_url))
}

/// The explicit base wins; a `<base href>` tag is the fallback. An
/// unparseable base leaves relative references unresolvable.
fn resolve_base(doc: &Document, base_url: Option<&str>) -> Option<Url> {
    if let Some(base) = base_url {
        return Url::parse(base).ok();
    }

    let tag = doc.select("base[href]");
    let node = tag.nodes().first()?;
    let href = Selection::from(*node).attr("href")?;
    Url::parse(&href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_img_src_and_lazy_variants_collected() {
        let html = r#"<html><body>
        <img src="https://cdn.example.com/a.jpg">
        <img data-src="https://cdn.example.com/b.jpg">
        <img data-lazy-src="https://cdn.example.com/c.jpg">
        <img data-original="https://cdn.example.com/d.jpg">
        </body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, None);

        assert_eq!(urls.len(), 4);
        assert!(urls.contains(&"https://cdn.example.com/a.jpg".to_string()));
        assert!(urls.contains(&"https://cdn.example.com/d.jpg".to_string()));
    }

    #[test]
    fn test_srcset_contributes_only_best_entry() {
        let html = r#"<html><body>
        <img srcset="https://cdn.example.com/small.jpg 400w, https://cdn.example.com/large.jpg 1200w">
        </body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, None);

        assert_eq!(urls, vec!["https://cdn.example.com/large.jpg".to_string()]);
    }

    #[test]
    fn test_meta_image_tags_collected() {
        let html = r#"<html><head>
        <meta property="og:image" content="https://cdn.example.com/og.jpg">
        <meta property="og:image:secure_url" content="https://cdn.example.com/og-secure.jpg">
        <meta name="twitter:image" content="https://cdn.example.com/tw.jpg">
        <meta name="twitter:card" content="summary">
        </head><body></body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, None);

        assert_eq!(urls.len(), 3);
    }

    #[test]
    fn test_json_ld_image_forms() {
        let html = r#"<html><head>
        <script type="application/ld+json">
        {"@type": "Product", "image": "https://cdn.example.com/one.jpg"}
        </script>
        <script type="application/ld+json">
        {"@type": "Product", "image": {"@type": "ImageObject", "url": "https://cdn.example.com/two.jpg"}}
        </script>
        <script type="application/ld+json">
        {"@type": "Product", "images": ["https://cdn.example.com/three.jpg",
            {"url": "https://cdn.example.com/four.jpg"}]}
        </script>
        </head><body></body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, None);

        assert_eq!(urls.len(), 4);
    }

    #[test]
    fn test_protocol_relative_normalized_to_https() {
        let html = r#"<html><body><img src="//cdn.example.com/img.jpg"></body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, None);

        assert_eq!(urls, vec!["https://cdn.example.com/img.jpg".to_string()]);
    }

    #[test]
    fn test_bare_host_excluded() {
        let html = r#"<html><body><img src="https://example.com"></body></html>"#;

        let doc = Document::from(html);
        assert!(collect_image_urls(&doc, None).is_empty());
    }

    #[test]
    fn test_relative_url_requires_base() {
        let html = r#"<html><body><img src="/assets/shoe.jpg"></body></html>"#;

        let doc = Document::from(html);
        assert!(collect_image_urls(&doc, None).is_empty());

        let urls = collect_image_urls(&doc, Some("https://shop.example.com/p/1"));
        assert_eq!(urls, vec!["https://shop.example.com/assets/shoe.jpg".to_string()]);
    }

    #[test]
    fn test_base_tag_used_when_no_explicit_base() {
        let html = r#"<html><head><base href="https://shop.example.com/"></head>
        <body><img src="assets/shoe.jpg"></body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, None);

        assert_eq!(urls, vec!["https://shop.example.com/assets/shoe.jpg".to_string()]);
    }

    #[test]
    fn test_explicit_base_wins_over_base_tag() {
        let html = r#"<html><head><base href="https://tag.example.com/"></head>
        <body><img src="shoe.jpg"></body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, Some("https://param.example.com/"));

        assert_eq!(urls, vec!["https://param.example.com/shoe.jpg".to_string()]);
    }

    #[test]
    fn test_exact_duplicates_from_different_sources_collapse() {
        let html = r#"<html><head>
        <meta property="og:image" content="https://cdn.example.com/same.jpg">
        </head><body>
        <img src="https://cdn.example.com/same.jpg">
        </body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, None);

        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_asset_identity_dedupe_keeps_longest() {
        let html = r#"<html><body>
        <img src="https://cdn.example.com/shoe-100x100.jpg">
        <img src="https://cdn.example.com/shoe-1200x1200.jpg">
        </body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, None);

        assert_eq!(urls, vec!["https://cdn.example.com/shoe-1200x1200.jpg".to_string()]);
    }

    #[test]
    fn test_malformed_json_ld_does_not_abort_collection() {
        let html = r#"<html><head>
        <script type="application/ld+json">{ nope</script>
        </head><body>
        <img src="https://cdn.example.com/ok.jpg">
        </body></html>"#;

        let doc = Document::from(html);
        let urls = collect_image_urls(&doc, None);

        assert_eq!(urls, vec!["https://cdn.example.com/ok.jpg".to_string()]);
    }
}
