//! Meta tag harvesting.
//!
//! Collects `og:*`, `twitter:*`, `product:*` and plain `name` meta tags
//! into one flat map used for image fallbacks and prompt context.

use std::collections::BTreeMap;

use dom_query::{Document, Selection};

/// Collect `<meta>` name/property tags into a key map.
///
/// The key is the `property` attribute when present and non-empty, else
/// `name`, trimmed and lowercased. The first occurrence of a key wins;
/// later duplicates are ignored. Tags without a `content` attribute are
/// skipped.
#[must_use]
pub fn extract_meta_map(doc: &Document) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::new();

    for node in doc.select("meta").nodes() {
        let sel = Selection::from(*node);

        let raw_key = match sel.attr("property") {
            Some(p) if !p.is_empty() => p,
            _ => match sel.attr("name") {
                Some(n) => n,
                None => continue,
            },
        };
        let key = raw_key.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }

        let Some(content) = sel.attr("content") else {
            continue;
        };
        meta.entry(key).or_insert_with(|| content.trim().to_string());
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_and_name_tags_extracted() {
        let html = r#"<html><head>
        <meta property="og:title" content="Product Title">
        <meta property="og:image" content="https://example.com/img.png">
        <meta name="description" content="A product description">
        </head><body></body></html>"#;

        let doc = Document::from(html);
        let meta = extract_meta_map(&doc);

        assert_eq!(meta.get("og:title").map(String::as_str), Some("Product Title"));
        assert_eq!(
            meta.get("og:image").map(String::as_str),
            Some("https://example.com/img.png")
        );
        assert_eq!(
            meta.get("description").map(String::as_str),
            Some("A product description")
        );
    }

    #[test]
    fn test_keys_lowercased() {
        let html = r#"<html><head>
        <meta property="OG:Title" content="Title">
        </head><body></body></html>"#;

        let doc = Document::from(html);
        let meta = extract_meta_map(&doc);

        assert!(meta.contains_key("og:title"));
        assert!(!meta.contains_key("OG:Title"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let html = r#"<html><head>
        <meta property="og:title" content="First">
        <meta property="og:title" content="Second">
        </head><body></body></html>"#;

        let doc = Document::from(html);
        let meta = extract_meta_map(&doc);

        assert_eq!(meta.get("og:title").map(String::as_str), Some("First"));
    }

    #[test]
    fn test_tags_without_content_skipped() {
        let html = r#"<html><head>
        <meta property="og:title">
        <meta name="description" content="Has content">
        </head><body></body></html>"#;

        let doc = Document::from(html);
        let meta = extract_meta_map(&doc);

        assert!(!meta.contains_key("og:title"));
        assert_eq!(meta.get("description").map(String::as_str), Some("Has content"));
    }

    #[test]
    fn test_charset_only_meta_ignored() {
        let html = r#"<html><head>
        <meta charset="utf-8">
        </head><body></body></html>"#;

        let doc = Document::from(html);
        assert!(extract_meta_map(&doc).is_empty());
    }

    #[test]
    fn test_content_value_trimmed() {
        let html = r#"<html><head>
        <meta name="author" content="  Acme Corp  ">
        </head><body></body></html>"#;

        let doc = Document::from(html);
        let meta = extract_meta_map(&doc);

        assert_eq!(meta.get("author").map(String::as_str), Some("Acme Corp"));
    }
}
