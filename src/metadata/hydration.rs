//! Embedded hydration-state harvesting.
//!
//! Modern storefronts ship product state to the browser in two forms this
//! module recovers: inert JSON script blocks (`<script type="application/json">`,
//! the Next.js convention) and inline assignments to well-known global state
//! variables (`window.__INITIAL_STATE__ = {...}`, the Nuxt/Redux/Apollo
//! convention). Both are best-effort; anything unparseable is skipped.

use dom_query::{Document, Selection};
use serde_json::Value;
use tracing::debug;

use crate::patterns::HYDRATION_ASSIGNMENT;

/// Extract embedded hydration-state objects in document order.
///
/// Only JSON objects are kept. Arrays and scalars in JSON script blocks
/// carry no keyed state and are ignored; assignment payloads that fail to
/// parse are skipped.
#[must_use]
pub fn extract_hydration_objects(doc: &Document) -> Vec<Value> {
    let mut objects = Vec::new();

    for node in doc.select("script").nodes() {
        let sel = Selection::from(*node);
        let script_type = sel
            .attr("type")
            .map(|t| t.trim().to_lowercase())
            .unwrap_or_default();

        match script_type.as_str() {
            // Structured markup is harvested separately
            "application/ld+json" => {}
            "application/json" => {
                let text = sel.text();
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(value @ Value::Object(_)) => objects.push(value),
                    Ok(_) => {}
                    Err(err) => {
                        debug!(error = %err, "skipping unparseable json script block");
                    }
                }
            }
            "" | "text/javascript" | "application/javascript" | "module" => {
                let text = sel.text();
                if let Some(value) = extract_assignment_object(&text) {
                    objects.push(value);
                }
            }
            _ => {}
        }
    }

    objects
}

/// Find the first known state-variable assignment in a script body and
/// parse the JSON object literal assigned to it.
fn extract_assignment_object(script: &str) -> Option<Value> {
    let assignment = HYDRATION_ASSIGNMENT.find(script)?;
    let relative = script[assignment.end()..].find('{')?;
    let open = assignment.end() + relative;
    let slice = balanced_object_slice(script, open)?;

    match serde_json::from_str::<Value>(slice) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "skipping unparseable state assignment");
            None
        }
    }
}

/// Slice the balanced `{...}` object starting at byte offset `open`,
/// scanning character-by-character and tracking brace depth until it
/// returns to zero. Braces inside string literals do not count.
fn balanced_object_slice(script: &str, open: usize) -> Option<&str> {
    let bytes = script.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&script[open..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_script_block_extracted() {
        let html = r#"<html><head>
        <script id="__NEXT_DATA__" type="application/json">
        {"props": {"pageProps": {"product": {"name": "Court Vision"}}}}
        </script>
        </head><body></body></html>"#;

        let doc = Document::from(html);
        let objects = extract_hydration_objects(&doc);

        assert_eq!(objects.len(), 1);
        assert_eq!(
            objects[0]["props"]["pageProps"]["product"]["name"],
            "Court Vision"
        );
    }

    #[test]
    fn test_json_script_array_ignored() {
        let html = r#"<html><head>
        <script type="application/json">[1, 2, 3]</script>
        </head><body></body></html>"#;

        let doc = Document::from(html);
        assert!(extract_hydration_objects(&doc).is_empty());
    }

    #[test]
    fn test_initial_state_assignment_extracted() {
        let html = r#"<html><body>
        <script>
        window.__INITIAL_STATE__ = {"product": {"sku": "AB-1", "label": "size {M}"}};
        doSomethingElse();
        </script>
        </body></html>"#;

        let doc = Document::from(html);
        let objects = extract_hydration_objects(&doc);

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["product"]["sku"], "AB-1");
        // Brace inside a string literal did not terminate the slice early
        assert_eq!(objects[0]["product"]["label"], "size {M}");
    }

    #[test]
    fn test_assignment_without_window_prefix() {
        let html = r#"<html><body>
        <script type="text/javascript">__PRELOADED_STATE__ = {"cart": {}};</script>
        </body></html>"#;

        let doc = Document::from(html);
        let objects = extract_hydration_objects(&doc);

        assert_eq!(objects.len(), 1);
        assert!(objects[0]["cart"].is_object());
    }

    #[test]
    fn test_plain_script_without_marker_ignored() {
        let html = r#"<html><body>
        <script>var config = {"a": 1};</script>
        </body></html>"#;

        let doc = Document::from(html);
        assert!(extract_hydration_objects(&doc).is_empty());
    }

    #[test]
    fn test_unbalanced_assignment_skipped() {
        let html = r#"<html><body>
        <script>window.__INITIAL_STATE__ = {"open": </script>
        </body></html>"#;

        let doc = Document::from(html);
        assert!(extract_hydration_objects(&doc).is_empty());
    }

    #[test]
    fn test_ld_json_not_duplicated_here() {
        let html = r#"<html><head>
        <script type="application/ld+json">{"@type": "Product"}</script>
        </head><body></body></html>"#;

        let doc = Document::from(html);
        assert!(extract_hydration_objects(&doc).is_empty());
    }

    #[test]
    fn test_balanced_object_slice_nested() {
        let script = r#"prefix {"a": {"b": {"c": 1}}} suffix"#;
        let open = script.find('{').unwrap();
        let slice = balanced_object_slice(script, open).unwrap();
        assert_eq!(slice, r#"{"a": {"b": {"c": 1}}}"#);
    }
}
