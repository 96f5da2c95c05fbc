//! Prompt assembly for the reconciliation call.
//!
//! The reasoning service receives one system message: the instructions
//! template with the document's evidence interpolated into tagged blocks.
//! The truth sheet is authoritative for pricing and identifiers; the
//! distilled markdown verifies features; the image lists bound what may be
//! cited, so the model selects rather than invents.

use serde::Serialize;
use serde_json::Value;

use crate::truth_sheet::TruthSheet;

const RECONCILE_INSTRUCTIONS: &str = r#"
# Role
You are a Senior Data Integrity Agent. Your task is to reconcile raw web extraction data into a single, high-fidelity JSON Product Object.

# Inputs
1. **Truth Sheet (Deterministic)**: Extracted directly from Schema.org JSON-LD. This is the primary source for pricing and identifiers.
2. **Product Context (Markdown)**: Distilled main content of the page. Use this to verify features, materials, and descriptions.
3. **Structured Markup**: Every structured-data block the page carried, in case the truth sheet missed something.
4. **Verified Media**: Image URLs that passed quality gates (dimensions, aspect). Prefer these for image_urls.
5. **Image Candidates**: All page image URLs that passed the non-product path filter (og:image, img tags, etc.). Use this list when Verified Media is empty so you can still pick a product image (e.g. og:image). Prefer product shots; exclude marketing, banner, or email-signup imagery.

# Instructions
- **Reconciliation**: If the Truth Sheet is missing a field (e.g., 'material'), find it in the Markdown.
- **Image Selection**: Populate image_urls from Verified Media when non-empty. When Verified Media is empty, choose from Image Candidates (and/or truth sheet image_urls / variant image_url). Only include product imagery, never marketing, banner, or email-signup. The pipeline will strip non-product URLs.
- **Formatting**: Output ONLY valid JSON. No prose.
- **Constraint**: If a value is not found in either source, return `null`. Do not hallucinate.

# Schema Requirements
{
  "name": "string",
  "price": {"price": number, "currency": "string", "compare_at_price": number | null},
  "description": "string (concise, focus on specs)",
  "key_features": ["list", "of", "key", "points"],
  "image_urls": ["url"],
  "video_url": "url or null",
  "category": {"name": "string"},
  "brand": "string",
  "colors": ["list", "of", "colors"],
  "variants": [{"sku": "string or null", "color": "string or null", "size": "string or null", "price": "number or null", "image_url": "url or null"}]
}

# Input Data
<truth_sheet>
{{truth_sheet}}
</truth_sheet>

<product_context>
{{markdown}}
</product_context>

<structured_markup>
{{structured_markup}}
</structured_markup>

<verified_media>
{{verified_images}}
</verified_media>

<image_candidates>
{{image_candidates}}
</image_candidates>

# Response
"#;

/// Interpolate one document's evidence into the instructions template.
#[must_use]
pub fn assemble_prompt(
    sheet: &TruthSheet,
    markdown: &str,
    structured_markup: &[Value],
    verified_images: &[String],
    image_candidates: &[String],
) -> String {
    RECONCILE_INSTRUCTIONS
        .replace("{{truth_sheet}}", &json_block(sheet, "{}"))
        .replace("{{markdown}}", markdown)
        .replace("{{structured_markup}}", &json_block(&structured_markup, "[]"))
        .replace("{{verified_images}}", &json_block(&verified_images, "[]"))
        .replace("{{image_candidates}}", &json_block(&image_candidates, "[]"))
}

fn json_block<T: Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_placeholders_interpolated() {
        let sheet = TruthSheet {
            name: Some("Trail Shoe".to_string()),
            ..TruthSheet::default()
        };
        let markup = vec![json!({"@type": "Product", "name": "Trail Shoe"})];
        let verified = vec!["https://cdn.example.com/shoe.jpg".to_string()];
        let candidates = vec!["https://cdn.example.com/og.jpg".to_string()];

        let prompt = assemble_prompt(&sheet, "# Trail Shoe\n\nGrippy.", &markup, &verified, &candidates);

        assert!(!prompt.contains("{{"));
        assert!(prompt.contains("<truth_sheet>"));
        assert!(prompt.contains("\"Trail Shoe\""));
        assert!(prompt.contains("# Trail Shoe\n\nGrippy."));
        assert!(prompt.contains("https://cdn.example.com/shoe.jpg"));
        assert!(prompt.contains("https://cdn.example.com/og.jpg"));
    }

    #[test]
    fn test_empty_inputs_yield_empty_blocks() {
        let prompt = assemble_prompt(&TruthSheet::default(), "", &[], &[], &[]);

        assert!(prompt.contains("<verified_media>\n[]\n</verified_media>"));
        assert!(prompt.contains("<truth_sheet>\n{}\n</truth_sheet>"));
    }

    #[test]
    fn test_schema_block_survives_interpolation() {
        // The schema example braces must not be mistaken for placeholders
        let prompt = assemble_prompt(&TruthSheet::default(), "", &[], &[], &[]);
        assert!(prompt.contains("\"compare_at_price\": number | null"));
        assert!(prompt.contains("# Response"));
    }
}
