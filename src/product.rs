//! Final product schema.
//!
//! `Product` is the only entity the pipeline persists. The reasoning reply
//! must deserialize to exactly this shape; a reply that does not is a
//! schema failure and the document falls back to the sentinel
//! [`Product::unknown`]. Field names follow the export wire format, which
//! downstream catalog consumers depend on.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::options::Options;
use crate::url_utils::path_is_blocked;

/// A product category, ideally from Google's Product Taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
}

impl Category {
    /// Build a category from a raw name.
    ///
    /// The name is trimmed; an empty name falls back to "Uncategorized".
    /// Names outside the injected taxonomy are kept as-is rather than
    /// coerced to a nearby entry, since substring matching picks arbitrary
    /// taxonomy paths ("Pants" lands on "Motorcycle Pants").
    #[must_use]
    pub fn sanitized(raw: &str, taxonomy: Option<&[String]>) -> Self {
        let name = raw.trim();
        if name.is_empty() {
            return Self {
                name: "Uncategorized".to_string(),
            };
        }
        if let Some(taxonomy) = taxonomy {
            if !taxonomy.iter().any(|entry| entry == name) {
                debug!("category {name:?} not in taxonomy, keeping as-is");
            }
        }
        Self {
            name: name.to_string(),
        }
    }
}

/// A price with its currency and the pre-sale price when discounted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(rename = "price")]
    pub amount: f64,
    pub currency: String,
    pub compare_at_price: Option<f64>,
}

/// One purchasable variation of a product. Every field is optional;
/// sources rarely describe variants completely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub sku: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

/// The final, schema-validated product record.
///
/// List fields are required by the schema; a reasoning reply that omits
/// one fails validation rather than silently defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub key_features: Vec<String>,
    pub image_urls: Vec<String>,
    pub video_url: Option<String>,
    pub category: Category,
    pub brand: String,
    pub colors: Vec<String>,
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// The sentinel record substituted when a document cannot produce a
    /// valid product. Returned as a value so one bad input never aborts a
    /// batch.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            name: "Unknown Product".to_string(),
            price: Price {
                amount: 0.0,
                currency: "USD".to_string(),
                compare_at_price: None,
            },
            description: String::new(),
            key_features: Vec::new(),
            image_urls: Vec::new(),
            video_url: None,
            category: Category {
                name: "Uncategorized".to_string(),
            },
            brand: String::new(),
            colors: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Final normalization pass over a reconciled product.
    ///
    /// Re-validates the category name, scrubs non-product paths from
    /// `image_urls`, and when that leaves no images, promotes the first
    /// non-blocked variant image.
    pub fn normalize(&mut self, opts: &Options) {
        self.category = Category::sanitized(&self.category.name, opts.category_taxonomy.as_deref());

        self.image_urls.retain(|url| !path_is_blocked(url, opts));

        if self.image_urls.is_empty() {
            let promoted = self.variants.iter().find_map(|variant| {
                variant
                    .image_url
                    .as_ref()
                    .filter(|url| !path_is_blocked(url, opts))
                    .cloned()
            });
            if let Some(url) = promoted {
                self.image_urls.push(url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_product_sentinel() {
        let sentinel = Product::unknown();

        assert_eq!(sentinel.name, "Unknown Product");
        assert!((sentinel.price.amount - 0.0).abs() < f64::EPSILON);
        assert_eq!(sentinel.price.currency, "USD");
        assert_eq!(sentinel.price.compare_at_price, None);
        assert_eq!(sentinel.category.name, "Uncategorized");
        assert!(sentinel.image_urls.is_empty());
        assert!(sentinel.variants.is_empty());
    }

    #[test]
    fn test_category_sanitized() {
        assert_eq!(Category::sanitized("", None).name, "Uncategorized");
        assert_eq!(Category::sanitized("   ", None).name, "Uncategorized");
        assert_eq!(Category::sanitized("  Shoes  ", None).name, "Shoes");

        let taxonomy = vec!["Apparel & Accessories > Shoes".to_string()];
        // Off-taxonomy names are kept, never coerced
        assert_eq!(
            Category::sanitized("Running Shoes", Some(&taxonomy)).name,
            "Running Shoes"
        );
    }

    #[test]
    fn test_normalize_scrubs_blocked_paths() {
        let opts = Options::default();
        let mut product = Product::unknown();
        product.image_urls = vec![
            "https://cdn.example.com/email-signup/overlay.jpg".to_string(),
            "https://cdn.example.com/products/shoe.jpg".to_string(),
            "https://cdn.example.com/promo/sale.jpg".to_string(),
        ];

        product.normalize(&opts);

        assert_eq!(
            product.image_urls,
            vec!["https://cdn.example.com/products/shoe.jpg".to_string()]
        );
    }

    #[test]
    fn test_normalize_promotes_variant_image_when_empty() {
        let opts = Options::default();
        let mut product = Product::unknown();
        product.variants = vec![
            ProductVariant {
                image_url: Some("https://cdn.example.com/banner/x.jpg".to_string()),
                ..ProductVariant::default()
            },
            ProductVariant {
                image_url: Some("https://cdn.example.com/variants/red.jpg".to_string()),
                ..ProductVariant::default()
            },
        ];

        product.normalize(&opts);

        // The first variant image sits on a blocked path; the second is promoted
        assert_eq!(
            product.image_urls,
            vec!["https://cdn.example.com/variants/red.jpg".to_string()]
        );
    }

    #[test]
    fn test_normalize_keeps_existing_images() {
        let opts = Options::default();
        let mut product = Product::unknown();
        product.image_urls = vec!["https://cdn.example.com/shoe.jpg".to_string()];
        product.variants = vec![ProductVariant {
            image_url: Some("https://cdn.example.com/variants/red.jpg".to_string()),
            ..ProductVariant::default()
        }];

        product.normalize(&opts);

        assert_eq!(
            product.image_urls,
            vec!["https://cdn.example.com/shoe.jpg".to_string()]
        );
    }

    #[test]
    fn test_product_deserializes_schema_reply() {
        let reply = r#"{
            "name": "Trail Shoe",
            "price": {"price": 129.95, "currency": "USD", "compare_at_price": 159.95},
            "description": "Lightweight trail runner.",
            "key_features": ["Vibram sole"],
            "image_urls": ["https://cdn.example.com/shoe.jpg"],
            "video_url": null,
            "category": {"name": "Shoes"},
            "brand": "Acme",
            "colors": ["Black"],
            "variants": [{"sku": "TS-1", "color": "Black", "size": "10", "price": 129.95,
                          "image_url": "https://cdn.example.com/shoe-black.jpg"}]
        }"#;

        let product: Product = serde_json::from_str(reply).unwrap();
        assert_eq!(product.name, "Trail Shoe");
        assert!((product.price.amount - 129.95).abs() < f64::EPSILON);
        assert_eq!(product.price.compare_at_price, Some(159.95));
        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variants[0].sku.as_deref(), Some("TS-1"));
    }

    #[test]
    fn test_product_rejects_incomplete_reply() {
        // Missing required list fields must fail validation, not default
        let reply = r#"{"name": "Trail Shoe", "brand": "Acme"}"#;
        assert!(serde_json::from_str::<Product>(reply).is_err());
    }

    #[test]
    fn test_price_wire_format() {
        let price = Price {
            amount: 99.99,
            currency: "EUR".to_string(),
            compare_at_price: None,
        };
        let json = serde_json::to_value(&price).unwrap();

        assert_eq!(json["price"], 99.99);
        assert_eq!(json["currency"], "EUR");
        assert!(json["compare_at_price"].is_null());
    }
}
