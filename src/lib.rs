//! # rs-prodsheet
//!
//! Hybrid product extraction and reconciliation pipeline for e-commerce
//! HTML.
//!
//! Given a saved product page, the pipeline:
//!
//! 1. harvests machine-readable signals: JSON-LD blocks, meta tags,
//!    product-like `data-*` attributes, and embedded hydration state
//! 2. distills the page body into condensed Markdown
//! 3. collects image candidates and verifies their pixel dimensions
//!    against a quality policy
//! 4. builds a deterministic truth sheet from the signals
//! 5. reconciles everything into a final [`Product`] through an external
//!    reasoning service, falling back to a sentinel record so a bad input
//!    never aborts a batch
//!
//! ## Quick Start
//!
//! The deterministic half works without any network access:
//!
//! ```rust
//! use dom_query::Document;
//! use rs_prodsheet::{build_truth_sheet, collect_signals, Options};
//!
//! let html = r#"<html><head><script type="application/ld+json">
//! {"@type": "Product", "name": "Trail Shoe",
//!  "offers": {"price": 99.99, "priceCurrency": "USD"}}
//! </script></head><body></body></html>"#;
//!
//! let opts = Options::default();
//! let doc = Document::from(html);
//! let signals = collect_signals(&doc, &opts);
//! let sheet = build_truth_sheet(&signals, &opts);
//! assert_eq!(sheet.name.as_deref(), Some("Trail Shoe"));
//! ```
//!
//! The full run is [`reconcile::Pipeline::run`], which additionally needs
//! a [`reconcile::Reasoner`] implementation (the bundled
//! [`reconcile::OpenRouterClient`] or a stub).

mod error;
mod options;
mod patterns;

/// Readability-mode content distillation to Markdown.
pub mod distill;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Batch export of reconciled products.
pub mod export;

/// Image candidate collection, srcset parsing, and dimension probing.
pub mod images;

/// HTML-to-Markdown rendering used by the distiller.
pub mod markdown;

/// Raw signal harvesting (JSON-LD, meta tags, data-* attributes,
/// hydration state).
pub mod metadata;

/// Final product schema and sentinel.
pub mod product;

/// Orchestration: per-document pipeline, batch driver, reasoning client.
pub mod reconcile;

/// Truth-sheet construction from raw signals.
pub mod truth_sheet;

/// URL identity, resolution scoring, and path policy helpers.
pub mod url_utils;

// Public API - re-exports
pub use error::{Error, Result};
pub use export::export_products;
pub use images::{collect_image_urls, ImageProber};
pub use metadata::{collect_signals, RawSignals};
pub use options::Options;
pub use product::{Category, Price, Product, ProductVariant};
pub use reconcile::{DocumentOutcome, OpenRouterClient, Pipeline, Reasoner};
pub use truth_sheet::{build_truth_sheet, TruthSheet};
