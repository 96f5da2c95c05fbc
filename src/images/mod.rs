//! Image candidate collection and verification.
//!
//! Images go through three stages: [`collect`] gathers candidate URLs from
//! markup, meta tags, and structured data; the cheap URL-level checks in
//! [`crate::url_utils`] prune obvious non-images; [`probe`] fetches header
//! bytes to verify real pixel dimensions against the quality policy.

pub mod collect;
pub mod probe;
pub mod srcset;

pub use collect::{collect_image_urls, collect_image_urls_from_file};
pub use probe::{passes_quality, ImageProber, ProbeOutcome};
pub use srcset::parse_best_from_srcset;
