//! Compiled regex patterns for URL identity and embedded-script scanning.
//!
//! All patterns are compiled once at startup using `LazyLock` for efficiency.
//! Patterns are organized by their purpose in the extraction pipeline.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Asset Identity Patterns
// =============================================================================

/// Matches resolution-marker path segments that distinguish renditions of the
/// same underlying asset (`shoe-100x100.jpg`, `shoe_thumb.jpg`, `shoe-max.jpg`).
/// Stripping these from a query-less URL yields the asset identity key.
pub static RESOLUTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[-_](\d+x\d+|thumb|small|medium|max|large|original)")
        .expect("RESOLUTION_MARKER regex")
});

/// Matches explicit `<width>x<height>` dimension tokens anywhere in a URL,
/// capturing both numbers for resolution scoring.
pub static DIMENSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{2,4})x(\d{2,4})").expect("DIMENSION_TOKEN regex")
});

/// Matches sizing query parameters used by CDN templates (`?w=100`, `&imwidth=2000`),
/// capturing the numeric value for resolution scoring.
pub static QUERY_DIMENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[?&](?:w|h|width|height|sw|sh|imwidth|imheight|maxwidth|maxheight)=(\d{1,5})")
        .expect("QUERY_DIMENSION regex")
});

// =============================================================================
// Responsive Source Patterns
// =============================================================================

/// Matches the digits of a srcset descriptor (`1200w` -> 1200, `2x` -> 2).
pub static DESCRIPTOR_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("DESCRIPTOR_DIGITS regex"));

// =============================================================================
// Hydration Script Patterns
// =============================================================================

/// Matches global assignments to well-known hydration state variables.
/// The JSON object itself is recovered separately by brace-depth balancing
/// starting at the first `{` after the match.
pub static HYDRATION_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:window\.)?__(?:INITIAL_STATE|PRELOADED_STATE|NUXT|APOLLO_STATE)__\s*=")
        .expect("HYDRATION_ASSIGNMENT regex")
});

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Matches multiple whitespace characters for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex")
});

/// Matches multiple consecutive newlines.
pub static MULTIPLE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").expect("MULTIPLE_NEWLINES regex")
});
