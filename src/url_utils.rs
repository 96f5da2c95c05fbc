//! URL identity and resolution-scoring helpers.
//!
//! This module provides URL validation and resolution utilities plus the
//! image-specific heuristics the pipeline is built on: a stable per-asset
//! identity key (path with query and resolution markers stripped) and a
//! resolution-preference score computed from URL tokens alone.

use std::collections::HashMap;

use url::Url;

use crate::options::Options;
use crate::patterns::{DIMENSION_TOKEN, QUERY_DIMENSION, RESOLUTION_MARKER};

/// Check if a string is a valid absolute URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() {
        return (false, None);
    }

    // Must start with http:// or https://
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) => {
            // Verify it has a host
            if url.host().is_some() {
                (true, Some(url))
            } else {
                (false, None)
            }
        }
        Err(_) => (false, None),
    }
}

/// Convert a relative or absolute URL to absolute form.
///
/// # Arguments
/// * `url_str` - The URL to resolve (can be relative or absolute)
/// * `base` - The base URL for resolution
///
/// # Returns
/// * The absolute URL string, or the original if resolution fails
#[must_use]
pub fn create_absolute_url(url_str: &str, base: &Url) -> String {
    let url_str = url_str.trim();

    if url_str.is_empty() {
        return String::new();
    }

    // Preserve special URLs unchanged
    if url_str.starts_with("data:")
        || url_str.starts_with("javascript:")
        || url_str.starts_with("mailto:")
        || url_str.starts_with("tel:")
    {
        return url_str.to_string();
    }

    // If already absolute, return as-is
    let (is_abs, _) = is_absolute_url(url_str);
    if is_abs {
        return url_str.to_string();
    }

    // Resolve relative URL against base
    match base.join(url_str) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => url_str.to_string(),
    }
}

/// Normalize a raw image reference into an accepted absolute URL.
///
/// Relative references are resolved against `base` when one is available and
/// discarded otherwise; protocol-relative references (`//host/path`) are
/// rewritten to `https://`. A URL is accepted only when it is absolute
/// `http(s)` and has a non-empty path after stripping slashes (a bare host
/// is never an image).
#[must_use]
pub fn normalize_image_url(raw: &str, base: Option<&Url>) -> Option<String> {
    let mut url = raw.trim().to_string();
    if url.is_empty() {
        return None;
    }

    if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with("//") {
        let base = base?;
        url = create_absolute_url(&url, base);
    }

    if let Some(rest) = url.strip_prefix("//") {
        url = format!("https://{rest}");
    }

    let (is_abs, parsed) = is_absolute_url(&url);
    if !is_abs {
        return None;
    }
    let parsed = parsed?;
    if parsed.path().trim_matches('/').is_empty() {
        return None;
    }

    Some(url)
}

/// Compute the asset identity key for an image URL.
///
/// The query string is stripped, then resolution-marker segments
/// (`-100x100`, `_thumb`, `-large`, ...) are removed, so that multiple
/// renditions of the same underlying asset share one key.
#[must_use]
pub fn asset_identity(url: &str) -> String {
    let base = url.split('?').next().unwrap_or(url);
    RESOLUTION_MARKER.replace_all(base, "").to_string()
}

/// Deduplicate image URLs by asset identity, keeping the longest URL per
/// identity group (a heuristic proxy for the highest-fidelity rendition).
/// Identity groups keep their first-encounter order.
#[must_use]
pub fn dedupe_by_identity(urls: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, String> = HashMap::new();

    for url in urls {
        let identity = asset_identity(url);
        match best.get(&identity) {
            Some(existing) if existing.len() >= url.len() => {}
            Some(_) => {
                best.insert(identity, url.clone());
            }
            None => {
                order.push(identity.clone());
                best.insert(identity, url.clone());
            }
        }
    }

    order.into_iter().filter_map(|k| best.remove(&k)).collect()
}

/// Score a URL's likely rendition quality from its tokens alone.
///
/// Thumbnail/small/default indicators and explicit small `WxH` or sizing
/// query parameters push the score down; product-detail-page, full-size,
/// and large-dimension tokens push it up. Scores only order renditions of
/// the same asset; absolute values carry no meaning.
#[must_use]
pub fn resolution_score(url: &str, opts: &Options) -> i64 {
    let lower = url.to_lowercase();
    let mut score: i64 = 0;

    for marker in &opts.small_resolution_markers {
        if lower.contains(marker.as_str()) {
            score -= 60;
        }
    }
    for marker in &opts.large_resolution_markers {
        if lower.contains(marker.as_str()) {
            score += 80;
        }
    }

    // Explicit WxH tokens in CDN path templates
    if let Some(caps) = DIMENSION_TOKEN.captures(&lower) {
        let w: u32 = caps.get(1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let h: u32 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let side = w.min(h);
        if side < opts.score_small_dimension {
            score -= 80;
        } else if side >= opts.score_large_dimension {
            score += 60;
        }
    }

    // Sizing query parameters (?w=100, &imwidth=2000)
    for caps in QUERY_DIMENSION.captures_iter(&lower) {
        let val: u32 = caps.get(1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        if val < opts.score_small_dimension {
            score -= 40;
        } else if val >= opts.score_large_dimension {
            score += 40;
        }
    }

    score
}

/// Check whether a URL's path marks it as non-product imagery.
///
/// Marketing chrome (email-signup banners, promo tiles) routinely appears
/// among page images; any URL whose path contains a blocklist substring,
/// case-insensitive, is dropped from product image lists. Only the path is
/// examined, so a query parameter mentioning a marker does not block.
#[must_use]
pub fn path_is_blocked(url: &str, opts: &Options) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_lowercase(),
    };
    opts.blocked_path_markers
        .iter()
        .any(|marker| path.contains(&marker.to_lowercase()))
}

/// Check whether a URL's path extension is in the image allow-list.
///
/// The extension is taken from the path only (query string and fragment
/// ignored), matched case-insensitively. URLs without an extension are
/// rejected so they never trigger a network probe.
#[must_use]
pub fn extension_allowed(url: &str, opts: &Options) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let Some(last_segment) = path.rsplit('/').next() else {
        return false;
    };
    let Some((_, ext)) = last_segment.rsplit_once('.') else {
        return false;
    };
    if ext.is_empty() {
        return false;
    }
    let ext = ext.to_ascii_lowercase();
    opts.allowed_extensions().contains(&ext.as_str())
}
