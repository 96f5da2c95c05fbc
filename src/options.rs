//! Configuration options for the extraction pipeline.
//!
//! The `Options` struct controls extraction behavior: image quality policy,
//! probe limits, URL heuristics, and hydration-script search bounds. The
//! resolution-scoring tokens and non-product path blocklist are hand-tuned
//! against observed CDN conventions and are deliberately configuration, not
//! constants.

/// Configuration options for the extraction pipeline.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_prodsheet::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     allow_gif: true,
///     probe_concurrency: 4,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    // === Image quality policy ===
    /// Minimum pixel size both image dimensions must meet.
    ///
    /// Default: `500`
    pub min_side: u32,

    /// Lower bound (inclusive) of the accepted width/height aspect ratio.
    ///
    /// Default: `0.8`
    pub aspect_low: f64,

    /// Upper bound (inclusive) of the accepted width/height aspect ratio.
    ///
    /// Default: `1.25`
    pub aspect_high: f64,

    /// Accept `gif` in the image extension allow-list.
    ///
    /// Observed site revisions disagree on whether animated formats count
    /// as product imagery, so this is a toggle rather than a constant.
    ///
    /// Default: `false`
    pub allow_gif: bool,

    // === Probe limits ===
    /// Maximum concurrent in-flight dimension probes.
    ///
    /// Default: `10`
    pub probe_concurrency: usize,

    /// Maximum bytes read per probe; only header bytes are needed to
    /// decode pixel dimensions.
    ///
    /// Default: `65536` (64 KiB)
    pub probe_read_limit: usize,

    /// Per-probe timeout in seconds. Short, since only header bytes are read.
    ///
    /// Default: `5`
    pub probe_timeout_secs: u64,

    /// User-Agent sent with dimension probes. A browser-like value reduces
    /// CDN blocking.
    pub probe_user_agent: String,

    // === URL resolution ===
    /// Base URL for resolving relative image references.
    ///
    /// When absent, an in-document `<base href>` is used; with neither,
    /// relative URLs are discarded.
    ///
    /// Default: `None`
    pub base_url: Option<String>,

    // === Path heuristics (policy, not protocol) ===
    /// Case-insensitive substrings marking non-product asset paths
    /// (marketing chrome, signup banners). URLs whose path contains any
    /// of these are dropped from product image lists.
    pub blocked_path_markers: Vec<String>,

    /// Tokens that penalize a URL in resolution scoring (thumbnail and
    /// small-rendition indicators).
    pub small_resolution_markers: Vec<String>,

    /// Tokens that reward a URL in resolution scoring (full-size and
    /// product-detail-page indicators).
    pub large_resolution_markers: Vec<String>,

    /// Explicit `WxH` tokens with both sides below this count as a
    /// small-rendition penalty in resolution scoring.
    ///
    /// Default: `400`
    pub score_small_dimension: u32,

    /// Explicit `WxH` tokens with both sides at or above this count as a
    /// full-size reward in resolution scoring.
    ///
    /// Default: `800`
    pub score_large_dimension: u32,

    // === Metadata harvesting ===
    /// Keywords gating `data-*` attribute harvesting: an attribute is kept
    /// when its lowercased name contains any of these.
    pub data_attr_keywords: Vec<String>,

    /// Keys the bounded-depth hydration search looks for in embedded JSON.
    pub hydration_keys: Vec<String>,

    /// Maximum recursion depth of the hydration key search.
    ///
    /// Default: `4`
    pub hydration_depth: usize,

    // === Distillation ===
    /// Preserve link URLs in distilled Markdown.
    ///
    /// Default: `true`
    pub include_links: bool,

    /// Preserve image references in distilled Markdown.
    ///
    /// Default: `true`
    pub include_images: bool,

    /// Preserve tables in distilled Markdown.
    ///
    /// Default: `true`
    pub include_tables: bool,

    // === Reconciliation ===
    /// Currency assumed when an offer omits one.
    ///
    /// Default: `"USD"`
    pub default_currency: String,

    /// Optional category taxonomy allow-list, loaded once at process start
    /// and injected. Names outside the list are kept as-is (no substring
    /// coercion); only empty names fall back to "Uncategorized".
    ///
    /// Default: `None`
    pub category_taxonomy: Option<Vec<String>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_side: 500,
            aspect_low: 0.8,
            aspect_high: 1.25,
            allow_gif: false,
            probe_concurrency: 10,
            probe_read_limit: 64 * 1024,
            probe_timeout_secs: 5,
            probe_user_agent: concat!(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) ",
                "AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            )
            .to_string(),
            base_url: None,
            blocked_path_markers: vec![
                "email-signup".to_string(),
                "email_signup".to_string(),
                "banner".to_string(),
                "promo".to_string(),
                "newsletter".to_string(),
            ],
            small_resolution_markers: vec![
                "thumb".to_string(),
                "small".to_string(),
                "default".to_string(),
                "mini".to_string(),
                "tiny".to_string(),
                "icon".to_string(),
                "swatch".to_string(),
            ],
            large_resolution_markers: vec![
                "pdp".to_string(),
                "large".to_string(),
                "original".to_string(),
                "hero".to_string(),
                "full".to_string(),
                "zoom".to_string(),
            ],
            score_small_dimension: 400,
            score_large_dimension: 800,
            data_attr_keywords: vec![
                "product".to_string(),
                "price".to_string(),
                "sku".to_string(),
                "id".to_string(),
                "image".to_string(),
                "brand".to_string(),
            ],
            hydration_keys: vec![
                "color".to_string(),
                "colors".to_string(),
                "colorway".to_string(),
                "variant".to_string(),
                "variants".to_string(),
                "image".to_string(),
                "images".to_string(),
                "media".to_string(),
                "gallery".to_string(),
                "sku".to_string(),
            ],
            hydration_depth: 4,
            include_links: true,
            include_images: true,
            include_tables: true,
            default_currency: "USD".to_string(),
            category_taxonomy: None,
        }
    }
}

impl Options {
    /// Image file extensions accepted by the quality filter, honoring the
    /// gif toggle.
    #[must_use]
    pub fn allowed_extensions(&self) -> Vec<&'static str> {
        let mut exts = vec!["jpeg", "jpg", "png", "webp"];
        if self.allow_gif {
            exts.push("gif");
        }
        exts
    }
}
