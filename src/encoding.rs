//! Charset detection and UTF-8 transcoding for saved HTML documents.
//!
//! Input documents are files scraped from live storefronts, so the bytes
//! arrive in whatever encoding the origin server produced. Detection follows
//! the order browsers use during prescan: byte-order mark first, then a
//! `charset=` declaration in the head of the document, then the UTF-8
//! default.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Match a `charset=` declaration, covering both `<meta charset="...">`
/// and `<meta http-equiv="Content-Type" content="...; charset=...">` forms.
#[allow(clippy::expect_used)]
static CHARSET_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([a-zA-Z0-9_.:-]+)"#).expect("valid regex"));

/// How many leading bytes to scan for a charset declaration.
const SNIFF_WINDOW: usize = 2048;

/// Detect the character encoding of raw HTML bytes.
///
/// Checks for a byte-order mark first, then scans the head of the document
/// for a `charset=` declaration, and falls back to UTF-8 when neither is
/// present.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = &html[..html.len().min(SNIFF_WINDOW)];
    let head_str = String::from_utf8_lossy(head);

    if let Some(label) = CHARSET_DECL_RE
        .captures(&head_str)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return encoding;
        }
    }

    UTF_8
}

/// Decode raw HTML bytes to a UTF-8 string.
///
/// Invalid sequences are replaced with the Unicode replacement character
/// rather than failing, and a leading byte-order mark is stripped.
///
/// # Examples
///
/// ```
/// use rs_prodsheet::encoding::transcode_to_utf8;
///
/// let html = b"<html><body>Nike Air Max</body></html>";
/// assert!(transcode_to_utf8(html).contains("Nike Air Max"));
/// ```
#[must_use]
pub fn transcode_to_utf8(html: &[u8]) -> String {
    let encoding = detect_encoding(html);
    let (decoded, _encoding_used, _had_errors) = encoding.decode(html);
    decoded.into_owned()
}
