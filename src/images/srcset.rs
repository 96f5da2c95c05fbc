//! Responsive-source list parsing.

use crate::patterns::DESCRIPTOR_DIGITS;

/// Pick the highest-resolution URL from a `srcset` list.
///
/// Entries are comma-separated `url [descriptor]` pairs. Candidates are
/// ranked by the leading digits of their descriptor (`1200w` scores 1200,
/// `2x` scores 2, no descriptor scores 0); ties keep the first-listed
/// entry.
#[must_use]
pub fn parse_best_from_srcset(srcset: &str) -> Option<String> {
    let mut best: Option<(u64, &str)> = None;

    for entry in srcset.split(',') {
        let mut parts = entry.split_whitespace();
        let Some(url) = parts.next() else {
            continue;
        };

        let score = parts
            .next()
            .and_then(|descriptor| DESCRIPTOR_DIGITS.find(descriptor))
            .and_then(|digits| digits.as_str().parse::<u64>().ok())
            .unwrap_or(0);

        match best {
            Some((best_score, _)) if best_score >= score => {}
            _ => best = Some((score, url)),
        }
    }

    best.map(|(_, url)| url.to_string())
}
