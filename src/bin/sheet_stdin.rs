//! Simple CLI that reads product-page HTML from stdin and outputs the
//! deterministic pipeline stages as JSON: truth sheet, distilled
//! Markdown, and filtered image candidates. No network access.

use dom_query::Document;
use rs_prodsheet::url_utils::path_is_blocked;
use rs_prodsheet::{build_truth_sheet, collect_image_urls, collect_signals, Options, TruthSheet};
use serde::Serialize;
use std::io::{self, Read};

#[derive(Serialize)]
struct SignalDigest {
    json_ld_blocks: usize,
    meta_tags: usize,
    data_attrs: usize,
    hydration_objects: usize,
}

#[derive(Serialize)]
struct Output {
    signals: SignalDigest,
    truth_sheet: TruthSheet,
    markdown: String,
    image_candidates: Vec<String>,
}

fn main() {
    // Read HTML from stdin
    let mut html = String::new();
    if io::stdin().read_to_string(&mut html).is_err() {
        eprintln!("Failed to read from stdin");
        std::process::exit(1);
    }

    let opts = Options::default();
    let doc = Document::from(html.as_str());

    let signals = collect_signals(&doc, &opts);
    let markdown = rs_prodsheet::distill::distill_document(&doc, &opts);
    let image_candidates: Vec<String> = collect_image_urls(&doc, opts.base_url.as_deref())
        .into_iter()
        .filter(|url| !path_is_blocked(url, &opts))
        .collect();

    let output = Output {
        signals: SignalDigest {
            json_ld_blocks: signals.json_ld.len(),
            meta_tags: signals.meta.len(),
            data_attrs: signals.data_attrs.len(),
            hydration_objects: signals.hydration.len(),
        },
        truth_sheet: build_truth_sheet(&signals, &opts),
        markdown,
        image_candidates,
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}
