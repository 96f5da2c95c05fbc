use dom_query::Document;
use rs_prodsheet::collect_image_urls;
use rs_prodsheet::images::collect_image_urls_from_file;

/// All four candidate sources contribute to one deduplicated list:
/// img attributes, srcset, social meta tags, and structured markup.
#[test]
fn candidates_gathered_from_every_source() {
    let html = r#"<html>
<head>
    <meta property="og:image" content="https://cdn.example.com/social/hero.jpg">
    <script type="application/ld+json">
    {"@type": "Product", "name": "Shoe",
     "image": ["https://cdn.example.com/ld/front.jpg",
               "https://cdn.example.com/ld/back.jpg"]}
    </script>
</head>
<body>
    <img src="https://cdn.example.com/img/main.jpg">
    <img data-src="https://cdn.example.com/img/lazy.jpg">
    <img srcset="https://cdn.example.com/img/side-400.jpg 400w,
                 https://cdn.example.com/img/side-900.jpg 900w">
</body>
</html>"#;

    let doc = Document::from(html);
    let urls = collect_image_urls(&doc, None);

    assert!(urls.contains(&"https://cdn.example.com/img/main.jpg".to_string()));
    assert!(urls.contains(&"https://cdn.example.com/img/lazy.jpg".to_string()));
    assert!(urls.contains(&"https://cdn.example.com/social/hero.jpg".to_string()));
    assert!(urls.contains(&"https://cdn.example.com/ld/front.jpg".to_string()));
    assert!(urls.contains(&"https://cdn.example.com/ld/back.jpg".to_string()));

    // Only the largest srcset entry is taken
    assert!(urls.contains(&"https://cdn.example.com/img/side-900.jpg".to_string()));
    assert!(!urls.contains(&"https://cdn.example.com/img/side-400.jpg".to_string()));
}

/// Relative references resolve against a base tag in the document.
#[test]
fn relative_urls_resolve_against_base_tag() {
    let html = r#"<html>
<head><base href="https://shop.example.com/products/"></head>
<body><img src="../media/shoe.jpg"></body>
</html>"#;

    let doc = Document::from(html);
    let urls = collect_image_urls(&doc, None);

    assert_eq!(urls, vec!["https://shop.example.com/media/shoe.jpg".to_string()]);
}

/// An explicit base URL parameter takes precedence over the base tag.
#[test]
fn explicit_base_overrides_base_tag() {
    let html = r#"<html>
<head><base href="https://wrong.example.com/"></head>
<body><img src="/media/shoe.jpg"></body>
</html>"#;

    let doc = Document::from(html);
    let urls = collect_image_urls(&doc, Some("https://right.example.com"));

    assert_eq!(urls, vec!["https://right.example.com/media/shoe.jpg".to_string()]);
}

/// Renditions of one asset collapse to the longest URL, in first-seen order.
#[test]
fn renditions_collapse_by_asset_identity() {
    let html = r#"<html><body>
    <img src="https://cdn.example.com/p/shoe_100x100.jpg">
    <img src="https://cdn.example.com/p/shoe_1200x1200.jpg">
    <img src="https://cdn.example.com/p/other.jpg">
    </body></html>"#;

    let doc = Document::from(html);
    let urls = collect_image_urls(&doc, None);

    assert_eq!(
        urls,
        vec![
            "https://cdn.example.com/p/shoe_1200x1200.jpg".to_string(),
            "https://cdn.example.com/p/other.jpg".to_string(),
        ]
    );
}

/// The same asset referenced by img, meta, and markup appears once.
#[test]
fn duplicate_across_sources_appears_once() {
    let html = r#"<html>
<head>
    <meta property="og:image" content="https://cdn.example.com/p/shoe.jpg">
    <script type="application/ld+json">
    {"@type": "Product", "image": "https://cdn.example.com/p/shoe.jpg"}
    </script>
</head>
<body><img src="https://cdn.example.com/p/shoe.jpg"></body>
</html>"#;

    let doc = Document::from(html);
    let urls = collect_image_urls(&doc, None);

    assert_eq!(urls, vec!["https://cdn.example.com/p/shoe.jpg".to_string()]);
}

/// Protocol-relative references are promoted to https.
#[test]
fn protocol_relative_promoted_to_https() {
    let html = r#"<html><body>
    <img src="//cdn.example.com/p/shoe.jpg">
    </body></html>"#;

    let doc = Document::from(html);
    let urls = collect_image_urls(&doc, None);

    assert_eq!(urls, vec!["https://cdn.example.com/p/shoe.jpg".to_string()]);
}

/// Without any base, relative references are discarded rather than kept
/// as unusable strings.
#[test]
fn relative_urls_without_base_discarded() {
    let html = r#"<html><body>
    <img src="/media/shoe.jpg">
    <img src="https://cdn.example.com/abs.jpg">
    </body></html>"#;

    let doc = Document::from(html);
    let urls = collect_image_urls(&doc, None);

    assert_eq!(urls, vec!["https://cdn.example.com/abs.jpg".to_string()]);
}

/// File-based collection reads, transcodes, and parses in one call.
#[test]
fn collection_from_file_round() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("page.html");
    std::fs::write(
        &path,
        r#"<html><body><img src="https://cdn.example.com/p/shoe.jpg"></body></html>"#,
    )
    .expect("write fixture");

    let urls = collect_image_urls_from_file(&path, None).expect("collect");
    assert_eq!(urls, vec!["https://cdn.example.com/p/shoe.jpg".to_string()]);
}
