//! Heuristic main-content distillation.
//!
//! Puts the page into reader mode: navigation, promos, and template
//! boilerplate are stripped and the surviving product story is rendered to
//! Markdown. The readability pass is recall-friendly by construction since
//! links, images, and tables all stay in by default (see
//! [`crate::options::Options`]).

use std::path::Path;

use dom_query::Document;
#[cfg(feature = "readability")]
use tracing::debug;

use crate::error::Result;
use crate::markdown;
use crate::metadata;
use crate::options::Options;

/// Distill raw HTML to condensed Markdown.
///
/// Empty or whitespace-only input yields an empty string, never an error.
/// A readability pass that finds no usable article also yields an empty
/// string; malformed HTML never panics.
#[must_use]
pub fn distill(html: &str, opts: &Options) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    distill_document(&Document::from(html), opts)
}

/// Distill an already-parsed document.
///
/// Without the `readability` feature the whole body is rendered instead,
/// links and boilerplate included.
#[must_use]
pub fn distill_document(doc: &Document, opts: &Options) -> String {
    #[cfg(feature = "readability")]
    {
        use dom_smoothie::Readability;

        match Readability::with_document(doc.clone(), None, None) {
            Ok(mut reader) => match reader.parse() {
                Ok(article) => {
                    let content_html = article.content.to_string();
                    let content_doc = Document::from(content_html);
                    markdown::render_markdown(&content_doc, opts)
                }
                Err(err) => {
                    debug!(error = %err, "readability found no article content");
                    String::new()
                }
            },
            Err(err) => {
                debug!(error = %err, "readability setup failed");
                String::new()
            }
        }
    }

    #[cfg(not(feature = "readability"))]
    {
        markdown::render_markdown(doc, opts)
    }
}

/// Distill a document read from disk.
///
/// A missing file is the only error; see [`distill`] for the rest of the
/// contract.
pub fn distill_file(path: &Path, opts: &Options) -> Result<String> {
    let doc = metadata::load_document(path)?;
    Ok(distill_document(&doc, opts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(distill("", &Options::default()), "");
    }

    #[test]
    fn test_whitespace_only_input_yields_empty_output() {
        assert_eq!(distill("   \n\t  ", &Options::default()), "");
    }

    #[test]
    fn test_article_body_survives() {
        let paragraph = "The Vaporfly 4 uses a full-length carbon plate over \
                         responsive ZoomX foam for aggressive toe-off. "
            .repeat(12);
        let html = format!(
            r#"<!DOCTYPE html>
            <html><head><title>Vaporfly 4</title></head>
            <body>
            <nav><a href="/">Home</a><a href="/sale">Sale</a></nav>
            <main><article>
                <h1>Vaporfly 4 Racing Shoe</h1>
                <p>{paragraph}</p>
                <p>{paragraph}</p>
            </article></main>
            <footer>Newsletter signup</footer>
            </body></html>"#
        );

        let md = distill(&html, &Options::default());
        assert!(!md.is_empty());
        assert!(md.contains("ZoomX"));
    }

    #[test]
    fn test_distill_file_missing() {
        let result = distill_file(Path::new("/nonexistent/page.html"), &Options::default());
        assert!(result.is_err());
    }
}
