//! HTML to Markdown rendering.
//!
//! Renders a parsed document (usually the output of readability
//! distillation) into compact Markdown. Links, images, and tables are
//! individually toggleable; script/style subtrees never contribute text.

use dom_query::{Document, NodeRef, Selection};
use tendril::StrTendril;

use crate::options::Options;
use crate::patterns::{MULTIPLE_NEWLINES, WHITESPACE_NORMALIZE};

/// Characters that have special meaning in Markdown and need escaping.
const MARKDOWN_SPECIAL_CHARS: &[char] = &['\\', '*', '_', '[', ']', '<', '>'];

/// Subtrees that never contribute rendered text.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "head",
];

/// Render a document's body to Markdown.
///
/// Output is tidied: runs of whitespace collapse inside text, three or more
/// consecutive newlines collapse to a blank line, and the result is trimmed.
/// An empty body yields an empty string.
#[must_use]
pub fn render_markdown(doc: &Document, opts: &Options) -> String {
    let body = doc.select("body");
    let mut out = String::new();
    if let Some(node) = body.nodes().first() {
        render_block_children(node, &mut out, opts);
    }
    tidy_markdown(&out)
}

/// Escape Markdown special characters in text content.
///
/// Prevents literal asterisks, underscores, and brackets in page text from
/// being interpreted as formatting. Code spans skip escaping.
#[must_use]
pub fn escape_markdown(text: &str, in_code: bool) -> String {
    if in_code || text.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if MARKDOWN_SPECIAL_CHARS.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

fn tidy_markdown(raw: &str) -> String {
    let collapsed = MULTIPLE_NEWLINES.replace_all(raw, "\n\n");
    collapsed.trim().to_string()
}

fn tag_of(node: &NodeRef) -> String {
    node.node_name()
        .map(|n| n.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Compare a raw parser tag name against a target list without allocating.
fn tag_name_in(name: &StrTendril, targets: &[&str]) -> bool {
    targets.iter().any(|t| name.eq_ignore_ascii_case(t))
}

fn is_skipped(node: &NodeRef) -> bool {
    node.node_name()
        .is_some_and(|name| tag_name_in(&name, SKIPPED_TAGS))
}

fn ensure_blank_line(out: &mut String) {
    if out.is_empty() {
        return;
    }
    while !out.ends_with("\n\n") {
        out.push('\n');
    }
}

/// Append one text node, collapsing whitespace runs to single spaces.
fn push_text(text: &str, out: &mut String) {
    let normalized = WHITESPACE_NORMALIZE.replace_all(text, " ");
    if normalized.trim().is_empty() {
        // Inter-element whitespace only separates words, never stacks
        if !out.is_empty() && !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        return;
    }
    out.push_str(&escape_markdown(&normalized, false));
}

fn render_block_children(root: &NodeRef, out: &mut String, opts: &Options) {
    for child in root.children() {
        if child.is_text() {
            let text = child.text();
            push_text(&text, out);
            continue;
        }
        if !child.is_element() {
            continue;
        }

        if is_skipped(&child) {
            continue;
        }
        let tag = tag_of(&child);
        let el = Selection::from(child.clone());

        match tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag
                    .trim_start_matches('h')
                    .parse::<usize>()
                    .unwrap_or(1)
                    .min(6);
                let text = inline_text(&child, opts);
                if !text.is_empty() {
                    ensure_blank_line(out);
                    out.push_str(&"#".repeat(level));
                    out.push(' ');
                    out.push_str(&text);
                    out.push_str("\n\n");
                }
            }
            "p" => {
                ensure_blank_line(out);
                render_inline_children(&child, out, opts);
                out.push_str("\n\n");
            }
            "br" => out.push('\n'),
            "hr" => {
                ensure_blank_line(out);
                out.push_str("---\n\n");
            }
            "ul" => render_list(&child, out, opts, false, 0),
            "ol" => render_list(&child, out, opts, true, 0),
            "li" => {
                // A stray item outside any list still renders as one
                let text = inline_text(&child, opts);
                if !text.is_empty() {
                    out.push_str("- ");
                    out.push_str(&text);
                    out.push('\n');
                }
            }
            "blockquote" => {
                let mut inner = String::new();
                render_block_children(&child, &mut inner, opts);
                let inner = tidy_markdown(&inner);
                if !inner.is_empty() {
                    ensure_blank_line(out);
                    for line in inner.lines() {
                        out.push_str("> ");
                        out.push_str(line);
                        out.push('\n');
                    }
                    out.push('\n');
                }
            }
            "pre" => {
                let code = child.text();
                let code = code.trim_end();
                if !code.trim().is_empty() {
                    ensure_blank_line(out);
                    out.push_str("```\n");
                    out.push_str(code);
                    out.push_str("\n```\n\n");
                }
            }
            "table" => {
                if opts.include_tables {
                    let table = table_to_markdown(&el);
                    if !table.is_empty() {
                        ensure_blank_line(out);
                        out.push_str(&table);
                        out.push('\n');
                    }
                }
            }
            "a" | "strong" | "b" | "em" | "i" | "code" | "span" | "u" | "small" | "sup"
            | "sub" | "label" | "time" | "abbr" => {
                render_inline(&child, &tag, out, opts);
            }
            "img" | "picture" | "source" => {
                if tag == "img" && opts.include_images {
                    push_image(&el, out);
                }
            }
            _ => {
                // Generic containers (div, section, article, main, ...)
                ensure_block_separation(out);
                render_block_children(&child, out, opts);
                ensure_block_separation(out);
            }
        }
    }
}

fn ensure_block_separation(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn render_inline_children(root: &NodeRef, out: &mut String, opts: &Options) {
    for child in root.children() {
        if child.is_text() {
            let text = child.text();
            push_text(&text, out);
            continue;
        }
        if !child.is_element() {
            continue;
        }

        if is_skipped(&child) {
            continue;
        }
        let tag = tag_of(&child);
        // Nested block structures are rendered by their own block pass
        if matches!(tag.as_str(), "ul" | "ol" | "table") {
            continue;
        }
        if tag == "br" {
            out.push('\n');
            continue;
        }
        render_inline(&child, &tag, out, opts);
    }
}

fn render_inline(node: &NodeRef, tag: &str, out: &mut String, opts: &Options) {
    let el = Selection::from(node.clone());

    match tag {
        "strong" | "b" => {
            let inner = inline_text(node, opts);
            if !inner.is_empty() {
                out.push_str("**");
                out.push_str(&inner);
                out.push_str("**");
            }
        }
        "em" | "i" => {
            let inner = inline_text(node, opts);
            if !inner.is_empty() {
                out.push('*');
                out.push_str(&inner);
                out.push('*');
            }
        }
        "code" => {
            let code = node.text();
            let code = code.trim();
            if !code.is_empty() {
                out.push('`');
                out.push_str(code);
                out.push('`');
            }
        }
        "a" => {
            let inner = inline_text(node, opts);
            let href = el.attr("href").map(|h| h.to_string()).unwrap_or_default();
            if opts.include_links && !href.is_empty() && !inner.is_empty() {
                out.push('[');
                out.push_str(&inner);
                out.push_str("](");
                out.push_str(&href);
                out.push(')');
            } else {
                out.push_str(&inner);
            }
        }
        "img" => {
            if opts.include_images {
                push_image(&el, out);
            }
        }
        _ => render_inline_children(node, out, opts),
    }
}

fn push_image(el: &Selection, out: &mut String) {
    let src = el
        .attr("src")
        .or_else(|| el.attr("data-src"))
        .map(|s| s.to_string())
        .unwrap_or_default();
    if src.is_empty() {
        return;
    }
    let alt = el.attr("alt").map(|a| a.to_string()).unwrap_or_default();
    out.push_str("![");
    out.push_str(&escape_markdown(alt.trim(), false));
    out.push_str("](");
    out.push_str(&src);
    out.push(')');
}

fn inline_text(node: &NodeRef, opts: &Options) -> String {
    let mut buf = String::new();
    render_inline_children(node, &mut buf, opts);
    buf.trim().to_string()
}

fn render_list(node: &NodeRef, out: &mut String, opts: &Options, ordered: bool, depth: usize) {
    if depth == 0 {
        ensure_blank_line(out);
    }

    let mut index = 1usize;
    for child in node.children() {
        if !child.is_element() || tag_of(&child) != "li" {
            continue;
        }

        let text = inline_text(&child, opts);
        if !text.is_empty() {
            out.push_str(&"  ".repeat(depth));
            if ordered {
                out.push_str(&format!("{index}. "));
                index += 1;
            } else {
                out.push_str("- ");
            }
            out.push_str(&text);
            out.push('\n');
        }

        // Sub-lists nest under their parent item
        for sub in child.children() {
            if !sub.is_element() {
                continue;
            }
            match tag_of(&sub).as_str() {
                "ul" => render_list(&sub, out, opts, false, depth + 1),
                "ol" => render_list(&sub, out, opts, true, depth + 1),
                _ => {}
            }
        }
    }

    if depth == 0 {
        out.push('\n');
    }
}

/// Convert a table element to GitHub Flavored Markdown.
///
/// The first row (from `thead` when present, else the first body row) is
/// treated as the header; pipes in cell text are escaped.
fn table_to_markdown(table: &Selection) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();

    for tr in table.select("thead tr").iter() {
        let row = collect_cells(&tr);
        if !row.is_empty() {
            rows.push(row);
        }
    }
    for tr in table.select("tbody tr").iter() {
        let row = collect_cells(&tr);
        if !row.is_empty() {
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return String::new();
    }

    let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![3usize; col_count];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for (row_idx, row) in rows.iter().enumerate() {
        out.push('|');
        for col in 0..col_count {
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            let pad = widths[col].saturating_sub(cell.chars().count());
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out.push('\n');

        if row_idx == 0 {
            out.push('|');
            for width in widths.iter().take(col_count) {
                out.push(' ');
                out.push_str(&"-".repeat(*width));
                out.push_str(" |");
            }
            out.push('\n');
        }
    }

    out
}

fn collect_cells(tr: &Selection) -> Vec<String> {
    tr.select("td, th")
        .iter()
        .map(|cell| {
            let text = cell.text();
            WHITESPACE_NORMALIZE
                .replace_all(text.trim(), " ")
                .replace('|', "\\|")
        })
        .collect()
}
