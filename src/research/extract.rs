//! Markup to plain text.

use scraper::{Html, Node};

const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Elements that start a new line of text; inline elements never do.
const BLOCK_ELEMENTS: [&str; 34] = [
    "address", "article", "aside", "blockquote", "body", "br", "caption", "dd", "div", "dl",
    "dt", "figcaption", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Convert raw markup into a single line of normalized text.
///
/// Script and style content is discarded. Remaining text is split into lines,
/// each line into phrases on double spaces, and the non-empty phrases are
/// joined with single spaces. Parsing is lenient, so malformed markup degrades
/// to whatever text survives and input with no text yields an empty string.
#[must_use]
pub fn extract(markup: &str) -> String {
    if markup.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(markup);
    let mut raw = String::new();

    for node in document.tree.root().descendants() {
        match node.value() {
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => raw.push('\n'),
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
                });
                if !hidden {
                    raw.push_str(text);
                }
            }
            _ => {}
        }
    }

    flatten(&raw)
}

/// Collapse multi-line text into one line of phrases.
#[must_use]
pub fn flatten(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
