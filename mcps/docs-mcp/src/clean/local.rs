//! Local HTML-to-text extraction
//!
//! Keeps the readable text of the main content region and drops scripts,
//! styles, navigation chrome, forms and tables. No network access.

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::TextCleaner;
use crate::error::DocsResult;

/// Elements whose whole subtree is discarded
const SKIPPED: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "aside", "svg", "form", "button",
    "iframe", "table", "head",
];

/// Page chrome, discarded only outside the content region
const CHROME: &[&str] = &["header", "footer"];

/// Elements that start a new line in the output
const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "main", "br", "li", "ul", "ol", "dl", "dt", "dd", "pre",
    "blockquote", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "figure", "figcaption", "details",
    "summary",
];

/// Content roots, tried in order before falling back to `body`
static CONTENT_ROOTS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["main", "article", "[role=main]", "body"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

static INLINE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}\r\f\v]+").unwrap());

/// HTML text extractor that needs no model
#[derive(Debug, Default, Clone)]
pub struct LocalExtractor;

impl LocalExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract readable text from an HTML document
    pub fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        let root = CONTENT_ROOTS
            .iter()
            .find_map(|selector| document.select(selector).next())
            .unwrap_or_else(|| document.root_element());

        let mut raw = String::new();
        collect_text(root, is_content(root), &mut raw);
        normalize(&raw)
    }
}

/// True for `main`, `article` and `role="main"` elements
fn is_content(element: ElementRef<'_>) -> bool {
    let el = element.value();
    matches!(el.name(), "main" | "article") || el.attr("role") == Some("main")
}

fn collect_text(element: ElementRef<'_>, in_content: bool, out: &mut String) {
    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if SKIPPED.contains(&name) || (!in_content && CHROME.contains(&name)) {
                continue;
            }
            let block = BLOCKS.contains(&name);
            if block {
                out.push('\n');
            }
            collect_text(el, in_content || is_content(el), out);
            if block {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

/// Collapse inline whitespace and drop blank lines
fn normalize(raw: &str) -> String {
    raw.lines()
        .map(|line| INLINE_WS.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl TextCleaner for LocalExtractor {
    fn name(&self) -> &str {
        "local"
    }

    async fn clean(&self, raw: &str) -> DocsResult<String> {
        Ok(self.extract(raw))
    }
}
