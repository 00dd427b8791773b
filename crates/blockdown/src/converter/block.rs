//! Block-level element converters: page containers, paragraphs with
//! cross-page continuation, headings, quotes and code blocks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::Node;
use crate::options::ConversionOptions;
use crate::text;

/// Markdown emitted for `<hr>`.
pub const HORIZONTAL_RULE: &str = "\n\n---\n\n";

/// Class marking a paragraph continued on the next page.
const CONTINUATION_CLASS: &str = "has-continuation";

/// A lowercase letter or digit followed by a hyphen-like glyph at the very end,
/// optionally followed by one whitespace character.
static HYPHENATED_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Ll}\d][-—¬]\s?$").expect("valid hyphenation regex"));
static TRAILING_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-—¬]\s?$").expect("valid trailing hyphen regex"));

/// Upstream block kind carried in the `block-type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Plain running text.
    Text,
    /// Running text containing inline math.
    TextInlineMath,
    /// A group of list items.
    ListGroup,
    /// Any other (or missing) kind.
    Other,
}

impl BlockKind {
    /// Parse the `block-type` attribute value.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("Text") => Self::Text,
            Some("TextInlineMath") => Self::TextInlineMath,
            Some("ListGroup") => Self::ListGroup,
            _ => Self::Other,
        }
    }

    /// The two plain-text kinds that join across pages with a space.
    pub const fn is_plain_text(self) -> bool {
        matches!(self, Self::Text | Self::TextInlineMath)
    }
}

/// `<div>`: page containers become pagination markers when enabled; any
/// other div ends with a blank line.
pub(crate) fn convert_div(node: &Node, text: &str, options: &ConversionOptions) -> String {
    let is_page = node.classes().next() == Some("page");

    if options.paginate_output && is_page {
        let page_id = node.attr("data-page-id").unwrap_or_default();
        return format!("\n\n{{{page_id}}}{}\n\n{text}", options.page_separator);
    }

    if text.is_empty() { String::new() } else { format!("{text}\n\n") }
}

/// `<p>`: continuation paragraphs join the next page's paragraph instead of
/// ending with a blank line.
pub(crate) fn convert_paragraph(node: &Node, text: String) -> String {
    if node.has_class(CONTINUATION_CLASS) {
        let kind = BlockKind::from_attr(node.attr("block-type"));
        if kind.is_plain_text() {
            if let Some(joined) = strip_hyphenation(&text) {
                return joined.to_string();
            }
            return format!("{text} ");
        }
        if kind == BlockKind::ListGroup {
            return text;
        }
        log::warn!(
            "paragraph marked as continued has unsupported block-type {:?}",
            node.attr("block-type")
        );
    }

    if text.is_empty() { text } else { format!("{text}\n\n") }
}

/// If `text` ends in a word broken by a hyphen, return it without the hyphen
/// (and the single whitespace character that may follow it).
pub fn strip_hyphenation(text: &str) -> Option<&str> {
    if !HYPHENATED_BREAK.is_match(text) {
        return None;
    }
    TRAILING_HYPHEN.find(text).map(|m| &text[..m.start()])
}

/// `<h1>`..`<h6>` as ATX headings.
pub(crate) fn convert_heading(level: u8, text: &str) -> String {
    let content = text::normalize_whitespace(text);
    let content = content.trim();
    if content.is_empty() {
        return String::new();
    }
    format!("\n\n{} {content}\n\n", "#".repeat(usize::from(level)))
}

/// `<blockquote>`: every line prefixed with `> `.
pub(crate) fn convert_blockquote(text: &str) -> String {
    let content = text.trim();
    if content.is_empty() {
        return String::new();
    }

    let quoted: Vec<String> = content
        .lines()
        .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
        .collect();
    format!("\n\n{}\n\n", quoted.join("\n"))
}

/// `<pre>`: fenced code block, language taken from a `language-*` class on the
/// `<pre>` or its first `<code>` child.
pub(crate) fn convert_pre(node: &Node, text: &str) -> String {
    let code = text.trim_end_matches('\n').trim_start_matches('\n');
    if code.is_empty() {
        return String::new();
    }

    let language = code_language(node)
        .or_else(|| node.element_children().find_map(code_language))
        .unwrap_or_default();
    let fence = if code.contains("```") { "~~~" } else { "```" };
    format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
}

fn code_language(node: &Node) -> Option<&str> {
    node.classes()
        .find_map(|class| class.strip_prefix("language-").or_else(|| class.strip_prefix("lang-")))
}

/// `<li>` outside any list.
pub(crate) fn convert_orphan_item(text: &str, options: &ConversionOptions) -> String {
    let content = text.trim();
    if content.is_empty() {
        return String::new();
    }
    format!("{} {content}\n", options.bullet)
}

/// `<tr>` outside any table: one line per row.
pub(crate) fn convert_orphan_row(text: &str) -> String {
    let content = text.trim();
    if content.is_empty() { String::new() } else { format!("{content}\n") }
}

/// `<td>`/`<th>` outside any table.
pub(crate) fn convert_orphan_cell(text: &str) -> String {
    let content = text.trim();
    if content.is_empty() { String::new() } else { format!("{content} ") }
}
