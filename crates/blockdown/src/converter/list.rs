//! List conversion with ordinal detection.
//!
//! Source documents often carry their own enumeration inside the item text
//! ("1. Scope", "a) Terms") or, after layout extraction, at the end of it
//! ("Scope 1."). Items that already carry an ordinal are emitted without a
//! bullet, trailing ordinals are moved to the front, and everything else gets
//! the configured bullet.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::converter::main::{Context, convert_children, convert_children_where};
use crate::dom::{Child, Node, Tag};
use crate::options::ConversionOptions;

static TRAILING_LETTER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+[a-z]\)\s+(\d+)\)\s*$").expect("valid trailing letter-number regex"));
static TRAILING_NUMBER_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(\d+)\.\s*$").expect("valid trailing number regex"));
static TRAILING_NUMBER_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(\d+)\)\s*$").expect("valid trailing number-paren regex"));
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+([.)])\s+.+").expect("valid leading number regex"));
static LEADING_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[a-z]([.)])\s+.+").expect("valid leading letter regex"));

/// Shape of an ordinal marker at the start of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinalKind {
    /// `1.`
    NumericDot,
    /// `1)`
    NumericParen,
    /// `a.`
    LowerLetterDot,
    /// `a)`
    LowerLetterParen,
}

/// A normalized list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Ordinal the item line starts with, if any. `None` items get a bullet.
    pub ordinal: Option<OrdinalKind>,
    /// Item line without bullet; includes the ordinal when there is one.
    pub text: String,
    /// Rendered nested lists, already indented.
    pub nested: Vec<String>,
}

impl ListItem {
    /// Render the item line followed by its nested lists.
    pub fn render(&self, bullet: char) -> String {
        let mut out = match self.ordinal {
            Some(_) => self.text.clone(),
            None => format!("{bullet} {}", self.text),
        };
        for nested in &self.nested {
            out.push('\n');
            out.push_str(nested);
        }
        out
    }
}

/// Detect an ordinal at the start of `text` (`1.`, `1)`, `a.`, `a)`).
pub fn detect_ordinal(text: &str) -> Option<OrdinalKind> {
    if let Some(caps) = LEADING_NUMBER.captures(text) {
        return Some(if &caps[1] == "." {
            OrdinalKind::NumericDot
        } else {
            OrdinalKind::NumericParen
        });
    }
    if let Some(caps) = LEADING_LETTER.captures(text) {
        return Some(if &caps[1] == "." {
            OrdinalKind::LowerLetterDot
        } else {
            OrdinalKind::LowerLetterParen
        });
    }
    None
}

/// Move a trailing ordinal to the front: `"text a) 3)"`, `"text 3."` and
/// `"text 3)"` all become `"3. text"`.
pub fn rewrite_trailing_ordinal(text: &str) -> Option<String> {
    [&*TRAILING_LETTER_NUMBER, &*TRAILING_NUMBER_DOT, &*TRAILING_NUMBER_PAREN]
        .into_iter()
        .find_map(|pattern| pattern.captures(text))
        .map(|caps| format!("{}. {}", &caps[2], caps[1].trim()))
}

/// Normalize an item's own text (without nested lists).
pub fn normalize_item(text: &str) -> ListItem {
    let text = text.trim();

    let (ordinal, line) = match rewrite_trailing_ordinal(text) {
        Some(rewritten) => (Some(OrdinalKind::NumericDot), rewritten),
        None => (detect_ordinal(text), text.to_string()),
    };

    ListItem {
        ordinal,
        text: line,
        nested: Vec::new(),
    }
}

/// `<ul>`/`<ol>`: one line per direct `<li>`, nested lists indented beneath
/// their parent item, the block ending in a blank line.
pub(crate) fn convert_list(node: &Node, options: &ConversionOptions, ctx: Context) -> String {
    let inner = ctx.enter(&node.tag);
    let items: Vec<&Node> = node.element_children().filter(|child| child.tag == Tag::Li).collect();

    if items.is_empty() {
        let text = convert_children(node, options, inner);
        return if text.is_empty() { text } else { format!("{text}\n\n") };
    }

    let lines: Vec<String> = items
        .into_iter()
        .map(|li| build_item(li, options, inner).render(options.bullet))
        .collect();
    format!("{}\n\n", lines.join("\n"))
}

fn build_item(li: &Node, options: &ConversionOptions, ctx: Context) -> ListItem {
    let item_ctx = ctx.enter(&li.tag);
    let own_text = convert_children_where(li, options, item_ctx, &|child: &Child| !is_list(child));
    let mut item = normalize_item(&own_text);

    for nested in li.element_children().filter(|child| child.tag.is_list()) {
        let rendered = convert_list(nested, options, item_ctx);
        let rendered = rendered.trim();
        if !rendered.is_empty() {
            item.nested.push(indent(rendered));
        }
    }

    item
}

fn is_list(child: &Child) -> bool {
    child.as_element().is_some_and(|node| node.tag.is_list())
}

/// Indent every non-empty line by two spaces.
fn indent(block: &str) -> String {
    block
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("  {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
