//! Main conversion pipeline for document HTML to Markdown.
//!
//! This module holds the public entry points and the recursive dispatcher. Every
//! element's Markdown is computed from its already-converted children, so data
//! flows strictly bottom-up; the post-processor then runs once over the result.

use crate::converter::{block, inline, list, table};
use crate::dom::{Child, Node, Tag, parse_document};
use crate::error::Result;
use crate::options::ConversionOptions;
use crate::postprocess::postprocess;
use crate::text;

/// Lexical context of the node being converted.
///
/// Each flag records whether some ancestor has the given kind. The context is
/// copied into every recursive call, never shared.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Context {
    /// Inside `<pre>`: whitespace is kept verbatim.
    pub(crate) in_pre: bool,
    /// Inside `<pre>`, `<code>`, `<kbd>` or `<samp>`: no escaping, no emphasis markers.
    pub(crate) in_code: bool,
    /// Inside `<math>`: no escaping.
    pub(crate) in_math: bool,
    /// Inside `<table>`.
    pub(crate) in_table: bool,
    /// Inside `<h1>`..`<h6>`.
    pub(crate) in_heading: bool,
}

impl Context {
    /// Context for the children of an element of kind `tag`.
    pub(crate) fn enter(self, tag: &Tag) -> Self {
        let mut ctx = self;
        match tag {
            Tag::Pre => {
                ctx.in_pre = true;
                ctx.in_code = true;
            }
            Tag::Code | Tag::Kbd | Tag::Samp => ctx.in_code = true,
            Tag::Math => ctx.in_math = true,
            Tag::Table => ctx.in_table = true,
            Tag::Heading(_) => ctx.in_heading = true,
            _ => {}
        }
        ctx
    }
}

/// Converts HTML to Markdown using the provided conversion options.
///
/// This is the main entry point: parse, convert, post-process.
pub fn convert_html(html: &str, options: &ConversionOptions) -> Result<String> {
    let root = parse_document(html)?;
    Ok(convert_tree(&root, options))
}

/// Converts an already-built tree to a finished Markdown document.
///
/// Never fails: malformed structure degrades to best-effort output.
pub fn convert_tree(root: &Node, options: &ConversionOptions) -> String {
    let markdown = convert_fragment(root, options);
    log::debug!("converted tree to {} bytes of markdown before cleanup", markdown.len());

    let markdown = postprocess(&markdown, options);
    log::debug!("markdown after cleanup: {} bytes", markdown.len());
    markdown
}

/// Dispatcher output for a single node, without the document post-processing passes.
pub fn convert_fragment(node: &Node, options: &ConversionOptions) -> String {
    convert_node(node, options, Context::default())
}

/// Convert one element. `ctx` describes the element's ancestors.
pub(crate) fn convert_node(node: &Node, options: &ConversionOptions, ctx: Context) -> String {
    let inner = ctx.enter(&node.tag);
    let children = || convert_children(node, options, inner);

    match &node.tag {
        Tag::Head | Tag::Script | Tag::Style => String::new(),

        Tag::Fragment | Tag::Html | Tag::Body | Tag::U | Tag::Thead | Tag::Tbody | Tag::Tfoot => children(),

        Tag::Div => block::convert_div(node, &children(), options),
        Tag::P => block::convert_paragraph(node, children()),
        Tag::Heading(level) => block::convert_heading(*level, &children()),
        Tag::Blockquote => block::convert_blockquote(&children()),
        Tag::Pre => block::convert_pre(node, &children()),
        Tag::Hr => block::HORIZONTAL_RULE.to_string(),
        Tag::Li => block::convert_orphan_item(&children(), options),
        Tag::Tr => block::convert_orphan_row(&children()),
        Tag::Td | Tag::Th => block::convert_orphan_cell(&children()),

        Tag::Table => table::convert_table(node, options, ctx),
        Tag::Ul | Tag::Ol => list::convert_list(node, options, ctx),

        Tag::Math => inline::convert_math(node, &children(), options),
        Tag::Br => inline::convert_line_break(ctx),
        Tag::A => inline::convert_link(node, &children()),
        Tag::Span => inline::convert_span(node, children()),
        Tag::B | Tag::Strong => inline::convert_emphasis(&children(), "**", ctx),
        Tag::I | Tag::Em => inline::convert_emphasis(&children(), "*", ctx),
        Tag::Code | Tag::Kbd | Tag::Samp => inline::convert_code(&children(), ctx),
        Tag::Sub => inline::convert_script(&children(), &options.sub_symbol, ctx),
        Tag::Sup => inline::convert_script(&children(), &options.sup_symbol, ctx),
        Tag::Img => inline::convert_image(node),

        Tag::Other(name) => convert_unknown(name, children()),
    }
}

/// Fallback for tags without a dedicated converter.
///
/// Inline-looking tags pass their text through; anything else is treated as
/// a block container.
fn convert_unknown(name: &str, text: String) -> String {
    if is_inline_element(name) {
        return text;
    }

    log::debug!("no converter for <{name}>, rendering as block container");
    if text.is_empty() { text } else { format!("{text}\n\n") }
}

/// Check if an element is inline (not block-level).
fn is_inline_element(tag_name: &str) -> bool {
    matches!(
        tag_name,
        "abbr"
            | "bdi"
            | "bdo"
            | "cite"
            | "data"
            | "dfn"
            | "mark"
            | "q"
            | "s"
            | "del"
            | "ins"
            | "small"
            | "strike"
            | "time"
            | "var"
            | "wbr"
            | "font"
            | "label"
            | "mi"
            | "mo"
            | "mn"
            | "msup"
            | "msub"
            | "mrow"
            | "mfrac"
            | "msqrt"
            | "mtext"
            | "semantics"
            | "annotation"
            | "content-ref"
    )
}

/// Convert all children of `node`. `ctx` is the context inside `node`.
pub(crate) fn convert_children(node: &Node, options: &ConversionOptions, ctx: Context) -> String {
    convert_children_where(node, options, ctx, &|_| true)
}

/// Convert the children of `node` accepted by `keep`.
///
/// Sibling checks (whitespace boundaries) look at the full child list, so
/// skipping a child never changes how its neighbours are trimmed.
pub(crate) fn convert_children_where(
    node: &Node,
    options: &ConversionOptions,
    ctx: Context,
    keep: &dyn Fn(&Child) -> bool,
) -> String {
    let children = &node.children;
    let trims_inside = node.tag.trims_inner_whitespace();
    let mut output = String::new();

    for (idx, child) in children.iter().enumerate() {
        if !keep(child) {
            continue;
        }

        match child {
            Child::Element(element) => output.push_str(&convert_node(element, options, ctx)),
            Child::Text(raw) => {
                let prev = idx.checked_sub(1).and_then(|i| children.get(i));
                let next = children.get(idx + 1);

                let at_start = (trims_inside && prev.is_none()) || is_block_child(prev);
                // Also true for the last run of a list item and for a run right
                // before a nested list: no stray space ahead of the list's newline.
                let at_end = (trims_inside && next.is_none()) || is_block_child(next);

                if !ctx.in_pre && raw.trim().is_empty() && (at_start || at_end) {
                    continue;
                }

                output.push_str(&process_text(raw, at_start, at_end, options, ctx));
            }
        }
    }

    output
}

fn is_block_child(child: Option<&Child>) -> bool {
    child
        .and_then(Child::as_element)
        .is_some_and(|node| node.tag.is_block())
}

/// Normalize one text run: collapse whitespace outside `<pre>`, escape outside
/// code and math, and trim the sides that touch a block boundary.
pub(crate) fn process_text(
    raw: &str,
    strip_leading: bool,
    strip_trailing: bool,
    options: &ConversionOptions,
    ctx: Context,
) -> String {
    if ctx.in_pre {
        return raw.to_string();
    }

    let normalized = text::normalize_whitespace(raw);
    let mut processed = if ctx.in_code || ctx.in_math {
        normalized.into_owned()
    } else {
        text::escape(&normalized, options).into_owned()
    };

    if strip_trailing {
        processed.truncate(processed.trim_end().len());
    }
    if strip_leading {
        let leading = processed.len() - processed.trim_start().len();
        processed.drain(..leading);
    }
    processed
}
