//! Inline element converters: links, identified spans, math, emphasis, code
//! spans, sub/superscripts, images and line breaks.

use crate::converter::main::Context;
use crate::dom::Node;
use crate::options::ConversionOptions;
use crate::text::{chomp, escape_link_label};

/// Line break marker kept verbatim inside table cells.
pub const TABLE_LINE_BREAK: &str = "<br>";

/// `<a>`: `[label](href "title")`, or `<href>` when the label is the address.
pub(crate) fn convert_link(node: &Node, text: &str) -> String {
    let label = escape_link_label(text);
    let (prefix, suffix, label) = chomp(&label);
    if label.is_empty() {
        return String::new();
    }

    let Some(href) = node.attr("href").filter(|href| !href.is_empty()) else {
        return format!("{prefix}{label}{suffix}");
    };
    let title = node.attr("title").filter(|title| !title.is_empty());

    if title.is_none() && label == href {
        return format!("{prefix}<{href}>{suffix}");
    }

    let title_part = title
        .map(|title| format!(" \"{}\"", title.replace('"', "\\\"")))
        .unwrap_or_default();
    format!("{prefix}[{label}]({href}{title_part}){suffix}")
}

/// `<span>`: keep the element when it carries an `id` so anchors survive.
pub(crate) fn convert_span(node: &Node, text: String) -> String {
    match node.attr("id").filter(|id| !id.is_empty()) {
        Some(id) => format!(
            "<span id=\"{}\">{text}</span>",
            html_escape::encode_double_quoted_attribute(id)
        ),
        None => text,
    }
}

/// `<math>`: display math on its own line, inline math padded with spaces.
pub(crate) fn convert_math(node: &Node, text: &str, options: &ConversionOptions) -> String {
    let content = text.trim();
    if node.attr("display") == Some("block") {
        format!("\n{}\n", options.block_math_delimiters.wrap(content))
    } else {
        format!(" {} ", options.inline_math_delimiters.wrap(content))
    }
}

/// `<br>`: verbatim `<br>` in tables, a space in headings, a hard break elsewhere.
pub(crate) fn convert_line_break(ctx: Context) -> String {
    if ctx.in_table {
        TABLE_LINE_BREAK.to_string()
    } else if ctx.in_heading {
        " ".to_string()
    } else {
        "  \n".to_string()
    }
}

/// `<b>`/`<strong>`/`<i>`/`<em>`: wrap the trimmed text in `markup`, keeping
/// surrounding spaces outside the markers.
pub(crate) fn convert_emphasis(text: &str, markup: &str, ctx: Context) -> String {
    if ctx.in_code {
        return text.to_string();
    }
    wrap_chomped(text, markup, markup)
}

/// `<sub>`/`<sup>`: wrap in the configured symbol; tag-like symbols get their
/// matching end tag.
pub(crate) fn convert_script(text: &str, symbol: &str, ctx: Context) -> String {
    if ctx.in_code || symbol.is_empty() {
        return text.to_string();
    }

    let closing = if symbol.starts_with('<') && !symbol.starts_with("</") {
        format!("</{}", &symbol[1..])
    } else {
        symbol.to_string()
    };
    wrap_chomped(text, symbol, &closing)
}

fn wrap_chomped(text: &str, open: &str, close: &str) -> String {
    let (prefix, suffix, core) = chomp(text);
    if core.is_empty() {
        return prefix.to_string();
    }
    format!("{prefix}{open}{core}{close}{suffix}")
}

/// `<code>`/`<kbd>`/`<samp>` outside `<pre>`: a code span whose fence is longer
/// than any backtick run inside it.
pub(crate) fn convert_code(text: &str, ctx: Context) -> String {
    if ctx.in_pre {
        return text.to_string();
    }

    let (prefix, suffix, core) = chomp(text);
    if core.is_empty() {
        return prefix.to_string();
    }

    let longest_run = core
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    let pad = if core.starts_with('`') || core.ends_with('`') { " " } else { "" };
    format!("{prefix}{fence}{pad}{core}{pad}{fence}{suffix}")
}

/// `<img>`: `![alt](src "title")`.
pub(crate) fn convert_image(node: &Node) -> String {
    let src = node.attr("src").unwrap_or_default();
    let alt = node.attr("alt").unwrap_or_default();
    if src.is_empty() {
        return alt.to_string();
    }

    let title_part = node
        .attr("title")
        .filter(|title| !title.is_empty())
        .map(|title| format!(" \"{}\"", title.replace('"', "\\\"")))
        .unwrap_or_default();
    format!("![{}]({src}{title_part})", escape_link_label(alt))
}
