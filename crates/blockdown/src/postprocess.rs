//! Whole-document passes run once over the assembled Markdown.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::options::ConversionOptions;

/// Width, in dots, of a normalized fill-in-the-blank line.
pub const FILL_IN_BLANK_WIDTH: usize = 150;

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));
static EXCESS_NEWLINE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\n\s){3,}").expect("valid newline-whitespace regex"));
static BLANK_GLYPH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_▁….]{4,}").expect("valid blank glyph regex"));
static DOT_LEADER_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\. ?){130,}").expect("valid dot leader regex"));

/// Collapse runs of blank lines and trim the document.
///
/// Both collapses repeat until neither matches, since one can leave a run the
/// other catches (`"a\n \n \n \nb"` first becomes `"a\n\n\nb"`). Running this
/// on its own output changes nothing.
pub fn cleanup_text(markdown: &str) -> String {
    let mut text = markdown.to_string();
    loop {
        let collapsed = EXCESS_NEWLINES.replace_all(&text, "\n\n");
        let collapsed = EXCESS_NEWLINE_WHITESPACE.replace_all(&collapsed, "\n\n");
        if collapsed == text {
            break;
        }
        text = collapsed.into_owned();
    }
    text.trim().to_string()
}

/// Replace runs of four or more blank-field glyphs (`_`, `▁`, `…`, `.`) with
/// dots, doubling the run length.
pub fn normalize_blank_fields(markdown: &str) -> String {
    BLANK_GLYPH_RUN
        .replace_all(markdown, |caps: &Captures<'_>| ".".repeat(caps[0].chars().count() * 2))
        .into_owned()
}

/// Cap very long dot leaders at [`FILL_IN_BLANK_WIDTH`] and move them into
/// their own paragraph.
pub fn normalize_dot_leaders(markdown: &str) -> String {
    DOT_LEADER_RUN
        .replace_all(markdown, |_: &Captures<'_>| {
            format!("\n\n{}\n\n", ".".repeat(FILL_IN_BLANK_WIDTH))
        })
        .into_owned()
}

/// Run every document pass in order: blank-line cleanup, blank-field
/// normalization, dot-leader capping, then pagination padding.
///
/// Dot-leader blocks bring their own blank lines, so cleanup runs once more
/// after them.
pub fn postprocess(markdown: &str, options: &ConversionOptions) -> String {
    let cleaned = cleanup_text(markdown);
    let cleaned = normalize_blank_fields(&cleaned);
    let mut cleaned = cleanup_text(&normalize_dot_leaders(&cleaned));

    if options.paginate_output {
        if !cleaned.starts_with("\n\n") {
            cleaned.insert_str(0, "\n\n");
        }
        if !options.page_separator.is_empty() && cleaned.ends_with(options.page_separator.as_str()) {
            cleaned.push_str("\n\n");
        }
    }

    cleaned
}
