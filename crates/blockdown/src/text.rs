//! Text normalization and Markdown escaping.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::options::ConversionOptions;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\n\x0C]+").expect("valid whitespace regex"));

/// Collapse runs of ASCII whitespace into a single space.
///
/// Non-breaking spaces survive; they are usually deliberate in the source.
pub fn normalize_whitespace(text: &str) -> Cow<'_, str> {
    WHITESPACE_RUN.replace_all(text, " ")
}

/// Split `text` into a leading space marker, a trailing space marker and the
/// trimmed core, so inline markup can wrap the core and keep the spacing outside.
pub fn chomp(text: &str) -> (&'static str, &'static str, &str) {
    let prefix = if text.starts_with([' ', '\t', '\n', '\r']) { " " } else { "" };
    let suffix = if text.ends_with([' ', '\t', '\n', '\r']) { " " } else { "" };
    (prefix, suffix, text.trim_matches([' ', '\t', '\n', '\r']))
}

/// Escape Markdown-significant characters according to `options`.
pub fn escape<'a>(text: &'a str, options: &ConversionOptions) -> Cow<'a, str> {
    let needs_escape = text.chars().any(|c| should_escape(c, options));
    if !needs_escape {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if should_escape(c, options) {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn should_escape(c: char, options: &ConversionOptions) -> bool {
    match c {
        '*' => options.escape_asterisks,
        '_' => options.escape_underscores,
        '$' => options.escape_dollars,
        '\\' | '`' | '[' | ']' | '<' | '>' | '|' | '~' | '#' | '&' | '=' | '+' => options.escape_misc,
        _ => false,
    }
}

/// Escape only dollar signs (used for raw HTML kept inside table cells).
pub fn escape_dollars<'a>(text: &'a str, options: &ConversionOptions) -> Cow<'a, str> {
    if options.escape_dollars && text.contains('$') {
        Cow::Owned(text.replace('$', r"\$"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Backslash-escape brackets and parentheses so a label cannot break out of
/// `[label](href)`.
pub fn escape_link_label(text: &str) -> Cow<'_, str> {
    if !text.contains(['[', ']', '(', ')']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("a \n\t  b"), "a b");
        assert_eq!(normalize_whitespace("a\u{a0}\u{a0}b"), "a\u{a0}\u{a0}b");
    }

    #[test]
    fn test_chomp() {
        assert_eq!(chomp(" bold "), (" ", " ", "bold"));
        assert_eq!(chomp("bold"), ("", "", "bold"));
        assert_eq!(chomp("  "), (" ", " ", ""));
    }

    #[test]
    fn test_escape_defaults() {
        let options = ConversionOptions::default();
        assert_eq!(escape("2*3 costs $5 in_file", &options), r"2\*3 costs \$5 in_file");
        assert_eq!(escape("[plain]", &options), "[plain]");
    }

    #[test]
    fn test_escape_misc_and_underscores() {
        let options = ConversionOptions::default()
            .with_escape_misc(true)
            .with_escape_underscores(true)
            .with_escape_dollars(false);
        assert_eq!(escape(r"a_b [c] \ $", &options), r"a\_b \[c\] \\ $");
    }

    #[test]
    fn test_escape_link_label() {
        assert_eq!(escape_link_label("see [1] (note)"), r"see \[1\] \(note\)");
        assert_eq!(escape_link_label("plain"), "plain");
    }
}
