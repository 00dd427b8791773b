//! Configuration for HTML to Markdown conversion.

use std::str::FromStr;

use crate::error::{ConversionError, Result};

/// Default separator emitted after each page marker: 48 dashes.
pub const DEFAULT_PAGE_SEPARATOR: &str = "------------------------------------------------";

/// Opening and closing delimiters wrapped around converted math.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MathDelimiters {
    /// Text emitted before the math content.
    pub open: String,
    /// Text emitted after the math content.
    pub close: String,
}

impl MathDelimiters {
    /// Create a delimiter pair.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Default delimiters for inline math (`$` / `$`).
    #[must_use]
    pub fn inline() -> Self {
        Self::new("$", "$")
    }

    /// Default delimiters for display math (`$$` / `$$`).
    #[must_use]
    pub fn block() -> Self {
        Self::new("$$", "$$")
    }

    /// Parse an `OPEN,CLOSE` pair such as `\(,\)` or `$$,$$`.
    ///
    /// A value without a comma uses the same text for both sides.
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(ConversionError::InvalidOption(
                "math delimiters must not be empty".to_string(),
            ));
        }

        match value.split_once(',') {
            Some((open, close)) if !open.is_empty() && !close.is_empty() => Ok(Self::new(open, close)),
            Some(_) => Err(ConversionError::InvalidOption(format!(
                "math delimiters must look like OPEN,CLOSE (got {value:?})"
            ))),
            None => Ok(Self::new(value, value)),
        }
    }

    /// Wrap `content` in this delimiter pair.
    pub(crate) fn wrap(&self, content: &str) -> String {
        let mut out = String::with_capacity(self.open.len() + content.len() + self.close.len());
        out.push_str(&self.open);
        out.push_str(content);
        out.push_str(&self.close);
        out
    }
}

impl FromStr for MathDelimiters {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Main conversion options.
///
/// Every field is caller-visible; [`Default`] mirrors the settings used when
/// rendering assembled documents: no pagination, `$`/`$$` math, pipe tables,
/// and escaping of asterisks and dollar signs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[allow(clippy::struct_excessive_bools)]
pub struct ConversionOptions {
    /// Emit `{page-id}` markers followed by [`page_separator`](Self::page_separator)
    /// before every page container.
    pub paginate_output: bool,

    /// Separator text emitted after each page marker.
    pub page_separator: String,

    /// Delimiters for `<math>` without `display="block"`.
    pub inline_math_delimiters: MathDelimiters,

    /// Delimiters for `<math display="block">`.
    pub block_math_delimiters: MathDelimiters,

    /// Keep tables as raw HTML instead of building pipe tables.
    pub html_tables_in_markdown: bool,

    /// Escape `$` in text so it is not read as a math delimiter.
    pub escape_dollars: bool,

    /// Escape `*` in text.
    pub escape_asterisks: bool,

    /// Escape `_` in text.
    pub escape_underscores: bool,

    /// Escape other Markdown punctuation (`\`, `[`, `]`, `` ` ``, `<`, `>`, `|`, ...).
    pub escape_misc: bool,

    /// Symbol wrapped around subscript text. A tag-like symbol (`<sub>`) is
    /// closed with its matching end tag.
    pub sub_symbol: String,

    /// Symbol wrapped around superscript text.
    pub sup_symbol: String,

    /// Bullet used for list items without their own ordinal.
    pub bullet: char,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            paginate_output: false,
            page_separator: DEFAULT_PAGE_SEPARATOR.to_string(),
            inline_math_delimiters: MathDelimiters::inline(),
            block_math_delimiters: MathDelimiters::block(),
            html_tables_in_markdown: false,
            escape_dollars: true,
            escape_asterisks: true,
            escape_underscores: false,
            escape_misc: false,
            sub_symbol: "<sub>".to_string(),
            sup_symbol: "<sup>".to_string(),
            bullet: '-',
        }
    }
}

impl ConversionOptions {
    /// Enable or disable page markers.
    #[must_use]
    pub fn with_pagination(mut self, paginate: bool) -> Self {
        self.paginate_output = paginate;
        self
    }

    /// Set the page separator.
    #[must_use]
    pub fn with_page_separator(mut self, separator: impl Into<String>) -> Self {
        self.page_separator = separator.into();
        self
    }

    /// Set inline math delimiters.
    #[must_use]
    pub fn with_inline_math_delimiters(mut self, delimiters: MathDelimiters) -> Self {
        self.inline_math_delimiters = delimiters;
        self
    }

    /// Set display math delimiters.
    #[must_use]
    pub fn with_block_math_delimiters(mut self, delimiters: MathDelimiters) -> Self {
        self.block_math_delimiters = delimiters;
        self
    }

    /// Keep tables as HTML.
    #[must_use]
    pub fn with_html_tables(mut self, html_tables: bool) -> Self {
        self.html_tables_in_markdown = html_tables;
        self
    }

    /// Enable or disable `$` escaping.
    #[must_use]
    pub fn with_escape_dollars(mut self, escape: bool) -> Self {
        self.escape_dollars = escape;
        self
    }

    /// Enable or disable `*` escaping.
    #[must_use]
    pub fn with_escape_asterisks(mut self, escape: bool) -> Self {
        self.escape_asterisks = escape;
        self
    }

    /// Enable or disable `_` escaping.
    #[must_use]
    pub fn with_escape_underscores(mut self, escape: bool) -> Self {
        self.escape_underscores = escape;
        self
    }

    /// Enable or disable escaping of other Markdown punctuation.
    #[must_use]
    pub fn with_escape_misc(mut self, escape: bool) -> Self {
        self.escape_misc = escape;
        self
    }
}
