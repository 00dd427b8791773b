#![allow(clippy::module_name_repetitions)]
//! Block-structured document HTML to Markdown.
//!
//! The input is the HTML a layout pipeline assembles from scanned or exported
//! pages: `<div class="page">` containers, paragraphs that continue across
//! page breaks, `<math>` elements, and tables whose spans came from a model.
//! The output is Markdown ready for downstream text processing.
//!
//! ## Example
//!
//! ```
//! use blockdown::{ConversionOptions, convert_html};
//!
//! let html = r#"<p class="has-continuation" block-type="Text">inter-</p><p>national</p>"#;
//! let markdown = convert_html(html, &ConversionOptions::default()).unwrap();
//! assert_eq!(markdown, "international");
//! ```
//!
//! ## Pipeline
//!
//! 1. [`parse_document`] builds an owned [`Node`] tree.
//! 2. The converter walks the tree bottom-up; tables go through
//!    [`table::build_grid`] and lists through [`list::normalize_item`].
//! 3. [`postprocess`] collapses blank lines, normalizes fill-in blanks and dot
//!    leaders, and pads paginated output.

pub mod converter;
pub mod dom;
pub mod error;
pub mod options;
pub mod postprocess;
pub mod text;

pub use converter::{block, convert_fragment, convert_html, convert_tree, inline, list, table};
pub use dom::{Child, Node, Tag, parse_document};
pub use error::{ConversionError, Result};
pub use options::{ConversionOptions, DEFAULT_PAGE_SEPARATOR, MathDelimiters};
pub use postprocess::{cleanup_text, postprocess};
