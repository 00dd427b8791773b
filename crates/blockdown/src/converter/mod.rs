//! HTML to Markdown conversion.

pub mod block;
pub mod inline;
pub mod list;
mod main;
pub mod table;

pub use main::{convert_fragment, convert_html, convert_tree};
