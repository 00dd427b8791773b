//! Error types for HTML to Markdown conversion.

use thiserror::Error;

/// Errors that can occur while preparing or running a conversion.
///
/// Converting an already-built [`Node`](crate::dom::Node) tree never fails;
/// these errors only come from parsing input text or reading configuration.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The HTML parser rejected the input.
    #[error("HTML parsing error: {0}")]
    ParseError(String),

    /// A configuration value cannot be used.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;
