//! Error type for markup parsing and serializer selection.

use thiserror::Error;

/// Errors produced by the markup library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// The generated markup is not well formed.
    #[error("markup syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// A serializer name outside `html`, `xhtml`, `xml`, `text`.
    #[error("unknown serializer: {0}")]
    UnknownSerializer(String),

    /// A doctype name not present in the doctype table.
    #[error("unknown doctype: {0}")]
    UnknownDoctype(String),
}

impl MarkupError {
    pub(crate) fn syntax(position: u64, message: impl Into<String>) -> Self {
        MarkupError::Syntax {
            position,
            message: message.into(),
        }
    }
}
