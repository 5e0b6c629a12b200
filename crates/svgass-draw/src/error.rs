//! Error types for drawing

use thiserror::Error;

/// Result type alias for drawing operations
pub type DrawResult<T> = Result<T, DrawError>;

/// Errors raised while turning markup into primitives.
///
/// Only [`DrawError::ResourceExhausted`] and [`DrawError::Io`] stop a
/// document; the others are recovered and counted.
#[derive(Error, Debug)]
pub enum DrawError {
    #[error("path syntax error at byte {offset} near \"{near}\"")]
    PathSyntax { offset: usize, near: String },

    #[error("context stack underflow (excess close)")]
    ContextUnderflow,

    #[error("cannot grow {what}")]
    ResourceExhausted { what: &'static str },

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl DrawError {
    /// Create a path syntax error pointing at `offset` in `data`
    pub fn path_syntax(data: &str, offset: usize) -> Self {
        let near: String = data
            .get(offset..)
            .unwrap_or("")
            .chars()
            .take(16)
            .collect();
        Self::PathSyntax { offset, near }
    }

    /// Whether this error ends conversion of the current document
    pub fn is_fatal(&self) -> bool {
        matches!(self, DrawError::ResourceExhausted { .. } | DrawError::Io(_))
    }
}
