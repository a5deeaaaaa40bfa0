//! Error types.
//!
//! The reactive core and the reconciler never fail in normal operation, so
//! the only reportable errors come from the template compiler and from
//! loading configuration.

use thiserror::Error;

/// A structural error in a template.
///
/// Offsets are byte offsets into the original template string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An element was opened but its closing tag never appeared.
    #[error("missing end tag for <{tag}> opened at offset {offset}")]
    MissingEndTag { tag: String, offset: usize },

    /// A `{{` without a matching `}}`.
    #[error("unterminated interpolation starting at offset {offset}")]
    UnterminatedInterpolation { offset: usize },

    /// A closing tag that matches no open element.
    #[error("unexpected end tag at offset {offset}")]
    UnexpectedEndTag { offset: usize },
}

/// An error while loading a [`RuntimeConfig`](crate::config::RuntimeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid runtime configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scheduler recursion limit must be at least 1")]
    ZeroRecursionLimit,
}
