//! Error types and result aliases for rulefmt.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used by configuration and the binary
//! - [`FormatError`]: The per-file error currency of the batch pipeline

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// A failure scoped to a single file or to the run as a whole.
///
/// This is the only error type that crosses worker boundaries. Every
/// per-file failure is converted into exactly one of these and appended to
/// the run-wide error list; nothing else escapes a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Input access failed: missing path, unreadable attributes or content
    #[error("{0}")]
    Reading(String),

    /// Output directory/file creation, file write, or cache persistence failed
    #[error("{0}")]
    Writing(String),

    /// The lexer reported an error token, or the rules failed to converge
    #[error("{0}")]
    Parsing(String),

    /// Invalid or ineligible configuration or input selection
    #[error("{0}")]
    Options(String),
}

impl FormatError {
    /// The human-readable message, without the category
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Reading(msg) | Self::Writing(msg) | Self::Parsing(msg) | Self::Options(msg) => {
                msg
            }
        }
    }

    /// Short category name, used when logging
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Reading(_) => "reading",
            Self::Writing(_) => "writing",
            Self::Parsing(_) => "parsing",
            Self::Options(_) => "options",
        }
    }
}
