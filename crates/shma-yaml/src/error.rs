//! Error types for document parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shma-yaml operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors that can occur while parsing a document.
///
/// Every variant that can be tied to a position carries the 1-based line
/// number of the offending line.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Generic syntax error (e.g. a mapping line without a `key: value` separator)
    #[error("{message} at line {line}")]
    Syntax { line: usize, message: String },

    /// A quoted scalar without its closing quote
    #[error("Unterminated quoted scalar at line {line}")]
    UnterminatedQuote { line: usize },

    /// Unbalanced `[`/`]` or `{`/`}` in an inline flow collection
    #[error("Mismatched brackets at line {line}: {message}")]
    MismatchedBrackets { line: usize, message: String },

    /// Sequence and mapping entries mixed at the same level
    #[error("Mixed list/dict structure near line {line}")]
    MixedStructure { line: usize },

    /// Content left over after the document's top-level node
    #[error("Unexpected content at line {line}")]
    TrailingContent { line: usize },

    /// Nesting deeper than the configured limit
    #[error("Maximum nesting depth of {limit} exceeded at line {line}")]
    DepthExceeded { line: usize, limit: usize },

    /// The input file could not be read
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A syntax error inside a named file
    #[error("{}: {error}", file.display())]
    InFile {
        file: PathBuf,
        error: Box<FormatError>,
    },
}

impl FormatError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        FormatError::Syntax {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn brackets(line: usize, message: impl Into<String>) -> Self {
        FormatError::MismatchedBrackets {
            line,
            message: message.into(),
        }
    }

    /// Line number the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            FormatError::Syntax { line, .. }
            | FormatError::UnterminatedQuote { line }
            | FormatError::MismatchedBrackets { line, .. }
            | FormatError::MixedStructure { line }
            | FormatError::TrailingContent { line }
            | FormatError::DepthExceeded { line, .. } => Some(*line),
            FormatError::Io { .. } => None,
            FormatError::InFile { error, .. } => error.line(),
        }
    }

    /// Attach a file name to this error.
    pub fn in_file(self, file: impl Into<PathBuf>) -> Self {
        match self {
            err @ (FormatError::Io { .. } | FormatError::InFile { .. }) => err,
            err => FormatError::InFile {
                file: file.into(),
                error: Box::new(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line() {
        let err = FormatError::syntax(3, "Expected mapping entry");
        assert_eq!(err.to_string(), "Expected mapping entry at line 3");
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_in_file_wraps_once() {
        let err = FormatError::MixedStructure { line: 2 }
            .in_file("service.yml")
            .in_file("other.yml");
        assert_eq!(
            err.to_string(),
            "service.yml: Mixed list/dict structure near line 2"
        );
        assert_eq!(err.line(), Some(2));
    }
}
