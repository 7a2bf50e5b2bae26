//! Error types for Perky parsing, serialization and merging.
//!
//! Every failure of the format engine is a [`FormatError`] carrying an
//! [`ErrorKind`], a message and, when known, the position it happened at.
//! File-system failures are reported separately as [`Error::Io`].
//!
//! ## Error Categories
//!
//! - **Lex**: unterminated quoted strings, bad escapes, a triple quote that is not
//!   the last thing on its line
//! - **Structure**: wrong token shapes, missing or unbalanced `}` / `]`, duplicate keys
//! - **TextBlock**: text in a triple-quoted block left of its closing marker
//! - **Directive**: unknown directive names and malformed arguments
//! - **Include**: include targets that cannot be found, include cycles
//! - **Merge**: merging a mapping with a sequence or a string
//! - **Serialization**: trees that have no textual representation
//!
//! ## Examples
//!
//! ```rust
//! use serde_perky::{parse_str, ErrorKind};
//!
//! let err = parse_str("a = 3\na = 5").unwrap_err();
//! assert_eq!(err.kind(), Some(ErrorKind::Structure));
//! assert!(err.to_string().contains("line 2"));
//! ```

use std::fmt;
use thiserror::Error;

/// The category of a [`FormatError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lex,
    Structure,
    TextBlock,
    Directive,
    Include,
    Merge,
    Serialization,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lex => "lex",
            ErrorKind::Structure => "structure",
            ErrorKind::TextBlock => "text block",
            ErrorKind::Directive => "directive",
            ErrorKind::Include => "include",
            ErrorKind::Merge => "merge",
            ErrorKind::Serialization => "serialization",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure of the format engine.
///
/// Carries a human-readable message and, where available, the 1-based line number,
/// the raw text of the offending line and the concatenated text of the offending
/// tokens, so tooling can point at the exact failure.
///
/// # Examples
///
/// ```rust
/// use serde_perky::{ErrorKind, FormatError};
///
/// let err = FormatError::new(ErrorKind::Structure, "invalid token sequence")
///     .with_line(7, "a = b = c")
///     .with_tokens("a = b = c");
/// assert_eq!(err.line_number(), Some(7));
/// assert!(err.to_string().starts_with("Format error: invalid token sequence"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Format error: {message}{}", context_suffix(.line_number, .line, .tokens))]
pub struct FormatError {
    kind: ErrorKind,
    message: String,
    line_number: Option<usize>,
    line: Option<String>,
    tokens: Option<String>,
}

fn context_suffix(
    line_number: &Option<usize>,
    line: &Option<String>,
    tokens: &Option<String>,
) -> String {
    let mut suffix = String::new();
    if let Some(number) = line_number {
        suffix.push_str(&format!(" at line {}", number));
    }
    if let Some(line) = line {
        suffix.push_str(&format!("\n  line: {:?}", line));
    }
    if let Some(tokens) = tokens {
        suffix.push_str(&format!("\n  tokens: {}", tokens));
    }
    suffix
}

impl FormatError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        FormatError {
            kind,
            message: message.into(),
            line_number: None,
            line: None,
            tokens: None,
        }
    }

    /// Attaches the 1-based line number and raw text of the offending line.
    ///
    /// Position information that is already present is kept, so errors raised deep
    /// inside a nested parse keep pointing at their own line.
    #[must_use]
    pub fn with_line(mut self, number: usize, line: impl Into<String>) -> Self {
        if self.line_number.is_none() {
            self.line_number = Some(number);
            self.line = Some(line.into());
        }
        self
    }

    #[must_use]
    pub fn with_line_number(mut self, number: usize) -> Self {
        if self.line_number.is_none() {
            self.line_number = Some(number);
        }
        self
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: impl Into<String>) -> Self {
        if self.tokens.is_none() {
            self.tokens = Some(tokens.into());
        }
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    #[must_use]
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    #[must_use]
    pub fn tokens(&self) -> Option<&str> {
        self.tokens.as_deref()
    }
}

/// Represents all possible errors of the crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error while reading or writing a named file
    #[error("IO error: {path}: {message}")]
    Io { path: String, message: String },

    /// The text or the tree violates the format
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Custom error raised through serde
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a format error of the given kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_perky::{Error, ErrorKind};
    ///
    /// let err = Error::format(ErrorKind::Directive, "unknown directive 'frob'");
    /// assert_eq!(err.kind(), Some(ErrorKind::Directive));
    /// ```
    pub fn format(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Error::Format(FormatError::new(kind, msg))
    }

    pub fn lex(msg: impl Into<String>) -> Self {
        Error::format(ErrorKind::Lex, msg)
    }

    pub fn structure(msg: impl Into<String>) -> Self {
        Error::format(ErrorKind::Structure, msg)
    }

    pub fn text_block(msg: impl Into<String>) -> Self {
        Error::format(ErrorKind::TextBlock, msg)
    }

    pub fn directive(msg: impl Into<String>) -> Self {
        Error::format(ErrorKind::Directive, msg)
    }

    pub fn include(msg: impl Into<String>) -> Self {
        Error::format(ErrorKind::Include, msg)
    }

    pub fn merge(msg: impl Into<String>) -> Self {
        Error::format(ErrorKind::Merge, msg)
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Error::format(ErrorKind::Serialization, msg)
    }

    /// Creates an I/O error for a failed read or write of `path`.
    pub fn io(path: impl fmt::Display, err: &std::io::Error) -> Self {
        Error::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// The format error kind, or `None` for I/O and custom errors.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Format(err) => Some(err.kind()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_format_error(&self) -> Option<&FormatError> {
        match self {
            Error::Format(err) => Some(err),
            _ => None,
        }
    }

    /// Attaches line information to a format error; other errors pass through.
    #[must_use]
    pub(crate) fn at_line(self, number: usize, line: &str) -> Self {
        match self {
            Error::Format(err) => Error::Format(err.with_line(number, line)),
            other => other,
        }
    }

    #[must_use]
    pub(crate) fn at_line_number(self, number: usize) -> Self {
        match self {
            Error::Format(err) => Error::Format(err.with_line_number(number)),
            other => other,
        }
    }

    #[must_use]
    pub(crate) fn with_tokens(self, tokens: impl Into<String>) -> Self {
        match self {
            Error::Format(err) => Error::Format(err.with_tokens(tokens)),
            other => other,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = FormatError::new(ErrorKind::TextBlock, "malformed triple-quoted block")
            .with_line(12, "  hello")
            .with_tokens("'''");
        let s = err.to_string();
        assert!(s.starts_with("Format error: malformed triple-quoted block at line 12"));
        assert!(s.contains("hello"));
        assert!(s.contains("tokens: '''"));
    }

    #[test]
    fn test_inner_position_is_kept() {
        let err = Error::structure("duplicate key 'a'")
            .at_line(3, "a = 5")
            .at_line(1, "=include other");
        let format = err.as_format_error().unwrap();
        assert_eq!(format.line_number(), Some(3));
        assert_eq!(format.line(), Some("a = 5"));
    }

    #[test]
    fn test_io_and_custom_have_no_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(Error::io("config.pky", &io).kind(), None);
        assert_eq!(Error::custom("boom").kind(), None);
        assert!(Error::io("config.pky", &io).to_string().contains("config.pky"));
    }
}
