//! Line-level access to a document.
//!
//! The parser consumes a document in two modes: token lines for the structural
//! grammar and raw lines for the body of a text block. [`LineReader`] serves both
//! and tracks the 1-based number of the last line it handed out.

use crate::lexer::{Lexer, Token};
use crate::Result;

/// A tokenized, non-blank line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub raw: String,
    pub tokens: Vec<Token>,
}

impl Line {
    /// The tokens of this line without whitespace runs.
    #[must_use]
    pub fn significant(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .filter(|token| !token.is_whitespace())
            .cloned()
            .collect()
    }
}

/// Splits a document into numbered lines.
///
/// Lines are separated by `\n`; one trailing `\r` per line is dropped.
///
/// # Examples
///
/// ```rust
/// use serde_perky::LineReader;
///
/// let mut reader = LineReader::new("a = b\r\n\n  \nc = d");
/// let first = reader.next_tokens().unwrap().unwrap();
/// assert_eq!((first.number, first.raw.as_str()), (1, "a = b"));
///
/// let second = reader.next_tokens().unwrap().unwrap();
/// assert_eq!(second.number, 4);
/// assert!(!reader.has_more());
/// ```
#[derive(Debug, Clone)]
pub struct LineReader {
    lines: Vec<String>,
    next_index: usize,
    suppress_whitespace: bool,
}

impl LineReader {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        LineReader {
            lines,
            next_index: 0,
            suppress_whitespace: true,
        }
    }

    /// Controls whether [`Line::tokens`] carries whitespace runs.
    #[must_use]
    pub fn with_suppress_whitespace(mut self, suppress: bool) -> Self {
        self.suppress_whitespace = suppress;
        self
    }

    /// Returns `true` if at least one raw line has not been handed out yet.
    #[inline]
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_index < self.lines.len()
    }

    /// The 1-based number of the most recently returned line, `0` before the first.
    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.next_index
    }

    /// Returns the next line verbatim, blank or not.
    pub fn next_raw_line(&mut self) -> Option<(usize, String)> {
        let line = self.lines.get(self.next_index)?.clone();
        self.next_index += 1;
        Some((self.next_index, line))
    }

    /// Returns the next line that has at least one non-whitespace token.
    ///
    /// # Errors
    ///
    /// Lex errors are returned annotated with the line number and raw text.
    pub fn next_tokens(&mut self) -> Result<Option<Line>> {
        while let Some((number, raw)) = self.next_raw_line() {
            let tokens = Lexer::new(&raw)
                .with_suppress_whitespace(self.suppress_whitespace)
                .collect::<Result<Vec<_>>>()
                .map_err(|err| err.at_line(number, &raw))?;

            if tokens.iter().all(Token::is_whitespace) {
                continue;
            }
            return Ok(Some(Line {
                number,
                raw,
                tokens,
            }));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_raw_lines_keep_blanks() {
        let mut reader = LineReader::new("one\n\n  three  \r\n");
        assert_eq!(reader.next_raw_line(), Some((1, "one".to_string())));
        assert_eq!(reader.next_raw_line(), Some((2, String::new())));
        assert_eq!(reader.next_raw_line(), Some((3, "  three  ".to_string())));
        assert_eq!(reader.next_raw_line(), Some((4, String::new())));
        assert_eq!(reader.next_raw_line(), None);
        assert_eq!(reader.line_number(), 4);
    }

    #[test]
    fn test_token_lines_skip_blank() {
        let mut reader = LineReader::new("\n   \na = b\n\t\n");
        let line = reader.next_tokens().unwrap().unwrap();
        assert_eq!(line.number, 3);
        assert_eq!(line.tokens.len(), 3);
        assert!(reader.next_tokens().unwrap().is_none());
        assert!(!reader.has_more());
    }

    #[test]
    fn test_whitespace_tokens_are_optional() {
        let mut reader = LineReader::new("  a = b").with_suppress_whitespace(false);
        let line = reader.next_tokens().unwrap().unwrap();
        assert_eq!(line.tokens.len(), 6);
        assert_eq!(line.significant().len(), 3);
    }

    #[test]
    fn test_lex_error_carries_position() {
        let mut reader = LineReader::new("a = b\nc = 'open");
        reader.next_tokens().unwrap();
        let err = reader.next_tokens().unwrap_err();
        let format = err.as_format_error().unwrap();
        assert_eq!(format.kind(), ErrorKind::Lex);
        assert_eq!(format.line_number(), Some(2));
        assert_eq!(format.line(), Some("c = 'open"));
    }

    #[test]
    fn test_has_more_does_not_consume() {
        let mut reader = LineReader::new("x");
        assert!(reader.has_more());
        assert!(reader.has_more());
        assert_eq!(reader.line_number(), 0);
        assert!(reader.next_raw_line().is_some());
        assert!(!reader.has_more());
    }
}
