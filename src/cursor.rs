//! A rewindable character stream over one line of text.
//!
//! The lexer expresses all of its look-ahead and backtracking through
//! [`Cursor::push`]: characters read speculatively are pushed back and will be
//! yielded again before anything that has not been read yet.

use std::fmt;

/// Character stream with unlimited LIFO push-back.
///
/// Pending characters live on a stack, next character last.
///
/// # Examples
///
/// ```rust
/// use serde_perky::Cursor;
///
/// let mut cursor = Cursor::new("abcde");
/// assert_eq!(cursor.next(), Some('a'));
/// assert_eq!(cursor.next(), Some('b'));
/// cursor.push("X");
/// assert_eq!(cursor.next(), Some('X'));
/// cursor.push("YZ");
/// assert_eq!(cursor.drain(), "YZcde");
/// assert!(cursor.is_empty());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Cursor {
    pending: Vec<char>,
}

impl Cursor {
    #[must_use]
    pub fn new(text: &str) -> Self {
        Cursor {
            pending: text.chars().rev().collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.pending.last().copied()
    }

    /// Prepends `text`; it is yielded before any not-yet-consumed character.
    pub fn push(&mut self, text: &str) {
        self.pending.extend(text.chars().rev());
    }

    #[inline]
    pub fn push_char(&mut self, c: char) {
        self.pending.push(c);
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns all remaining characters as one string and empties the cursor.
    pub fn drain(&mut self) -> String {
        let rest: String = self.pending.iter().rev().collect();
        self.pending.clear();
        rest
    }
}

impl Iterator for Cursor {
    type Item = char;

    #[inline]
    fn next(&mut self) -> Option<char> {
        self.pending.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.pending.len()))
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contents: String = self.pending.iter().rev().collect();
        write!(f, "Cursor({:?})", contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_is_lifo() {
        let mut cursor = Cursor::new("abcde");
        cursor.push_char('X');
        cursor.push("nozzle");
        cursor.push("YZ");
        assert_eq!(cursor.drain(), "YZnozzleXabcde");
    }

    #[test]
    fn test_emptiness_does_not_consume() {
        for push_in_the_middle in [false, true] {
            let mut cursor = Cursor::new("abc");
            assert!(!cursor.is_empty());
            assert_eq!(cursor.next(), Some('a'));
            assert!(!cursor.is_empty());
            assert_eq!(cursor.next(), Some('b'));
            assert!(!cursor.is_empty());
            if push_in_the_middle {
                cursor.push("X");
                assert_eq!(cursor.next(), Some('X'));
                assert!(!cursor.is_empty());
            }
            assert_eq!(cursor.next(), Some('c'));
            assert!(cursor.is_empty());
            assert_eq!(cursor.next(), None);
        }
    }

    #[test]
    fn test_iterates_with_pushback() {
        let mut cursor = Cursor::new("abcde");
        let mut seen = String::new();
        seen.push(cursor.next().unwrap());
        seen.push(cursor.next().unwrap());
        cursor.push("X");
        seen.push(cursor.next().unwrap());
        seen.push(cursor.next().unwrap());
        cursor.push("YZ");
        seen.extend(cursor.by_ref());
        assert_eq!(seen, "abXcYZde");
    }

    #[test]
    fn test_peek_and_unicode() {
        let cursor = Cursor::new("\u{e9}t\u{e9}");
        assert_eq!(cursor.peek(), Some('\u{e9}'));
        assert_eq!(format!("{:?}", cursor), "Cursor(\"\u{e9}t\u{e9}\")");
    }
}
