//! Line tokenizer.
//!
//! Perky is line oriented: the [`Lexer`] turns exactly one line into a list of
//! [`Token`]s. Multi-line text blocks never reach the lexer; the parser reads
//! their lines raw.
//!
//! The operator characters are `= { } [ ] # ' "`. Everything else up to the next
//! operator is an unquoted string with its trailing whitespace trimmed.
//!
//! ```rust
//! use serde_perky::{tokenize, Token};
//!
//! let tokens = tokenize("name = { ").unwrap();
//! assert_eq!(
//!     tokens,
//!     vec![Token::String("name".into()), Token::Equals, Token::LeftBrace]
//! );
//! ```

use crate::{Cursor, Error, Result};
use std::fmt;

/// Characters that start an operator token. Unquoted strings end at any of them.
pub const OPERATORS: [char; 8] = ['=', '{', '}', '[', ']', '#', '\'', '"'];

#[inline]
#[must_use]
pub fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

/// One lexical token of a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Whitespace(String),
    String(String),
    Equals,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    /// Text after the `#`, verbatim.
    Comment(String),
    TripleSingleQuote,
    TripleDoubleQuote,
    EmptyBraces,
    EmptyBrackets,
}

impl Token {
    #[inline]
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self, Token::Comment(_))
    }

    /// Returns `true` for tokens that may follow `=` or stand alone in a sequence.
    #[must_use]
    pub const fn is_value_start(&self) -> bool {
        matches!(
            self,
            Token::String(_)
                | Token::LeftBrace
                | Token::LeftBracket
                | Token::EmptyBraces
                | Token::EmptyBrackets
                | Token::TripleSingleQuote
                | Token::TripleDoubleQuote
        )
    }

    /// The closing marker of a text block opened by this token.
    #[must_use]
    pub const fn text_block_marker(&self) -> Option<&'static str> {
        match self {
            Token::TripleSingleQuote => Some("'''"),
            Token::TripleDoubleQuote => Some("\"\"\""),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Whitespace(s) | Token::String(s) => f.write_str(s),
            Token::Equals => f.write_str("="),
            Token::LeftBrace => f.write_str("{"),
            Token::RightBrace => f.write_str("}"),
            Token::LeftBracket => f.write_str("["),
            Token::RightBracket => f.write_str("]"),
            Token::Comment(s) => write!(f, "#{}", s),
            Token::TripleSingleQuote => f.write_str("'''"),
            Token::TripleDoubleQuote => f.write_str("\"\"\""),
            Token::EmptyBraces => f.write_str("{}"),
            Token::EmptyBrackets => f.write_str("[]"),
        }
    }
}

/// Concatenated token text for diagnostics.
#[must_use]
pub fn tokens_to_string(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|token| !token.is_whitespace())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenizes one line, skipping whitespace.
///
/// # Errors
///
/// Returns a lex error for unterminated quoted strings, invalid escape sequences
/// and triple quotes followed by anything but whitespace.
pub fn tokenize(line: &str) -> Result<Vec<Token>> {
    Lexer::new(line).collect()
}

/// Tokenizes one line, yielding whitespace runs as [`Token::Whitespace`].
///
/// # Examples
///
/// ```rust
/// use serde_perky::{tokenize_with_whitespace, Token};
///
/// let tokens = tokenize_with_whitespace("  x").unwrap();
/// assert_eq!(tokens, vec![Token::Whitespace("  ".into()), Token::String("x".into())]);
/// ```
///
/// # Errors
///
/// Same as [`tokenize`].
pub fn tokenize_with_whitespace(line: &str) -> Result<Vec<Token>> {
    Lexer::new(line).with_suppress_whitespace(false).collect()
}

/// Tokenizer over a single line.
///
/// Iterating yields `Result<Token>`; after the first error the iterator is
/// exhausted.
#[derive(Debug, Clone)]
pub struct Lexer {
    cursor: Cursor,
    suppress_whitespace: bool,
}

impl Lexer {
    #[must_use]
    pub fn new(line: &str) -> Self {
        Lexer {
            cursor: Cursor::new(line),
            suppress_whitespace: true,
        }
    }

    #[must_use]
    pub fn with_suppress_whitespace(mut self, suppress: bool) -> Self {
        self.suppress_whitespace = suppress;
        self
    }

    /// Returns the next token, or `None` at the end of the line.
    ///
    /// # Errors
    ///
    /// Returns a lex error; the rest of the line is discarded.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let result = self.lex();
        if result.is_err() {
            self.cursor.drain();
        }
        result
    }

    fn lex(&mut self) -> Result<Option<Token>> {
        while let Some(c) = self.cursor.next() {
            if c.is_whitespace() {
                let mut run = String::from(c);
                while let Some(next) = self.cursor.peek() {
                    if !next.is_whitespace() {
                        break;
                    }
                    run.push(next);
                    self.cursor.next();
                }
                if self.suppress_whitespace {
                    continue;
                }
                return Ok(Some(Token::Whitespace(run)));
            }

            let token = match c {
                // A comment always ends the line.
                '#' => Token::Comment(self.cursor.drain()),
                '\'' | '"' => self.lex_quote(c)?,
                '{' => self.lex_opener('}', Token::LeftBrace, Token::EmptyBraces),
                '[' => self.lex_opener(']', Token::LeftBracket, Token::EmptyBrackets),
                '}' => Token::RightBrace,
                ']' => Token::RightBracket,
                '=' => Token::Equals,
                _ => {
                    self.cursor.push_char(c);
                    self.lex_unquoted()
                }
            };
            return Ok(Some(token));
        }
        Ok(None)
    }

    fn lex_quote(&mut self, quote: char) -> Result<Token> {
        let mut lookahead = String::with_capacity(2);
        for _ in 0..2 {
            match self.cursor.next() {
                Some(c) => lookahead.push(c),
                None => break,
            }
        }

        if lookahead.len() == 2 * quote.len_utf8() && lookahead.chars().all(|c| c == quote) {
            let rest = self.cursor.drain();
            if !rest.trim().is_empty() {
                return Err(Error::lex(format!(
                    "triple-quote followed by non-whitespace: {:?}",
                    rest.trim()
                )));
            }
            return Ok(if quote == '\'' {
                Token::TripleSingleQuote
            } else {
                Token::TripleDoubleQuote
            });
        }

        self.cursor.push(&lookahead);
        self.lex_quoted_string(quote).map(Token::String)
    }

    fn lex_opener(&mut self, closer: char, plain: Token, empty: Token) -> Token {
        let mut skipped = String::new();
        while let Some(c) = self.cursor.peek() {
            if !c.is_whitespace() {
                break;
            }
            skipped.push(c);
            self.cursor.next();
        }

        if self.cursor.peek() == Some(closer) {
            self.cursor.next();
            return empty;
        }

        self.cursor.push(&skipped);
        plain
    }

    fn lex_unquoted(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.cursor.peek() {
            if is_operator(c) {
                break;
            }
            text.push(c);
            self.cursor.next();
        }

        // Trailing whitespace goes back to the cursor and becomes its own token.
        let trailing = text.split_off(text.trim_end().len());
        self.cursor.push(&trailing);
        Token::String(text)
    }

    fn lex_quoted_string(&mut self, quote: char) -> Result<String> {
        let mut value = String::new();
        while let Some(c) = self.cursor.next() {
            match c {
                '\\' => value.push(self.lex_escape()?),
                c if c == quote => return Ok(value),
                c => value.push(c),
            }
        }
        Err(Error::lex(format!(
            "unterminated quoted string (missing closing {})",
            quote
        )))
    }

    fn lex_escape(&mut self) -> Result<char> {
        let c = self
            .cursor
            .next()
            .ok_or_else(|| Error::lex("unfinished escape sequence at end of line"))?;

        match c {
            '\\' => Ok('\\'),
            '\'' => Ok('\''),
            '"' => Ok('"'),
            'a' => Ok('\u{0007}'),
            'b' => Ok('\u{0008}'),
            'f' => Ok('\u{000C}'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'v' => Ok('\u{000B}'),
            'x' => self.lex_hex_escape('x', 2),
            'u' => self.lex_hex_escape('u', 4),
            'U' => self.lex_hex_escape('U', 8),
            '0'..='7' => {
                let mut digits = String::from(c);
                while digits.len() < 3 {
                    match self.cursor.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(d);
                            self.cursor.next();
                        }
                        _ => break,
                    }
                }
                let code = u32::from_str_radix(&digits, 8)
                    .map_err(|_| Error::lex(format!("invalid octal escape \\{}", digits)))?;
                char::from_u32(code)
                    .ok_or_else(|| Error::lex(format!("invalid octal escape \\{}", digits)))
            }
            'N' => self.lex_named_escape(),
            other => Err(Error::lex(format!(
                "unsupported escape sequence: \\{}",
                other
            ))),
        }
    }

    fn lex_hex_escape(&mut self, kind: char, len: usize) -> Result<char> {
        let mut digits = String::with_capacity(len);
        for _ in 0..len {
            match self.cursor.next() {
                Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                _ => {
                    return Err(Error::lex(format!(
                        "invalid \\{} escape (expected {} hex digits)",
                        kind, len
                    )))
                }
            }
        }
        let code = u32::from_str_radix(&digits, 16)
            .map_err(|_| Error::lex(format!("invalid \\{} escape", kind)))?;
        char::from_u32(code).ok_or_else(|| {
            Error::lex(format!(
                "\\{}{} is not a valid unicode code point",
                kind, digits
            ))
        })
    }

    fn lex_named_escape(&mut self) -> Result<char> {
        if self.cursor.next() != Some('{') {
            return Err(Error::lex("invalid \\N escape (expected '{')"));
        }
        let mut name = String::new();
        loop {
            match self.cursor.next() {
                Some('}') => break,
                Some(c) => name.push(c),
                None => return Err(Error::lex("unterminated \\N{...} escape")),
            }
        }
        lookup_character_name(&name)
            .ok_or_else(|| Error::lex(format!("unknown character name in \\N{{{}}}", name)))
    }
}

impl Iterator for Lexer {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Names accepted by `\N{...}`, matched case-insensitively.
const CHARACTER_NAMES: &[(&str, char)] = &[
    ("NULL", '\u{0000}'),
    ("NUL", '\u{0000}'),
    ("ALERT", '\u{0007}'),
    ("BEL", '\u{0007}'),
    ("BACKSPACE", '\u{0008}'),
    ("BS", '\u{0008}'),
    ("CHARACTER TABULATION", '\t'),
    ("HORIZONTAL TABULATION", '\t'),
    ("TAB", '\t'),
    ("HT", '\t'),
    ("LINE FEED", '\n'),
    ("NEW LINE", '\n'),
    ("END OF LINE", '\n'),
    ("LF", '\n'),
    ("NL", '\n'),
    ("EOL", '\n'),
    ("LINE TABULATION", '\u{000B}'),
    ("VERTICAL TABULATION", '\u{000B}'),
    ("VT", '\u{000B}'),
    ("FORM FEED", '\u{000C}'),
    ("FF", '\u{000C}'),
    ("CARRIAGE RETURN", '\r'),
    ("CR", '\r'),
    ("ESCAPE", '\u{001B}'),
    ("ESC", '\u{001B}'),
    ("SPACE", ' '),
    ("SP", ' '),
    ("QUOTATION MARK", '"'),
    ("NUMBER SIGN", '#'),
    ("APOSTROPHE", '\''),
    ("EQUALS SIGN", '='),
    ("LEFT SQUARE BRACKET", '['),
    ("REVERSE SOLIDUS", '\\'),
    ("RIGHT SQUARE BRACKET", ']'),
    ("LEFT CURLY BRACKET", '{'),
    ("RIGHT CURLY BRACKET", '}'),
    ("DELETE", '\u{007F}'),
    ("DEL", '\u{007F}'),
    ("NO-BREAK SPACE", '\u{00A0}'),
    ("NBSP", '\u{00A0}'),
    ("SECTION SIGN", '\u{00A7}'),
    ("COPYRIGHT SIGN", '\u{00A9}'),
    ("REGISTERED SIGN", '\u{00AE}'),
    ("DEGREE SIGN", '\u{00B0}'),
    ("PLUS-MINUS SIGN", '\u{00B1}'),
    ("MICRO SIGN", '\u{00B5}'),
    ("PILCROW SIGN", '\u{00B6}'),
    ("MIDDLE DOT", '\u{00B7}'),
    ("MULTIPLICATION SIGN", '\u{00D7}'),
    ("DIVISION SIGN", '\u{00F7}'),
    ("POUND SIGN", '\u{00A3}'),
    ("YEN SIGN", '\u{00A5}'),
    ("EURO SIGN", '\u{20AC}'),
    ("EN DASH", '\u{2013}'),
    ("EM DASH", '\u{2014}'),
    ("LEFT SINGLE QUOTATION MARK", '\u{2018}'),
    ("RIGHT SINGLE QUOTATION MARK", '\u{2019}'),
    ("LEFT DOUBLE QUOTATION MARK", '\u{201C}'),
    ("RIGHT DOUBLE QUOTATION MARK", '\u{201D}'),
    ("BULLET", '\u{2022}'),
    ("HORIZONTAL ELLIPSIS", '\u{2026}'),
    ("ZERO WIDTH SPACE", '\u{200B}'),
    ("ZERO WIDTH NO-BREAK SPACE", '\u{FEFF}'),
    ("BYTE ORDER MARK", '\u{FEFF}'),
    ("BOM", '\u{FEFF}'),
    ("REPLACEMENT CHARACTER", '\u{FFFD}'),
    ("SNOWMAN", '\u{2603}'),
];

fn lookup_character_name(name: &str) -> Option<char> {
    let wanted = name.trim().to_ascii_uppercase();
    CHARACTER_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == wanted)
        .map(|(_, c)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn s(text: &str) -> Token {
        Token::String(text.to_string())
    }

    fn ws(text: &str) -> Token {
        Token::Whitespace(text.to_string())
    }

    #[test]
    fn test_unquoted_strings_keep_inner_whitespace() {
        assert_eq!(tokenize("hey party people ").unwrap(), vec![s("hey party people")]);
        assert_eq!(
            tokenize_with_whitespace("  hey party people ").unwrap(),
            vec![ws("  "), s("hey party people"), ws(" ")]
        );
    }

    #[test]
    fn test_comment_consumes_line() {
        assert_eq!(
            tokenize("# hey party people ").unwrap(),
            vec![Token::Comment(" hey party people ".into())]
        );
        assert_eq!(
            tokenize("a = b # trailing = {").unwrap(),
            vec![s("a"), Token::Equals, s("b"), Token::Comment(" trailing = {".into())]
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            tokenize(r#" "quoted \u1234 string" "#).unwrap(),
            vec![s("quoted \u{1234} string")]
        );
        assert_eq!(
            tokenize(r#" "quoted \N{END OF LINE} string" "#).unwrap(),
            vec![s("quoted \n string")]
        );
        assert_eq!(tokenize(r#""\x41\101\t\\\"""#).unwrap(), vec![s("AA\t\\\"")]);
        assert_eq!(tokenize(r"'\U0001F600'").unwrap(), vec![s("\u{1F600}")]);
        assert_eq!(tokenize(r"'it\'s'").unwrap(), vec![s("it's")]);
    }

    #[test]
    fn test_bad_escapes() {
        for line in [r#""\q""#, r#""\x4""#, r#""\N{NOT A NAME}""#, r#""\uD800""#, "\"abc\\"] {
            let err = tokenize(line).unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::Lex), "{}", line);
        }
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize("'quoted' = 'unterminated quoted string").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Lex));
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(tokenize("[]").unwrap(), vec![Token::EmptyBrackets]);
        assert_eq!(tokenize("[ ]").unwrap(), vec![Token::EmptyBrackets]);
        assert_eq!(tokenize("{}").unwrap(), vec![Token::EmptyBraces]);
        assert_eq!(tokenize("{ \t }").unwrap(), vec![Token::EmptyBraces]);
        assert_eq!(
            tokenize("{ ]").unwrap(),
            vec![Token::LeftBrace, Token::RightBracket]
        );
    }

    #[test]
    fn test_triple_quotes() {
        assert_eq!(
            tokenize("a = '''   ").unwrap(),
            vec![s("a"), Token::Equals, Token::TripleSingleQuote]
        );
        assert_eq!(tokenize(r#"""""#).unwrap(), vec![Token::TripleDoubleQuote]);
        assert_eq!(tokenize("''").unwrap(), vec![s("")]);
        assert_eq!(tokenize("'' = x").unwrap(), vec![s(""), Token::Equals, s("x")]);

        let err = tokenize("a = ''' trailing").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Lex));
    }

    #[test]
    fn test_whitespace_is_yielded_between_operators() {
        let tokens = tokenize_with_whitespace(r#" "quoted string" = value "#).unwrap();
        assert_eq!(
            tokens,
            vec![
                ws(" "),
                s("quoted string"),
                ws(" "),
                Token::Equals,
                ws(" "),
                s("value"),
                ws(" "),
            ]
        );
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut lexer = Lexer::new("'open = x");
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_display_round() {
        let tokens = tokenize("key = { # note").unwrap();
        assert_eq!(tokens_to_string(&tokens), "key = { # note");
    }
}
