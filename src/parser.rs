//! Recursive-descent parser for Perky documents.
//!
//! A [`Parser`] holds the configuration of a parse: its [`ParseOptions`] and the
//! table of directives it dispatches `=name argument` lines to. Every call to
//! [`Parser::parse_str`] or [`Parser::parse_file`] builds a fresh [`ParseState`]
//! that owns the line reader and the stack of containers being filled.
//!
//! ## Grammar
//!
//! ```text
//! mapping body:   key = value | key = | =directive [argument] | # comment | }
//! sequence body:  value | =directive [argument] | # comment | ]
//! value:          string | { mapping body | [ sequence body | {} | [] | ''' | """
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use serde_perky::{perky, Parser};
//!
//! let text = r#"
//! name = demo
//! servers = [
//!     alpha
//!     beta
//! ]
//! "#;
//!
//! let value = Parser::new().parse_str(text).unwrap();
//! assert_eq!(value, perky!({ "name": "demo", "servers": ["alpha", "beta"] }));
//! ```

use crate::directive::{Directive, Directives, IncludeDirective};
use crate::lexer::{tokenize, tokens_to_string, Token};
use crate::options::{ParseOptions, Root};
use crate::reader::{Line, LineReader};
use crate::{Error, Map, Result, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Parser configuration: options plus the directive table.
///
/// [`Parser::new`] registers the built-in `include` directive, resolving paths
/// against the current directory. [`Parser::without_directives`] starts with an
/// empty table.
#[derive(Clone, Debug)]
pub struct Parser {
    options: ParseOptions,
    directives: Directives,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Parser::without_directives().with_directive("include", IncludeDirective::new())
    }

    #[must_use]
    pub fn without_directives() -> Self {
        Parser {
            options: ParseOptions::default(),
            directives: Directives::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Shorthand for replacing only the root kind of the options.
    #[must_use]
    pub fn with_root(mut self, root: Root) -> Self {
        self.options.root = root;
        self
    }

    /// Registers `directive` under `name`, replacing any handler of that name.
    ///
    /// Names are matched case-insensitively.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_perky::{perky, ParseState, Parser, Result, Value};
    ///
    /// let parser = Parser::new().with_directive(
    ///     "default",
    ///     |state: &mut ParseState<'_>, argument: Option<&str>| -> Result<()> {
    ///         if let Some(map) = state.current_mut().and_then(Value::as_mapping_mut) {
    ///             map.insert("default".to_string(), Value::from(argument.unwrap_or("")));
    ///         }
    ///         Ok(())
    ///     },
    /// );
    ///
    /// let value = parser.parse_str("=default fast\nspeed = slow").unwrap();
    /// assert_eq!(value, perky!({ "default": "fast", "speed": "slow" }));
    /// ```
    #[must_use]
    pub fn with_directive(mut self, name: &str, directive: impl Directive + 'static) -> Self {
        self.directives.insert(name, directive);
        self
    }

    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    #[must_use]
    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    /// Parses `text` into a container of the configured root kind.
    ///
    /// # Errors
    ///
    /// Returns the first format error found; no partial tree is produced.
    pub fn parse_str(&self, text: &str) -> Result<Value> {
        ParseState::new(self, text, None, Vec::new()).parse(self.options.root)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read, otherwise as
    /// [`Parser::parse_str`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        self.parse_file_as(path.as_ref(), self.options.root, &[])
    }

    /// Parses a file as part of an include chain.
    ///
    /// `chain` lists the canonical paths of the files currently being parsed; a
    /// path already on it is an include cycle.
    pub(crate) fn parse_file_as(&self, path: &Path, root: Root, chain: &[PathBuf]) -> Result<Value> {
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if chain.contains(&canonical) {
            return Err(Error::include(format!(
                "include cycle: {} is already being parsed",
                path.display()
            )));
        }

        debug!(path = %path.display(), root = root.as_str(), "parsing file");
        let text = std::fs::read_to_string(path).map_err(|err| Error::io(path.display(), &err))?;

        let mut chain = chain.to_vec();
        chain.push(canonical);
        ParseState::new(self, &text, Some(path.to_path_buf()), chain).parse(root)
    }
}

/// Keys a document defined with its own lines, with the keys of each nested
/// mapping it opened under them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct OwnKeys(HashMap<String, OwnKeys>);

impl OwnKeys {
    /// Records `key`; returns `false` if it was already defined.
    fn define(&mut self, key: &str) -> bool {
        if self.0.contains_key(key) {
            return false;
        }
        self.0.insert(key.to_string(), OwnKeys::default());
        true
    }

    fn adopt(&mut self, key: &str, nested: OwnKeys) {
        if let Some(slot) = self.0.get_mut(key) {
            *slot = nested;
        }
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub(crate) fn nested(&self, key: &str) -> Option<&OwnKeys> {
        self.0.get(key)
    }
}

/// A container being filled, and the keys this document defined in it.
#[derive(Debug)]
struct Frame {
    container: Value,
    defined: OwnKeys,
}

impl Frame {
    fn new(container: Value) -> Self {
        Frame {
            container,
            defined: OwnKeys::default(),
        }
    }
}

enum Flow {
    Continue,
    Close,
}

/// The state of one parse, handed to directive handlers.
///
/// The container stack holds every open mapping or sequence, innermost last.
/// Directives operate on the innermost one.
#[derive(Debug)]
pub struct ParseState<'p> {
    parser: &'p Parser,
    reader: LineReader,
    stack: Vec<Frame>,
    source: Option<PathBuf>,
    chain: Vec<PathBuf>,
}

impl<'p> ParseState<'p> {
    fn new(parser: &'p Parser, text: &str, source: Option<PathBuf>, chain: Vec<PathBuf>) -> Self {
        ParseState {
            parser,
            reader: LineReader::new(text)
                .with_suppress_whitespace(parser.options.suppress_whitespace),
            stack: Vec::new(),
            source,
            chain,
        }
    }

    /// The parser driving this parse.
    #[must_use]
    pub fn parser(&self) -> &'p Parser {
        self.parser
    }

    /// The file being parsed, if the text came from one.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The 1-based number of the line most recently read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.reader.line_number()
    }

    /// Number of open containers, the root included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The innermost open container.
    #[must_use]
    pub fn current(&self) -> Option<&Value> {
        self.stack.last().map(|frame| &frame.container)
    }

    pub fn current_mut(&mut self) -> Option<&mut Value> {
        self.stack.last_mut().map(|frame| &mut frame.container)
    }

    /// The kind of the innermost open container.
    #[must_use]
    pub fn current_root(&self) -> Option<Root> {
        match self.current()? {
            Value::Mapping(_) => Some(Root::Mapping),
            Value::Sequence(_) => Some(Root::Sequence),
            Value::String(_) => None,
        }
    }

    /// Returns `true` if a line of this document defined `key` in the innermost
    /// open mapping. Keys that arrived through a directive do not count.
    #[must_use]
    pub fn is_defined_here(&self, key: &str) -> bool {
        self.stack
            .last()
            .is_some_and(|frame| frame.defined.contains(key))
    }

    /// Own keys of the innermost open container, nested mappings included.
    pub(crate) fn own_keys(&self) -> Option<&OwnKeys> {
        self.stack.last().map(|frame| &frame.defined)
    }

    /// Replaces the contents of the innermost open container in place.
    ///
    /// # Errors
    ///
    /// Returns a directive error if no container is open or if `value` is of a
    /// different kind.
    pub fn replace_current(&mut self, value: Value) -> Result<()> {
        let frame = self
            .stack
            .last_mut()
            .ok_or_else(|| Error::directive("no open container to replace"))?;

        let same_kind = matches!(
            (&frame.container, &value),
            (Value::Mapping(_), Value::Mapping(_)) | (Value::Sequence(_), Value::Sequence(_))
        );
        if !same_kind {
            return Err(Error::directive(format!(
                "cannot replace the contents of a {} with a {}",
                frame.container.kind_name(),
                value.kind_name()
            )));
        }
        frame.container = value;
        Ok(())
    }

    /// Parses another file with the same parser into a container of kind `root`.
    ///
    /// # Errors
    ///
    /// Returns an include error if `path` is already being parsed further up the
    /// include chain, otherwise as [`Parser::parse_file`].
    pub fn parse_nested_file(&self, path: &Path, root: Root) -> Result<Value> {
        self.parser.parse_file_as(path, root, &self.chain)
    }

    fn parse(mut self, root: Root) -> Result<Value> {
        self.read_container(root, false).map(|frame| frame.container)
    }

    fn read_container(&mut self, root: Root, nested: bool) -> Result<Frame> {
        let (container, closer) = match root {
            Root::Mapping => (Value::Mapping(Map::new()), '}'),
            Root::Sequence => (Value::Sequence(Vec::new()), ']'),
        };
        self.stack.push(Frame::new(container));
        let result = self.fill(nested, closer);
        let frame = self.stack.pop();
        result?;
        frame.ok_or_else(|| Error::structure("container stack is empty"))
    }

    fn fill(&mut self, nested: bool, closer: char) -> Result<()> {
        loop {
            let Some(line) = self.reader.next_tokens()? else {
                if nested {
                    return Err(Error::structure(format!(
                        "unexpected end of input: missing '{}'",
                        closer
                    ))
                    .at_line_number(self.reader.line_number()));
                }
                return Ok(());
            };

            let flow = self.parse_line(&line, nested).map_err(|err| {
                err.at_line(line.number, &line.raw)
                    .with_tokens(tokens_to_string(&line.tokens))
            })?;
            if let Flow::Close = flow {
                return Ok(());
            }
        }
    }

    fn parse_line(&mut self, line: &Line, nested: bool) -> Result<Flow> {
        let tokens = line.significant();
        if matches!(tokens.first(), Some(Token::Equals)) {
            self.run_directive(line)?;
            return Ok(Flow::Continue);
        }

        let in_mapping = matches!(self.current(), Some(Value::Mapping(_)));
        let tokens = strip_trailing_comment(&tokens);

        match (in_mapping, tokens) {
            (_, []) => Ok(Flow::Continue),
            (true, [Token::RightBrace]) | (false, [Token::RightBracket]) => {
                if nested {
                    Ok(Flow::Close)
                } else {
                    Err(Error::structure(format!(
                        "unexpected '{}' outside of any container",
                        tokens[0]
                    )))
                }
            }
            (true, [Token::String(key), Token::Equals]) => {
                self.define(key)?;
                self.insert(key, Value::String(String::new()))
            }
            (true, [Token::String(key), Token::Equals, value]) if value.is_value_start() => {
                self.define(key)?;
                let (value, own) = self.parse_value(value)?;
                if let Some(frame) = self.stack.last_mut() {
                    frame.defined.adopt(key, own);
                }
                self.insert(key, value)
            }
            (false, [value]) if value.is_value_start() => {
                let (value, _) = self.parse_value(value)?;
                if let Some(Value::Sequence(items)) = self.current_mut() {
                    items.push(value);
                }
                Ok(Flow::Continue)
            }
            _ => Err(Error::structure("invalid token sequence")),
        }
    }

    fn define(&mut self, key: &str) -> Result<()> {
        let frame = self
            .stack
            .last_mut()
            .ok_or_else(|| Error::structure("container stack is empty"))?;
        if !frame.defined.define(key) {
            return Err(Error::structure(format!("duplicate key {:?}", key)));
        }
        Ok(())
    }

    fn insert(&mut self, key: &str, value: Value) -> Result<Flow> {
        if let Some(Value::Mapping(map)) = self.current_mut() {
            map.insert(key.to_string(), value);
        }
        Ok(Flow::Continue)
    }

    /// Reads one value, with the own keys of a nested mapping.
    fn parse_value(&mut self, token: &Token) -> Result<(Value, OwnKeys)> {
        let value = match token {
            Token::LeftBrace => {
                let frame = self.read_container(Root::Mapping, true)?;
                return Ok((frame.container, frame.defined));
            }
            Token::LeftBracket => self.read_container(Root::Sequence, true)?.container,
            Token::EmptyBraces => Value::Mapping(Map::new()),
            Token::EmptyBrackets => Value::Sequence(Vec::new()),
            Token::TripleSingleQuote | Token::TripleDoubleQuote => {
                let marker = token.text_block_marker().unwrap_or("'''");
                Value::String(self.read_text_block(marker)?)
            }
            Token::String(text) => Value::String(text.clone()),
            other => {
                return Err(Error::structure(format!(
                    "expected a value, found '{}'",
                    other
                )))
            }
        };
        Ok((value, OwnKeys::default()))
    }

    fn read_text_block(&mut self, marker: &str) -> Result<String> {
        let start = self.reader.line_number();
        let mut body = Vec::new();
        let prefix = loop {
            let Some((number, raw)) = self.reader.next_raw_line() else {
                return Err(Error::text_block(format!(
                    "unterminated triple-quoted block: missing closing {}",
                    marker
                ))
                .at_line_number(start));
            };
            if raw.trim() == marker {
                let indent = raw.len() - raw.trim_start().len();
                break raw[..indent].to_string();
            }
            body.push((number, raw));
        };
        trace!(lines = body.len(), start, "read text block");

        let mut lines = Vec::with_capacity(body.len());
        for (number, raw) in &body {
            let line = raw.trim_end();
            if prefix.is_empty() || line.is_empty() {
                lines.push(line);
                continue;
            }
            let stripped = line.strip_prefix(prefix.as_str()).ok_or_else(|| {
                Error::text_block("malformed line triple-quoted block: text left of the closing marker")
                    .at_line(*number, raw)
            })?;
            lines.push(stripped);
        }
        Ok(lines.join("\n"))
    }

    fn run_directive(&mut self, line: &Line) -> Result<()> {
        let (name, argument) = split_directive(&line.raw)?;
        let parser = self.parser;
        let directive = parser
            .directives
            .get(&name)
            .ok_or_else(|| Error::directive(format!("unknown directive '{}'", name)))?;

        trace!(directive = %name, argument = ?argument, line = line.number, "dispatching directive");
        directive.apply(self, argument.as_deref())
    }
}

fn strip_trailing_comment(tokens: &[Token]) -> &[Token] {
    match tokens.split_last() {
        Some((last, rest)) if last.is_comment() => rest,
        _ => tokens,
    }
}

/// Splits `=name argument` into a lower-cased name and the decoded argument.
fn split_directive(raw: &str) -> Result<(String, Option<String>)> {
    let body = raw.trim().strip_prefix('=').unwrap_or(raw).trim_start();
    let (name, rest) = match body.find(char::is_whitespace) {
        Some(split) => (&body[..split], body[split..].trim()),
        None => (body, ""),
    };
    if name.is_empty() {
        return Err(Error::directive("missing directive name after '='"));
    }

    let name = name.to_lowercase();
    if rest.is_empty() {
        return Ok((name, None));
    }

    let tokens = tokenize(rest).map_err(|_| {
        Error::directive(format!("invalid argument for directive '{}': {}", name, rest))
    })?;
    match strip_trailing_comment(&tokens) {
        [] => Ok((name, None)),
        [Token::String(argument)] => Ok((name, Some(argument.clone()))),
        _ => Err(Error::directive(format!(
            "invalid argument for directive '{}': {}",
            name, rest
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{perky, ErrorKind};

    fn parse(text: &str) -> Result<Value> {
        Parser::new().parse_str(text)
    }

    #[test]
    fn test_split_directive() {
        assert_eq!(
            split_directive("=Include  'my file.pky' ").unwrap(),
            ("include".to_string(), Some("my file.pky".to_string()))
        );
        assert_eq!(
            split_directive("  = reset").unwrap(),
            ("reset".to_string(), None)
        );
        assert_eq!(split_directive("=").unwrap_err().kind(), Some(ErrorKind::Directive));
        assert_eq!(
            split_directive("=include a = b").unwrap_err().kind(),
            Some(ErrorKind::Directive)
        );
    }

    #[test]
    fn test_empty_value_and_trailing_comment() {
        let value = parse("a =\nb = c # why not\n# alone\n").unwrap();
        assert_eq!(value, perky!({ "a": "", "b": "c" }));
    }

    #[test]
    fn test_sequence_root() {
        let parser = Parser::new().with_root(Root::Sequence);
        let value = parser.parse_str("a\n{\n    k = v\n}\n[]\n'quoted # not a comment'").unwrap();
        assert_eq!(
            value,
            perky!(["a", { "k": "v" }, [], "quoted # not a comment"])
        );
    }

    #[test]
    fn test_closers_at_root() {
        assert_eq!(parse("}").unwrap_err().kind(), Some(ErrorKind::Structure));
        let parser = Parser::new().with_root(Root::Sequence);
        assert_eq!(parser.parse_str("]").unwrap_err().kind(), Some(ErrorKind::Structure));
        // A mismatched closer is a shape error too.
        assert_eq!(parse("a = [\n}\n]").unwrap_err().kind(), Some(ErrorKind::Structure));
    }

    #[test]
    fn test_missing_closer() {
        let err = parse("a = {\n  b = c\n").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Structure));
        assert!(err.to_string().contains("missing '}'"));
    }

    #[test]
    fn test_duplicate_keys_are_per_container() {
        let err = parse("a = 3\na = 5").unwrap_err();
        let format = err.as_format_error().unwrap();
        assert_eq!(format.kind(), ErrorKind::Structure);
        assert_eq!(format.line_number(), Some(2));

        let value = parse("a = {\n  x = 1\n}\nb = {\n  x = 2\n}").unwrap();
        assert_eq!(value, perky!({ "a": { "x": "1" }, "b": { "x": "2" } }));
    }

    #[test]
    fn test_invalid_token_sequence() {
        for text in ["a = b = c", "a b", "= =", "a = }", "[x]"] {
            let err = parse(text).unwrap_err();
            assert!(
                matches!(err.kind(), Some(ErrorKind::Structure) | Some(ErrorKind::Directive)),
                "{}: {}",
                text,
                err
            );
        }
        let err = parse("a = b = c").unwrap_err();
        let format = err.as_format_error().unwrap();
        assert_eq!(format.message(), "invalid token sequence");
        assert_eq!(format.tokens(), Some("a = b = c"));
    }

    #[test]
    fn test_text_block_margin() {
        let value = parse("t = '''\n    one\n\n      two  \n    '''").unwrap();
        assert_eq!(value, perky!({ "t": "one\n\n  two" }));

        let err = parse("t = '''\n    one\n  two\n    '''").unwrap_err();
        let format = err.as_format_error().unwrap();
        assert_eq!(format.kind(), ErrorKind::TextBlock);
        assert_eq!(format.line_number(), Some(3));
    }

    #[test]
    fn test_unterminated_text_block() {
        let err = parse("t = \"\"\"\n  one\n  '''").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::TextBlock));
    }

    #[test]
    fn test_unknown_directive() {
        let err = parse("=frobnicate now").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Directive));
        assert!(err.to_string().contains("frobnicate"));

        let err = Parser::without_directives().parse_str("=include x").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Directive));
    }

    #[test]
    fn test_directive_sees_innermost_container() {
        let parser = Parser::without_directives().with_directive(
            "mark",
            |state: &mut ParseState<'_>, argument: Option<&str>| -> Result<()> {
                let depth = state.depth().to_string();
                match state.current_mut() {
                    Some(Value::Mapping(map)) => {
                        map.insert(argument.unwrap_or("depth").to_string(), Value::from(depth));
                    }
                    Some(Value::Sequence(items)) => items.push(Value::from(depth)),
                    _ => {}
                }
                Ok(())
            },
        );

        let value = parser
            .parse_str("=mark\nouter = {\n    =MARK inner\n    list = [\n        =mark\n    ]\n}")
            .unwrap();
        assert_eq!(
            value,
            perky!({ "depth": "1", "outer": { "inner": "2", "list": ["3"] } })
        );
    }

    #[test]
    fn test_replace_current_checks_kind() {
        let parser = Parser::without_directives().with_directive(
            "clobber",
            |state: &mut ParseState<'_>, _argument: Option<&str>| -> Result<()> {
                state.replace_current(Value::Sequence(vec![]))
            },
        );
        let err = parser.parse_str("=clobber").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Directive));
    }

    #[test]
    fn test_whitespace_tokens_do_not_change_grammar() {
        let parser = Parser::new().with_options(ParseOptions::new().with_suppress_whitespace(false));
        let value = parser.parse_str("  a  =  { \n   b = c  \n }  ").unwrap();
        assert_eq!(value, perky!({ "a": { "b": "c" } }));
    }
}
