//! Configuration options for Perky parsing and serialization.
//!
//! - [`ParseOptions`]: root container kind and tokenizer behaviour
//! - [`SerializeOptions`]: indentation of the written text
//! - [`Root`]: whether a document is read as a mapping or as a sequence
//!
//! ## Examples
//!
//! ```rust
//! use serde_perky::{ParseOptions, Parser, Root, SerializeOptions};
//!
//! let parser = Parser::new().with_options(ParseOptions::new().with_root(Root::Sequence));
//! let value = parser.parse_str("a\nb").unwrap();
//! assert_eq!(value.as_sequence().map(Vec::len), Some(2));
//!
//! let options = SerializeOptions::new().with_indent(2);
//! assert_eq!(options.indent_unit(), "  ");
//! ```

/// The kind of container a document body is read into.
///
/// # Examples
///
/// ```rust
/// use serde_perky::Root;
///
/// assert_eq!(Root::default(), Root::Mapping);
/// assert_eq!(Root::Sequence.as_str(), "sequence");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Root {
    #[default]
    Mapping,
    Sequence,
}

impl Root {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Root::Mapping => "mapping",
            Root::Sequence => "sequence",
        }
    }
}

/// Options controlling how documents are parsed.
///
/// `suppress_whitespace` only affects the tokens handed to diagnostics; the
/// structural grammar never looks at whitespace tokens.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseOptions {
    pub root: Root,
    pub suppress_whitespace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            root: Root::Mapping,
            suppress_whitespace: true,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the kind of the root container.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_perky::{ParseOptions, Root};
    ///
    /// let options = ParseOptions::new().with_root(Root::Sequence);
    /// assert_eq!(options.root, Root::Sequence);
    /// ```
    #[must_use]
    pub fn with_root(mut self, root: Root) -> Self {
        self.root = root;
        self
    }

    #[must_use]
    pub fn with_suppress_whitespace(mut self, suppress: bool) -> Self {
        self.suppress_whitespace = suppress;
        self
    }
}

/// Options controlling serialized output.
///
/// # Examples
///
/// ```rust
/// use serde_perky::SerializeOptions;
///
/// let options = SerializeOptions::new();
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SerializeOptions {
    /// Number of spaces per nesting level.
    pub indent: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions { indent: 4 }
    }
}

impl SerializeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// An indent of zero is accepted; text blocks then close at the left margin
    /// and keep their lines verbatim.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent)
    }
}
