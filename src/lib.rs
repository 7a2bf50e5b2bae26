//! # serde_perky
//!
//! A Serde-compatible engine for Perky, a small, line-oriented configuration format
//! meant to be written by hand.
//!
//! ## What is Perky?
//!
//! Perky documents are nested mappings and sequences whose every leaf is a string:
//!
//! ```text
//! # server settings
//! name = edge-proxy
//! listen = [
//!     0.0.0.0:80
//!     '[::]:80'
//! ]
//! limits = {
//!     connections = 512
//! }
//! motd = """
//!     Welcome.
//!     Be nice.
//!     """
//! =include local.pky
//! ```
//!
//! ## Key Features
//!
//! - **Strings only**: no numbers, booleans or nulls to guess about; typed reads parse
//!   on demand through serde
//! - **Text blocks**: `'''` / `"""` blocks dedented to their closing marker
//! - **Directives**: `=name argument` lines dispatched to caller-registered handlers,
//!   with a built-in `include` that merges other files in place
//! - **Lossless round trips**: [`to_string`] output parses back to the same tree
//! - **Errors with context**: every format error carries its kind, line number and
//!   the offending text
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_perky::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Service {
//!     name: String,
//!     port: u16,
//!     tags: Vec<String>,
//! }
//!
//! let service = Service {
//!     name: "api".to_string(),
//!     port: 8080,
//!     tags: vec!["internal".to_string()],
//! };
//!
//! let text = to_string(&service).unwrap();
//! assert_eq!(text, "name = api\nport = 8080\ntags = [\n    internal\n]");
//!
//! let back: Service = from_str(&text).unwrap();
//! assert_eq!(service, back);
//! ```
//!
//! ### Working with trees
//!
//! ```rust
//! use serde_perky::{merge, parse_str, perky, Value};
//!
//! let base = parse_str("level = info\nsinks = [\n    stderr\n]").unwrap();
//! let local = perky!({ "level": "debug", "sinks": ["file"] });
//!
//! let merged = merge(&Value::Mapping(base), &local).unwrap();
//! assert_eq!(merged, perky!({ "level": "debug", "sinks": ["stderr", "file"] }));
//! ```
//!
//! ### Directives
//!
//! ```rust
//! use serde_perky::{IncludeDirective, Parser};
//!
//! let parser = Parser::new()
//!     .with_directive("include", IncludeDirective::new().with_search_dirs(["conf.d", "."]));
//! assert!(parser.directives().contains("include"));
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (file parses and include resolution at
//! `debug`, directive dispatch and text blocks at `trace`). Install any subscriber
//! to see them.
//!
//! See [`syntax`] for the full grammar.

pub mod cursor;
pub mod de;
pub mod directive;
pub mod error;
pub mod lexer;
pub mod macros;
pub mod map;
pub mod merge;
pub mod options;
pub mod parser;
pub mod reader;
pub mod ser;
pub mod syntax;
pub mod value;

pub use cursor::Cursor;
pub use de::ValueDeserializer;
pub use directive::{Directive, Directives, IncludeDirective};
pub use error::{Error, ErrorKind, FormatError, Result};
pub use lexer::{tokenize, tokenize_with_whitespace, Lexer, Token};
pub use map::Map;
pub use merge::{merge, merge_all};
pub use options::{ParseOptions, Root, SerializeOptions};
pub use parser::{ParseState, Parser};
pub use reader::{Line, LineReader};
pub use ser::{Serializer, ValueSerializer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::Path;

/// Parses a document into a mapping, with the built-in `include` directive.
///
/// # Examples
///
/// ```rust
/// use serde_perky::parse_str;
///
/// let map = parse_str("a = 1\nb = {\n    c = 2\n}").unwrap();
/// assert_eq!(map["a"].as_str(), Some("1"));
/// assert_eq!(map["b"].get("c").and_then(|v| v.as_str()), Some("2"));
/// ```
///
/// # Errors
///
/// Returns the first lex, structure, text block, directive or include error.
pub fn parse_str(text: &str) -> Result<Map> {
    Map::try_from(Parser::new().parse_str(text)?)
}

/// Reads and parses a file into a mapping, with the built-in `include` directive.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, otherwise as [`parse_str`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<Map> {
    Map::try_from(Parser::new().parse_file(path)?)
}

/// Deserialize an instance of type `T` from Perky text.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_perky::from_str;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = -2").unwrap();
/// assert_eq!(point, Point { x: 1, y: -2 });
/// ```
///
/// # Errors
///
/// Returns a format error for invalid text, or a custom error if the tree does
/// not fit `T`.
pub fn from_str<T>(text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(Parser::new().parse_str(text)?)
}

/// Deserialize an instance of type `T` from a [`Value`] tree.
///
/// # Errors
///
/// Returns a custom error if the tree does not fit `T`.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}

/// Convert any `T: Serialize` to a [`Value`] tree.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_perky::{perky, to_value};
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_value(&Point { x: 1, y: 2 }).unwrap(), perky!({ "x": "1", "y": "2" }));
/// ```
///
/// # Errors
///
/// Returns a serialization error for byte strings, `None`, unit values and
/// non-string map keys.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Serialize any `T: Serialize` to Perky text with four-space indentation.
///
/// The result has no trailing newline.
///
/// # Errors
///
/// Returns a serialization error if the value has no text form or is not a
/// mapping or a sequence at the top.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, SerializeOptions::default())
}

/// Serialize any `T: Serialize` to Perky text with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_perky::{perky, to_string_with_options, SerializeOptions};
///
/// let value = perky!({ "outer": { "inner": "x" } });
/// let text = to_string_with_options(&value, SerializeOptions::new().with_indent(2)).unwrap();
/// assert_eq!(text, "outer = {\n  inner = x\n}");
/// ```
///
/// # Errors
///
/// As [`to_string`].
pub fn to_string_with_options<T>(value: &T, options: SerializeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let tree = to_value(value)?;
    let mut serializer = Serializer::new(options);
    serializer.serialize_document(&tree)?;
    Ok(serializer.into_inner())
}

/// Serialize any `T: Serialize` to a writer, followed by a newline.
///
/// # Examples
///
/// ```rust
/// use serde_perky::{perky, to_writer};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &perky!(["a", "b"])).unwrap();
/// assert_eq!(buffer, b"a\nb\n");
/// ```
///
/// # Errors
///
/// Returns a serialization error, or [`Error::Io`] if writing fails.
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut text = to_string(value)?;
    text.push('\n');
    writer
        .write_all(text.as_bytes())
        .map_err(|err| Error::io("<writer>", &err))
}

/// Serialize any `T: Serialize` into the file at `path`, followed by a newline.
///
/// # Errors
///
/// Returns a serialization error, or [`Error::Io`] if the file cannot be written.
pub fn write_file<T>(path: impl AsRef<Path>, value: &T) -> Result<()>
where
    T: ?Sized + Serialize,
{
    let path = path.as_ref();
    let mut text = to_string(value)?;
    text.push('\n');
    std::fs::write(path, text).map_err(|err| Error::io(path.display(), &err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let text = to_string(&point).unwrap();
        assert_eq!(text, "x = 1\ny = 2");
        let point_back: Point = from_str(&text).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let user = User {
            id: 123,
            name: "Alice Smith".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "on call".to_string(), String::new()],
        };

        let text = to_string(&user).unwrap();
        let user_back: User = from_str(&text).unwrap();
        assert_eq!(user, user_back);
    }

    #[test]
    fn test_to_value() {
        let value = to_value(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(value.get("x"), Some(&Value::from("1")));
        assert_eq!(value.get("y"), Some(&Value::from("2")));
    }

    #[test]
    fn test_sequence_document() {
        let numbers = vec![1, 2, 3];
        let text = to_string(&numbers).unwrap();
        assert_eq!(text, "1\n2\n3");
        let back: Vec<i32> = from_value(
            Parser::new().with_root(Root::Sequence).parse_str(&text).unwrap(),
        )
        .unwrap();
        assert_eq!(numbers, back);
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        let err = to_string(&42).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Serialization));
    }

    #[test]
    fn test_write_file_ends_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pky");
        write_file(&path, &Point { x: 3, y: 4 }).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x = 3\ny = 4\n");

        let map = parse_file(&path).unwrap();
        assert_eq!(map["x"].as_str(), Some("3"));
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file("definitely/not/here.pky").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
