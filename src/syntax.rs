//! The Perky format, as read and written by this crate.
//!
//! # Lines
//!
//! A document is a sequence of lines separated by `\n` (a trailing `\r` is
//! dropped). Blank lines are ignored everywhere except inside text blocks. Every
//! token lives on one line.
//!
//! # Mappings
//!
//! A document is a mapping unless the caller asks for a sequence root. Each line
//! of a mapping is one of:
//!
//! ```text
//! key = value
//! key =                 # the empty string
//! key = {               # nested mapping, closed by a lone }
//! key = [               # nested sequence, closed by a lone ]
//! key = {}              # empty mapping
//! key = []              # empty sequence
//! key = '''             # text block
//! # comment
//! =directive argument
//! ```
//!
//! Keys are unique within the mapping that defines them:
//!
//! ```rust
//! use serde_perky::{parse_str, ErrorKind};
//!
//! assert!(parse_str("a = {\n    k = 1\n}\nb = {\n    k = 2\n}").is_ok());
//! assert_eq!(parse_str("k = 1\nk = 2").unwrap_err().kind(), Some(ErrorKind::Structure));
//! ```
//!
//! # Sequences
//!
//! Each line of a sequence is one value, a comment, a directive or the closing `]`.
//!
//! ```rust
//! use serde_perky::{parse_str, perky, Value};
//!
//! let map = parse_str("hosts = [\n    alpha\n    'beta # not a comment'\n    {\n        port = 80\n    }\n]").unwrap();
//! assert_eq!(
//!     Value::Mapping(map),
//!     perky!({ "hosts": ["alpha", "beta # not a comment", { "port": "80" }] })
//! );
//! ```
//!
//! # Strings
//!
//! Unquoted strings run to the next operator character (`= { } [ ] # ' "`) and
//! lose trailing whitespace. Quoted strings use `'` or `"` and understand the
//! escapes `\\ \' \" \a \b \f \n \r \t \v`, `\xHH`, octal `\ooo`, `\uXXXX`,
//! `\UXXXXXXXX` and `\N{NAME}` for a table of common character names.
//!
//! ```rust
//! use serde_perky::parse_str;
//!
//! let map = parse_str(r#"path = "C:\\temp"
//! tab = 'a\tb'
//! arrow = "\u2192"
//! eol = "\N{END OF LINE}""#).unwrap();
//! assert_eq!(map["path"].as_str(), Some("C:\\temp"));
//! assert_eq!(map["tab"].as_str(), Some("a\tb"));
//! assert_eq!(map["arrow"].as_str(), Some("\u{2192}"));
//! assert_eq!(map["eol"].as_str(), Some("\n"));
//! ```
//!
//! # Text blocks
//!
//! `'''` or `"""` must be the last token on its line. The block runs until a line
//! holding only the same marker; that line's indentation is removed from every
//! line of the block, and lines indented less than it are an error. Lines are
//! right-trimmed and joined with `\n`.
//!
//! ```rust
//! use serde_perky::parse_str;
//!
//! let map = parse_str("poem = '''\n    roses\n      are red\n    '''").unwrap();
//! assert_eq!(map["poem"].as_str(), Some("roses\n  are red"));
//! ```
//!
//! # Directives
//!
//! A line starting with `=` names a directive and an optional single string
//! argument. Unknown directives are an error. The built-in `include` parses the
//! named file into the enclosing container: in a mapping the enclosing document's
//! own keys win over included ones and later includes win over earlier ones; in a
//! sequence the included items are appended.
