//! Perky serialization.
//!
//! Two serializers live here:
//!
//! - [`Serializer`] writes a [`Value`] tree as Perky text
//! - [`ValueSerializer`] is a serde serializer that turns any `T: Serialize` into
//!   a [`Value`] tree, stringifying numbers, booleans and chars on the way
//!
//! ## Output shape
//!
//! One line per scalar or structural token, four spaces of indent per level by
//! default:
//!
//! ```rust
//! use serde_perky::{perky, to_string};
//!
//! let value = perky!({
//!     "name": "demo",
//!     "hosts": ["a", "b"],
//!     "notes": "first\nsecond"
//! });
//!
//! let text = to_string(&value).unwrap();
//! assert_eq!(
//!     text,
//!     "name = demo\nhosts = [\n    a\n    b\n]\nnotes = \"\"\"\n    first\n    second\n    \"\"\""
//! );
//! ```
//!
//! ## Quoting
//!
//! Strings are written bare unless they are empty, have leading or trailing
//! whitespace, contain an operator character, a tab or a newline. Quoted strings
//! use whichever of `"` and `'` needs fewer escapes.

use crate::lexer::is_operator;
use crate::{Error, Map, Result, SerializeOptions, Value};
use serde::ser::Impossible;
use serde::{ser, Serialize};
use std::borrow::Cow;

const TEXT_BLOCK_MARKERS: [&str; 2] = ["\"\"\"", "'''"];

/// Writes [`Value`] trees as Perky text.
///
/// # Examples
///
/// ```rust
/// use serde_perky::{perky, SerializeOptions, Serializer};
///
/// let mut serializer = Serializer::new(SerializeOptions::new().with_indent(2));
/// serializer.serialize_document(&perky!({ "a": { "b": "c" } })).unwrap();
/// assert_eq!(serializer.into_inner(), "a = {\n  b = c\n}");
/// ```
pub struct Serializer {
    lines: Vec<String>,
    options: SerializeOptions,
}

impl Serializer {
    #[must_use]
    pub fn new(options: SerializeOptions) -> Self {
        Serializer {
            lines: Vec::new(),
            options,
        }
    }

    /// Appends a whole document. The root must be a mapping or a sequence.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for a string root.
    pub fn serialize_document(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Mapping(map) => self.write_mapping(map, 0),
            Value::Sequence(items) => self.write_sequence(items, 0),
            Value::String(_) => {
                return Err(Error::serialization(
                    "a document root must be a mapping or a sequence, found a string",
                ))
            }
        }
        Ok(())
    }

    /// The text written so far, lines joined with `\n` and no final newline.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.lines.join("\n")
    }

    fn push_line(&mut self, depth: usize, text: &str) {
        let indent = depth * self.options.indent;
        let mut line = String::with_capacity(indent + text.len());
        line.extend(std::iter::repeat(' ').take(indent));
        line.push_str(text);
        self.lines.push(line);
    }

    fn write_mapping(&mut self, map: &Map, depth: usize) {
        for (key, value) in map {
            let lead = format!("{} = ", quote(key));
            self.write_value(&lead, value, depth);
        }
    }

    fn write_sequence(&mut self, items: &[Value], depth: usize) {
        for item in items {
            self.write_value("", item, depth);
        }
    }

    fn write_value(&mut self, lead: &str, value: &Value, depth: usize) {
        match value {
            Value::String(s) if s.contains('\n') => match text_block_marker(s) {
                Some(marker) => {
                    self.push_line(depth, &format!("{}{}", lead, marker));
                    for line in s.split('\n') {
                        if line.is_empty() {
                            self.lines.push(String::new());
                        } else {
                            self.push_line(depth + 1, line);
                        }
                    }
                    self.push_line(depth + 1, marker);
                }
                None => self.push_line(depth, &format!("{}{}", lead, quote(s))),
            },
            Value::String(s) => self.push_line(depth, &format!("{}{}", lead, quote(s))),
            Value::Mapping(map) if map.is_empty() => self.push_line(depth, &format!("{}{{}}", lead)),
            Value::Mapping(map) => {
                self.push_line(depth, &format!("{}{{", lead));
                self.write_mapping(map, depth + 1);
                self.push_line(depth, "}");
            }
            Value::Sequence(items) if items.is_empty() => {
                self.push_line(depth, &format!("{}[]", lead))
            }
            Value::Sequence(items) => {
                self.push_line(depth, &format!("{}[", lead));
                self.write_sequence(items, depth + 1);
                self.push_line(depth, "]");
            }
        }
    }
}

/// Picks a text block marker that reads `text` back unchanged, if any.
///
/// A block loses trailing whitespace on its lines and ends at the first line equal
/// to its marker.
fn text_block_marker(text: &str) -> Option<&'static str> {
    if text.split('\n').any(|line| line != line.trim_end()) {
        return None;
    }
    TEXT_BLOCK_MARKERS
        .into_iter()
        .find(|marker| text.split('\n').all(|line| line.trim() != *marker))
}

/// Returns `true` if `s` cannot be written as a bare string.
///
/// # Examples
///
/// ```rust
/// use serde_perky::ser::needs_quoting;
///
/// assert!(!needs_quoting("plain words"));
/// assert!(needs_quoting(""));
/// assert!(needs_quoting(" padded"));
/// assert!(needs_quoting("a = b"));
/// assert!(needs_quoting("tab\there"));
/// ```
#[must_use]
pub fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.trim() != s
        || s.starts_with(|c: char| c == '\'' || c == '"')
        || s.contains(|c: char| is_operator(c) || c == '\t' || c == '\n')
}

/// Writes `s` bare when possible, otherwise quoted with minimal escaping.
///
/// # Examples
///
/// ```rust
/// use serde_perky::ser::quote;
///
/// assert_eq!(quote("plain"), "plain");
/// assert_eq!(quote("it's"), "\"it's\"");
/// assert_eq!(quote("say \"hi\""), "'say \"hi\"'");
/// assert_eq!(quote("a\tb"), "\"a\\tb\"");
/// ```
#[must_use]
pub fn quote(s: &str) -> Cow<'_, str> {
    if !needs_quoting(s) {
        return Cow::Borrowed(s);
    }

    let double_pieces = s.split('"').count();
    let single_pieces = s.split('\'').count();
    let quote = if single_pieces < double_pieces { '\'' } else { '"' };

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push(quote);
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\t' => quoted.push_str("\\t"),
            '\n' => quoted.push_str("\\n"),
            c if c == quote => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push(quote);
    Cow::Owned(quoted)
}

/// Serde serializer producing [`Value`] trees.
///
/// Numbers, booleans and chars become their display text. Unit variants become
/// their name; other enum variants become a one-entry mapping keyed by the
/// variant name.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeTupleVariant {
    name: String,
    vec: Vec<Value>,
}

pub struct SerializeMap {
    map: Map,
    current_key: Option<String>,
}

pub struct SerializeStructVariant {
    name: String,
    map: Map,
}

fn to_perky_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

fn single_entry(name: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(name.to_string(), value);
    Value::Mapping(map)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Value> {
        Err(Error::serialization("byte strings have no text representation"))
    }

    fn serialize_none(self) -> Result<Value> {
        Err(Error::serialization(
            "None has no text representation; skip the field instead",
        ))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Err(Error::serialization("unit values have no text representation"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Err(Error::serialization(format!(
            "unit struct {} has no text representation",
            name
        )))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(single_entry(variant, to_perky_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            name: variant.to_string(),
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            map: Map::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            name: variant.to_string(),
            map: Map::with_capacity(len),
        })
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_perky_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Sequence(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_perky_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(single_entry(&self.name, Value::Sequence(self.vec)))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_perky_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Mapping(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_perky_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Mapping(self.map))
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_perky_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(single_entry(&self.name, Value::Mapping(self.map)))
    }
}

/// Accepts only string-like map keys.
struct KeySerializer;

fn key_error(found: &str) -> Error {
    Error::serialization(format!("mapping keys must be strings, found {}", found))
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<String> {
        Err(key_error("a boolean"))
    }

    fn serialize_i8(self, _v: i8) -> Result<String> {
        Err(key_error("an integer"))
    }

    fn serialize_i16(self, _v: i16) -> Result<String> {
        Err(key_error("an integer"))
    }

    fn serialize_i32(self, _v: i32) -> Result<String> {
        Err(key_error("an integer"))
    }

    fn serialize_i64(self, _v: i64) -> Result<String> {
        Err(key_error("an integer"))
    }

    fn serialize_u8(self, _v: u8) -> Result<String> {
        Err(key_error("an integer"))
    }

    fn serialize_u16(self, _v: u16) -> Result<String> {
        Err(key_error("an integer"))
    }

    fn serialize_u32(self, _v: u32) -> Result<String> {
        Err(key_error("an integer"))
    }

    fn serialize_u64(self, _v: u64) -> Result<String> {
        Err(key_error("an integer"))
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(key_error("a float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(key_error("a float"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_error("bytes"))
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_error("None"))
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_error("an option"))
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_error("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_error("a unit struct"))
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_error("an enum variant with data"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_error("a sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_error("a tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_error("a tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_error("a tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_error("a map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_error("a struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_error("a struct variant"))
    }
}
