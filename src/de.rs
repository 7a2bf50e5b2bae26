//! Perky deserialization.
//!
//! Parsing produces a [`Value`] tree; [`ValueDeserializer`] drives serde over that
//! tree so callers can read documents straight into their own types.
//!
//! Every scalar in a document is a string. When the target type asks for a bool
//! or a number, the string is parsed with `FromStr`; anything else is handed over
//! as text.
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_perky::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     aliases: Vec<String>,
//! }
//!
//! let text = "host = example.org\nport = 8080\naliases = [\n    www\n    web\n]";
//! let server: Server = from_str(text).unwrap();
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.aliases, vec!["www", "web"]);
//! ```

use crate::{Error, Map, Result, Value};
use serde::de::value::StringDeserializer;
use serde::de::{self, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;

/// Deserializes from an owned [`Value`] tree.
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }

    fn into_string(self, expected: &str) -> Result<String> {
        match self.value {
            Value::String(s) => Ok(s),
            other => Err(Error::custom(format!(
                "expected {}, found {}",
                expected,
                other.kind_name()
            ))),
        }
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($ty:ty),)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                let text = self.into_string(stringify!($ty))?;
                let parsed = text.parse::<$ty>().map_err(|_| {
                    Error::custom(format!("invalid {} value: {:?}", stringify!($ty), text))
                })?;
                visitor.$visit(parsed)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_string(s),
            Value::Sequence(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Mapping(map) => visitor.visit_map(MapDeserializer::new(map)),
        }
    }

    deserialize_parsed! {
        deserialize_bool => visit_bool(bool),
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
        deserialize_char => visit_char(char),
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) if s.is_empty() => visitor.visit_unit(),
            other => Err(Error::custom(format!(
                "expected an empty string for unit, found {}",
                other
            ))),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Value::Mapping(map) if map.len() == 1 => {
                let (variant, value) = map
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::custom("empty enum mapping"))?;
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                })
            }
            other => Err(Error::custom(format!(
                "expected a variant name or a one-entry mapping for enum {}, found {}",
                name,
                other.kind_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        str string bytes byte_buf seq tuple tuple_struct map struct identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, Error> for Value {
    type Deserializer = ValueDeserializer;

    fn into_deserializer(self) -> ValueDeserializer {
        ValueDeserializer::new(self)
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(items: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: items.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: <Map as IntoIterator>::IntoIter,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: Map) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(StringDeserializer::<Error>::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        seed.deserialize(ValueDeserializer::new(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, VariantDeserializer)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(StringDeserializer::<Error>::new(self.variant))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(value) => Err(Error::custom(format!(
                "unit variant carries a {}",
                value.kind_name()
            ))),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("newtype variant is missing its value")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Sequence(items)) => visitor.visit_seq(SeqDeserializer::new(items)),
            _ => Err(Error::custom("tuple variant expects a sequence")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Mapping(map)) => visitor.visit_map(MapDeserializer::new(map)),
            _ => Err(Error::custom("struct variant expects a mapping")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perky;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    fn from<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T> {
        T::deserialize(ValueDeserializer::new(value))
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Limits {
        max: u32,
        ratio: f64,
        strict: bool,
        label: Option<String>,
    }

    #[test]
    fn test_typed_scalars_parse() {
        let limits: Limits = from(perky!({ "max": "10", "ratio": "0.25", "strict": "false" })).unwrap();
        assert_eq!(
            limits,
            Limits {
                max: 10,
                ratio: 0.25,
                strict: false,
                label: None
            }
        );
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let result: Result<Limits> = from(perky!({ "max": "ten", "ratio": "1", "strict": "true" }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("invalid u32 value"));
    }

    #[test]
    fn test_no_silent_boolean_coercion() {
        let result: Result<bool> = from(perky!("yes"));
        assert!(result.is_err());
    }

    #[test]
    fn test_untyped_stays_text() {
        let map: BTreeMap<String, Value> = from(perky!({ "a": "1", "b": ["x"] })).unwrap();
        assert_eq!(map["a"], Value::from("1"));
        assert_eq!(map["b"], perky!(["x"]));

        let value: Value = from(perky!({ "nested": { "k": "v" } })).unwrap();
        assert_eq!(value, perky!({ "nested": { "k": "v" } }));
    }

    #[test]
    fn test_enums() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Mode {
            Fast,
            Limited(u8),
            Pair(String, String),
            Window { width: u16, height: u16 },
        }

        assert_eq!(from::<Mode>(perky!("Fast")).unwrap(), Mode::Fast);
        assert_eq!(from::<Mode>(perky!({ "Limited": "3" })).unwrap(), Mode::Limited(3));
        assert_eq!(
            from::<Mode>(perky!({ "Pair": ["a", "b"] })).unwrap(),
            Mode::Pair("a".into(), "b".into())
        );
        assert_eq!(
            from::<Mode>(perky!({ "Window": { "width": "80", "height": "24" } })).unwrap(),
            Mode::Window {
                width: 80,
                height: 24
            }
        );
        assert!(from::<Mode>(perky!(["Fast"])).is_err());
    }

    #[test]
    fn test_keys_deserialize_as_strings_or_variants() {
        #[derive(Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord)]
        #[serde(rename_all = "lowercase")]
        enum Level {
            Info,
            Debug,
        }

        let sinks: BTreeMap<Level, Vec<String>> =
            from(perky!({ "info": ["stderr"], "debug": ["file", "stderr"] })).unwrap();
        assert_eq!(sinks[&Level::Info], vec!["stderr"]);
        assert_eq!(sinks[&Level::Debug], vec!["file", "stderr"]);

        let ports: BTreeMap<String, u16> = from(perky!({ "http": "80" })).unwrap();
        assert_eq!(ports["http"], 80);

        let err = from::<BTreeMap<Level, String>>(perky!({ "trace": "x" })).unwrap_err();
        assert!(err.to_string().contains("trace"));
    }

    #[test]
    fn test_shape_mismatch() {
        let result: Result<Vec<String>> = from(perky!({ "a": "b" }));
        assert!(result.is_err());
        let result: Result<String> = from(perky!(["a"]));
        assert!(result.is_err());
    }
}
