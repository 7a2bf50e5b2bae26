/// Builds a [`Value`](crate::Value) tree from a JSON-like literal.
///
/// Leaves are strings; anything convertible with `Value::from` is accepted in
/// leaf position.
///
/// ```rust
/// use serde_perky::{perky, Value};
///
/// let value = perky!({
///     "name": "web",
///     "hosts": ["a.example", "b.example"],
///     "limits": {}
/// });
/// assert_eq!(value.get("name"), Some(&Value::from("web")));
/// ```
#[macro_export]
macro_rules! perky {
    ([]) => {
        $crate::Value::Sequence(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Sequence(vec![$($crate::perky!($elem)),*])
    };

    ({}) => {
        $crate::Value::Mapping($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut mapping = $crate::Map::new();
        $(
            mapping.insert(::std::string::String::from($key), $crate::perky!($value));
        )*
        $crate::Value::Mapping(mapping)
    }};

    ($leaf:expr) => {
        $crate::Value::from($leaf)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Map, Value};

    #[test]
    fn test_perky_macro_leaves() {
        assert_eq!(perky!("hello"), Value::String("hello".to_string()));
        let owned = String::from("owned");
        assert_eq!(perky!(owned), Value::String("owned".to_string()));
    }

    #[test]
    fn test_perky_macro_sequences() {
        assert_eq!(perky!([]), Value::Sequence(vec![]));
        assert_eq!(
            perky!(["1", "2", "3",]),
            Value::Sequence(vec![Value::from("1"), Value::from("2"), Value::from("3")])
        );
    }

    #[test]
    fn test_perky_macro_mappings() {
        assert_eq!(perky!({}), Value::Mapping(Map::new()));

        let value = perky!({
            "name": "Alice",
            "tags": ["x"],
            "nested": { "deep": "yes" }
        });
        let map = value.as_mapping().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("name"), Some(&Value::from("Alice")));
        assert_eq!(
            value.get("nested").and_then(|n| n.get("deep")),
            Some(&Value::from("yes"))
        );
    }
}
