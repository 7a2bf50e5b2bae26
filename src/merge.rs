//! Structural merge of value trees.
//!
//! - Mappings: keys found in one input pass through; keys found in both merge
//!   recursively when either value is a container, otherwise the later string wins.
//! - Sequences: concatenation in argument order. No deduplication, no recursion.
//! - A container merged with a value of another shape is a merge error.
//!
//! Inputs are never modified; every call builds a fresh tree.
//!
//! ```rust
//! use serde_perky::{merge, perky};
//!
//! let defaults = perky!({ "host": "localhost", "ports": ["80"] });
//! let site = perky!({ "host": "example.org", "ports": ["443"] });
//!
//! let merged = merge(&defaults, &site).unwrap();
//! assert_eq!(merged, perky!({ "host": "example.org", "ports": ["80", "443"] }));
//! ```

use crate::{Error, Map, Result, Value};

/// Merges two trees; `later` wins string conflicts.
///
/// # Errors
///
/// Returns a merge error when a mapping, a sequence or a string meet at the same
/// position.
pub fn merge(earlier: &Value, later: &Value) -> Result<Value> {
    merge_with(earlier, later, Prefer::Later)
}

/// Which input keeps its strings when both define the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Prefer {
    Earlier,
    Later,
}

/// [`merge`] with a choice of winner for string conflicts. Key order and sequence
/// order always follow the argument order.
pub(crate) fn merge_with(earlier: &Value, later: &Value, prefer: Prefer) -> Result<Value> {
    merge_at(earlier, later, prefer, &mut Vec::new())
}

/// Folds [`merge`] over any number of trees, left to right.
///
/// # Examples
///
/// ```rust
/// use serde_perky::{merge_all, perky};
///
/// let merged = merge_all(&[perky!(["a"]), perky!(["b"]), perky!(["c"])]).unwrap();
/// assert_eq!(merged, perky!(["a", "b", "c"]));
/// ```
///
/// # Errors
///
/// Returns a merge error for an empty input or on the first shape mismatch.
pub fn merge_all<'a, I>(values: I) -> Result<Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut values = values.into_iter();
    let first = values
        .next()
        .ok_or_else(|| Error::merge("nothing to merge"))?;

    values.try_fold(first.clone(), |merged, next| merge(&merged, next))
}

fn merge_at(earlier: &Value, later: &Value, prefer: Prefer, path: &mut Vec<String>) -> Result<Value> {
    match (earlier, later) {
        (Value::Mapping(a), Value::Mapping(b)) => merge_mappings(a, b, prefer, path).map(Value::Mapping),
        (Value::Sequence(a), Value::Sequence(b)) => {
            let mut items = Vec::with_capacity(a.len() + b.len());
            items.extend(a.iter().cloned());
            items.extend(b.iter().cloned());
            Ok(Value::Sequence(items))
        }
        (Value::String(_), Value::String(_)) => Ok(match prefer {
            Prefer::Earlier => earlier.clone(),
            Prefer::Later => later.clone(),
        }),
        (a, b) => Err(Error::merge(format!(
            "cannot merge {} with {}{}",
            a.kind_name(),
            b.kind_name(),
            describe_path(path)
        ))),
    }
}

fn merge_mappings(
    earlier: &Map,
    later: &Map,
    prefer: Prefer,
    path: &mut Vec<String>,
) -> Result<Map> {
    let mut merged = earlier.clone();
    for (key, value) in later {
        let combined = match earlier.get(key) {
            Some(existing) => {
                path.push(key.clone());
                let result = merge_at(existing, value, prefer, path);
                path.pop();
                result?
            }
            None => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    Ok(merged)
}

fn describe_path(path: &[String]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at key '{}'", path.join("."))
    }
}
