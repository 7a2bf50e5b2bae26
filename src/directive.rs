//! Directive dispatch and the built-in `include` directive.
//!
//! A line whose first non-blank character is `=` is a directive:
//!
//! ```text
//! =include common.pky
//! ```
//!
//! The word after `=` names the handler (case-insensitive); the optional rest of
//! the line is its argument and must lex to exactly one string. Handlers implement
//! [`Directive`] and receive the [`ParseState`] so they can inspect and rewrite the
//! container being filled.

use crate::merge::{merge_with, Prefer};
use crate::parser::{OwnKeys, ParseState};
use crate::{Error, Map, Result, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A handler for `=name argument` lines.
///
/// Closures of the right shape implement this trait:
///
/// ```rust
/// use serde_perky::{Parser, ParseState, Result};
///
/// let parser = Parser::new().with_directive(
///     "noop",
///     |_state: &mut ParseState<'_>, _argument: Option<&str>| -> Result<()> { Ok(()) },
/// );
/// assert!(parser.parse_str("=noop whatever").is_ok());
/// ```
pub trait Directive: Send + Sync {
    /// Runs the directive against the innermost open container of `state`.
    ///
    /// # Errors
    ///
    /// Any error aborts the parse; it is reported at the directive's line.
    fn apply(&self, state: &mut ParseState<'_>, argument: Option<&str>) -> Result<()>;
}

impl<F> Directive for F
where
    F: Fn(&mut ParseState<'_>, Option<&str>) -> Result<()> + Send + Sync,
{
    fn apply(&self, state: &mut ParseState<'_>, argument: Option<&str>) -> Result<()> {
        self(state, argument)
    }
}

/// Name to handler table used by a [`Parser`](crate::Parser).
#[derive(Clone, Default)]
pub struct Directives {
    handlers: HashMap<String, Arc<dyn Directive>>,
}

impl Directives {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `directive` under the lower-cased `name`.
    pub fn insert(&mut self, name: &str, directive: impl Directive + 'static) {
        self.handlers.insert(name.to_lowercase(), Arc::new(directive));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Directive> {
        self.handlers
            .get(&name.to_lowercase())
            .map(|handler| handler.as_ref())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_lowercase())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.handlers.remove(&name.to_lowercase()).is_some()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Directives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Parses another file and folds it into the container holding the directive.
///
/// The argument is a file name. Absolute paths are used as they are; relative
/// ones are tried against each search directory in order and the first existing
/// file wins. The file is parsed with the same parser, into the same kind of
/// container as the one the directive appears in.
///
/// In a mapping, keys defined by the including document's own lines keep their
/// values over included ones; among included values the later include wins. In
/// a sequence the included items are appended.
///
/// # Examples
///
/// ```rust,no_run
/// use serde_perky::{IncludeDirective, Parser};
///
/// let parser = Parser::new().with_directive(
///     "include",
///     IncludeDirective::new().with_search_dirs(["conf.d", "/etc/myapp"]),
/// );
/// let config = parser.parse_file("conf.d/main.pky").unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeDirective {
    search_dirs: Vec<PathBuf>,
}

impl Default for IncludeDirective {
    fn default() -> Self {
        Self::new()
    }
}

impl IncludeDirective {
    /// Searches the current directory only.
    #[must_use]
    pub fn new() -> Self {
        IncludeDirective {
            search_dirs: vec![PathBuf::from(".")],
        }
    }

    #[must_use]
    pub fn with_search_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Finds the file an include argument refers to.
    ///
    /// # Errors
    ///
    /// Returns an include error if no candidate exists.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let requested = Path::new(name);
        if requested.is_absolute() {
            if requested.is_file() {
                return Ok(requested.to_path_buf());
            }
            return Err(Error::include(format!("include file '{}' not found", name)));
        }

        self.search_dirs
            .iter()
            .map(|dir| dir.join(requested))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                let searched: Vec<String> = self
                    .search_dirs
                    .iter()
                    .map(|dir| dir.display().to_string())
                    .collect();
                Error::include(format!(
                    "include file '{}' not found (searched: {})",
                    name,
                    searched.join(", ")
                ))
            })
    }
}

impl Directive for IncludeDirective {
    fn apply(&self, state: &mut ParseState<'_>, argument: Option<&str>) -> Result<()> {
        let name = argument.ok_or_else(|| Error::directive("include requires a file name"))?;
        let root = state
            .current_root()
            .ok_or_else(|| Error::directive("include must appear inside a mapping or a sequence"))?;

        let path = self.resolve(name)?;
        debug!(name, path = %path.display(), line = state.line_number(), "resolved include");

        let included = state.parse_nested_file(&path, root)?;
        let combined = match (state.current(), included) {
            (Some(Value::Mapping(current)), Value::Mapping(included)) => {
                let own = state.own_keys().cloned().unwrap_or_default();
                Value::Mapping(overlay_mapping(&own, current, included, "")?)
            }
            (Some(Value::Sequence(current)), Value::Sequence(included)) => {
                let mut items = current.clone();
                items.extend(included);
                Value::Sequence(items)
            }
            (_, included) => {
                return Err(Error::include(format!(
                    "'{}' parsed into a {} that does not fit the enclosing container",
                    name,
                    included.kind_name()
                )))
            }
        };
        state.replace_current(combined)
    }
}

/// Folds `included` into `current`, giving the document's own keys precedence.
///
/// `own` holds the keys the document defined itself, nested mappings included.
/// Below a key the document did not define, everything came from includes and
/// the later one wins.
fn overlay_mapping(own: &OwnKeys, current: &Map, mut included: Map, path: &str) -> Result<Map> {
    let mut result = Map::with_capacity(current.len() + included.len());
    for (key, value) in current {
        let merged = match included.remove(key) {
            None => value.clone(),
            Some(incoming) => {
                let path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                overlay_value(own.nested(key), value, incoming, &path)?
            }
        };
        result.insert(key.clone(), merged);
    }
    result.extend(included);
    Ok(result)
}

fn overlay_value(own: Option<&OwnKeys>, current: &Value, incoming: Value, path: &str) -> Result<Value> {
    let merged = match (own, current, incoming) {
        (Some(own), Value::Mapping(current), Value::Mapping(incoming)) => {
            return overlay_mapping(own, current, incoming, path).map(Value::Mapping);
        }
        (Some(_), current, incoming) => merge_with(current, &incoming, Prefer::Earlier),
        (None, current, incoming) => merge_with(current, &incoming, Prefer::Later),
    };
    merged.map_err(|err| match err {
        Error::Format(format) => Error::merge(format!("{} (key '{}')", format.message(), path)),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{perky, ErrorKind, Parser, Root};
    use std::fs;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn parser_for(dir: &Path) -> Parser {
        Parser::new().with_directive("include", IncludeDirective::new().with_search_dirs([dir]))
    }

    #[test]
    fn test_registry_is_case_insensitive() {
        let mut directives = Directives::new();
        directives.insert("Include", IncludeDirective::new());
        assert!(directives.contains("INCLUDE"));
        assert!(directives.get("include").is_some());
        assert_eq!(directives.names(), vec!["include"]);
        assert!(directives.remove("include"));
        assert!(directives.is_empty());
    }

    #[test]
    fn test_resolve_uses_first_existing_dir() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(second.path(), "a.pky", "a = second");

        let include = IncludeDirective::new().with_search_dirs([first.path(), second.path()]);
        assert_eq!(include.resolve("a.pky").unwrap(), second.path().join("a.pky"));

        write(first.path(), "a.pky", "a = first");
        assert_eq!(include.resolve("a.pky").unwrap(), first.path().join("a.pky"));

        let err = include.resolve("missing.pky").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Include));
    }

    #[test]
    fn test_absolute_path_bypasses_search_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "abs.pky", "k = v");
        let include = IncludeDirective::new().with_search_dirs(Vec::<PathBuf>::new());
        assert_eq!(include.resolve(path.to_str().unwrap()).unwrap(), path);
    }

    #[test]
    fn test_own_keys_win_over_included() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sub.pky", "x = 2\ny = 3");
        let value = parser_for(dir.path())
            .parse_str("x = 1\n=include sub.pky")
            .unwrap();
        assert_eq!(value, perky!({ "x": "1", "y": "3" }));
    }

    #[test]
    fn test_later_include_wins() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.pky", "a = one\nb = one");
        write(dir.path(), "two.pky", "a = two");
        let value = parser_for(dir.path())
            .parse_str("=include one.pky\n=include two.pky")
            .unwrap();
        assert_eq!(value, perky!({ "a": "two", "b": "one" }));
    }

    #[test]
    fn test_later_include_wins_inside_own_mapping() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.pky", "sub = {\n    a = one\n    b = one\n}");
        write(dir.path(), "two.pky", "sub = {\n    a = two\n    b = two\n}");
        let value = parser_for(dir.path())
            .parse_str("sub = {\n    a = own\n}\n=include one.pky\n=include two.pky")
            .unwrap();
        assert_eq!(value, perky!({ "sub": { "a": "own", "b": "two" } }));
    }

    #[test]
    fn test_sequence_include_appends() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "more.pky", "c\nd");
        let value = parser_for(dir.path())
            .with_root(Root::Sequence)
            .parse_str("a\nb\n=include more.pky")
            .unwrap();
        assert_eq!(value, perky!(["a", "b", "c", "d"]));
    }

    #[test]
    fn test_include_cycle() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.pky", "=include b.pky");
        write(dir.path(), "b.pky", "=include a.pky");
        let err = parser_for(dir.path())
            .parse_file(dir.path().join("a.pky"))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Include));
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_include_requires_argument() {
        let err = Parser::new().parse_str("=include").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Directive));
    }

    #[test]
    fn test_shape_conflict_is_merge_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sub.pky", "k = [\n    x\n]");
        let err = parser_for(dir.path())
            .parse_str("=include sub.pky\nk = value\n=include sub.pky")
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Merge));
        assert_eq!(err.as_format_error().unwrap().line_number(), Some(3));
    }
}
