//! Path Accessor - Dotted/bracketed addressing into a [`Value`].
//!
//! Paths look like `name`, `owner.email`, `plans[0].price` or
//! `headers["x.forwarded"]`. Numeric segments (dotted or bracketed) address
//! array indices.
//!
//! - [`get`] never fails: missing data yields the caller's default.
//! - [`set`] never mutates: it returns a new root where only the spine from
//!   the root to the leaf is copied. Every sibling branch is shared.

use std::fmt;
use std::rc::Rc;

use super::{Map, Value};

// =============================================================================
// Path
// =============================================================================

/// Largest array index a path may address. Setting an index pads the array
/// with nulls up to it.
pub const MAX_INDEX: usize = 1 << 20;

/// One step of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl Segment {
    fn from_dotted(text: String, path: &str) -> Result<Segment, PathError> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Segment::Key(text));
        }
        match text.parse::<usize>() {
            Ok(index) if index <= MAX_INDEX => Ok(Segment::Index(index)),
            _ => Err(PathError::IndexTooLarge { path: path.to_string() }),
        }
    }

    fn from_bracket(inner: &str, path: &str) -> Result<Segment, PathError> {
        let inner = inner.trim();
        if inner.is_empty() {
            return Err(PathError::EmptySegment { path: path.to_string() });
        }
        let quoted = inner.len() >= 2
            && ((inner.starts_with('"') && inner.ends_with('"'))
                || (inner.starts_with('\'') && inner.ends_with('\'')));
        if quoted {
            return Ok(Segment::Key(inner[1..inner.len() - 1].to_string()));
        }
        Segment::from_dotted(inner.to_string(), path)
    }
}

/// Errors produced while parsing a path string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A `[` without its closing `]`.
    #[error("unclosed bracket in path `{path}`")]
    UnclosedBracket { path: String },

    /// `a..b`, `.a`, `a.` or `a[]`.
    #[error("empty segment in path `{path}`")]
    EmptySegment { path: String },

    /// An index above [`MAX_INDEX`].
    #[error("index too large in path `{path}`")]
    IndexTooLarge { path: String },
}

/// A parsed location inside a [`Value`]. The empty path is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted / bracketed path string.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        if input.is_empty() {
            return Ok(Self { segments });
        }

        let empty = || PathError::EmptySegment { path: input.to_string() };
        let mut current = String::new();
        let mut after_bracket = false;
        let mut chars = input.chars();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if current.is_empty() {
                        if !after_bracket {
                            return Err(empty());
                        }
                    } else {
                        segments.push(Segment::from_dotted(std::mem::take(&mut current), input)?);
                    }
                    after_bracket = false;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(Segment::from_dotted(std::mem::take(&mut current), input)?);
                    }
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(PathError::UnclosedBracket { path: input.to_string() });
                    }
                    segments.push(Segment::from_bracket(&inner, input)?);
                    after_bracket = true;
                }
                _ => {
                    current.push(c);
                    after_bracket = false;
                }
            }
        }

        if !current.is_empty() {
            segments.push(Segment::from_dotted(current, input)?);
        } else if !after_bracket {
            // trailing '.'
            return Err(empty());
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// This path extended by an object key.
    pub fn key(&self, key: impl Into<String>) -> Path {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.into()));
        Path { segments }
    }

    /// This path extended by an array index. [`set`] ignores indices above
    /// [`MAX_INDEX`].
    pub fn index(&self, index: usize) -> Path {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Path { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) if key.contains(['.', '[', ']']) || key.is_empty() => {
                    write!(f, "[\"{key}\"]")?
                }
                Segment::Key(key) if i == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Path::parse(value)
    }
}

// =============================================================================
// Read
// =============================================================================

/// Borrow the value at `path`, or `None` if any step is missing or null.
pub fn lookup<'a>(value: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.segments() {
        current = match (current, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get(key)?,
            (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string())?,
            (Value::Array(items), Segment::Index(index)) => items.get(*index)?,
            _ => return None,
        };
    }
    if current.is_null() { None } else { Some(current) }
}

/// The value at `path`, or `default` if anything along the way is absent.
pub fn get(value: &Value, path: &Path, default: Value) -> Value {
    lookup(value, path).cloned().unwrap_or(default)
}

/// [`get`] with a path string. An unparsable path yields `default`.
pub fn get_in(value: &Value, path: &str, default: Value) -> Value {
    match Path::parse(path) {
        Ok(path) => get(value, &path, default),
        Err(_) => default,
    }
}

// =============================================================================
// Write
// =============================================================================

/// A new root with `leaf` stored at `path`.
///
/// Only the containers on the path are copied. Missing containers are
/// created: an index segment creates an array (padded with nulls), a key
/// segment creates an object. A key segment over an array or scalar replaces
/// it with an object; an index segment over an object addresses the key with
/// the index's decimal text. An array index above [`MAX_INDEX`] leaves the
/// value unchanged.
pub fn set(value: &Value, path: &Path, leaf: Value) -> Value {
    set_segments(value, path.segments(), leaf)
}

/// [`set`] with a path string.
pub fn set_in(value: &Value, path: &str, leaf: Value) -> Result<Value, PathError> {
    Ok(set(value, &Path::parse(path)?, leaf))
}

fn set_segments(node: &Value, segments: &[Segment], leaf: Value) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return leaf;
    };
    let null = Value::Null;

    match (node, head) {
        (Value::Object(map), Segment::Index(index)) => {
            let key = index.to_string();
            let child = set_segments(map.get(&key).unwrap_or(&null), rest, leaf);
            let mut map = Map::clone(map);
            map.insert(key, child);
            Value::Object(Rc::new(map))
        }
        (_, Segment::Index(index)) if *index > MAX_INDEX => {
            tracing::warn!(index, "array index out of range, value left unchanged");
            node.clone()
        }
        (_, Segment::Index(index)) => {
            let existing = node.as_array();
            let child = set_segments(
                existing.and_then(|items| items.get(*index)).unwrap_or(&null),
                rest,
                leaf,
            );
            let mut items = existing.map(<[Value]>::to_vec).unwrap_or_default();
            if items.len() <= *index {
                items.resize(*index + 1, Value::Null);
            }
            items[*index] = child;
            Value::Array(Rc::new(items))
        }
        (_, Segment::Key(key)) => {
            let existing = node.as_object();
            let child = set_segments(
                existing.and_then(|map| map.get(key)).unwrap_or(&null),
                rest,
                leaf,
            );
            let mut map = existing.cloned().unwrap_or_default();
            map.insert(key.clone(), child);
            Value::Object(Rc::new(map))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test_case("name", &[Segment::Key("name".into())] ; "single key")]
    #[test_case("a.b", &[Segment::Key("a".into()), Segment::Key("b".into())] ; "dotted")]
    #[test_case("a[0].b", &[Segment::Key("a".into()), Segment::Index(0), Segment::Key("b".into())] ; "bracket index")]
    #[test_case("a.1", &[Segment::Key("a".into()), Segment::Index(1)] ; "dotted index")]
    #[test_case("a[\"x.y\"]", &[Segment::Key("a".into()), Segment::Key("x.y".into())] ; "quoted key")]
    #[test_case("[2][3]", &[Segment::Index(2), Segment::Index(3)] ; "leading brackets")]
    fn test_parse(input: &str, expected: &[Segment]) {
        assert_eq!(Path::parse(input).unwrap().segments(), expected);
    }

    #[test_case("a..b" ; "double dot")]
    #[test_case(".a" ; "leading dot")]
    #[test_case("a." ; "trailing dot")]
    #[test_case("a[]" ; "empty bracket")]
    #[test_case("a[0" ; "unclosed bracket")]
    #[test_case("a[18446744073709551615]" ; "usize max index")]
    #[test_case("a[18446744073709551616]" ; "index beyond usize")]
    #[test_case("a.100000000000" ; "huge dotted index")]
    fn test_parse_rejects(input: &str) {
        assert!(Path::parse(input).is_err(), "`{input}` should not parse");
    }

    #[test]
    fn test_set_rejects_huge_index() {
        let result = set_in(&Value::Null, "a[18446744073709551615]", Value::from(1));
        assert!(matches!(result, Err(PathError::IndexTooLarge { .. })), "got {result:?}");

        let value = v(json!({ "a": [1] }));
        let next = set(&value, &Path::root().key("a").index(usize::MAX), Value::from(2));
        assert!(
            next.get_key("a").unwrap().ptr_eq(value.get_key("a").unwrap()),
            "out of range index leaves the array as is"
        );

        let edge = set_in(&Value::Null, &format!("a[{MAX_INDEX}]"), Value::from(3)).unwrap();
        assert_eq!(edge.get_key("a").and_then(Value::as_array).map(<[Value]>::len), Some(MAX_INDEX + 1));
    }

    #[test]
    fn test_null_leaf_reads_as_default() {
        let next = set_in(&v(json!({ "a": 1 })), "a", Value::Null).unwrap();
        let path = Path::parse("a").unwrap();

        assert_eq!(get(&next, &path, Value::from(7)), Value::from(7), "null reads as absent");
        assert_eq!(lookup(&next, &path), None);
        assert_eq!(next.get_key("a"), Some(&Value::Null), "the key is still stored");
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["a.b[0].c", "x", "[1]", "a[\"k.v\"]"] {
            let path = Path::parse(text).unwrap();
            assert_eq!(Path::parse(&path.to_string()).unwrap(), path, "display of {text}");
        }
    }

    #[test]
    fn test_get_returns_default_for_missing() {
        let value = v(json!({ "a": { "b": null }, "list": [1] }));

        assert_eq!(get_in(&value, "a.b.c", Value::from(7)), Value::from(7));
        assert_eq!(get_in(&value, "a.b", Value::from("d")), Value::from("d"));
        assert_eq!(get_in(&value, "list[4]", Value::from(0)), Value::from(0));
        assert_eq!(get_in(&value, "list.x", Value::Null), Value::Null);
        assert_eq!(get_in(&value, "list[0]", Value::Null), Value::from(1));
    }

    #[test]
    fn test_set_creates_intermediates() {
        let next = set_in(&Value::Null, "a.items[1].name", Value::from("n")).unwrap();

        assert_eq!(
            serde_json::Value::from(&next),
            json!({ "a": { "items": [null, { "name": "n" }] } })
        );
    }

    #[test]
    fn test_set_shares_siblings() {
        let value = v(json!({ "a": { "x": [1, 2], "y": { "z": 1 } }, "b": { "c": 1 } }));
        let next = set_in(&value, "a.y.z", Value::from(2)).unwrap();

        assert_eq!(get_in(&next, "a.y.z", Value::Null), Value::from(2));
        assert_eq!(get_in(&value, "a.y.z", Value::Null), Value::from(1), "input untouched");
        assert!(get_in(&next, "b", Value::Null).ptr_eq(&get_in(&value, "b", Value::Null)));
        assert!(get_in(&next, "a.x", Value::Null).ptr_eq(&get_in(&value, "a.x", Value::Null)));
        assert!(!next.ptr_eq(&value), "root is a new allocation");
    }

    #[test]
    fn test_set_index_on_object_uses_key() {
        let value = v(json!({ "m": { "0": "zero" } }));
        let next = set_in(&value, "m.0", Value::from("nil")).unwrap();

        assert_eq!(serde_json::Value::from(&next), json!({ "m": { "0": "nil" } }));
    }

    #[test]
    fn test_set_root_replaces_value() {
        let next = set(&v(json!({ "a": 1 })), &Path::root(), Value::from(3));
        assert_eq!(next, Value::from(3));
    }
}
