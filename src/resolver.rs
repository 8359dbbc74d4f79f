//! Dotted key resolution.
//!
//! A dotted key such as `app.feature.enabled` names a root entry (`app`) and a
//! path (`feature.enabled`) inside that entry's JSON value. Everything here is
//! pure: no I/O and no state.
//!
//! Path operations only descend through JSON objects. Reading or deleting
//! through a scalar or array yields nothing; writing through one replaces it
//! with a fresh object.

use serde_json::{Map, Value};

/// Separator between key segments.
pub const SEPARATOR: char = '.';

/// The part of a dotted key below its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPath<'a> {
    /// The key had no separator and addresses the whole entry.
    Whole,
    /// Remaining dot-joined segments, e.g. `b.c` for `a.b.c`.
    Nested(&'a str),
}

impl<'a> KeyPath<'a> {
    /// Whether this path addresses the whole entry.
    #[must_use]
    pub const fn is_whole(self) -> bool {
        matches!(self, Self::Whole)
    }

    /// Iterate over the path segments (empty for [`KeyPath::Whole`]).
    pub fn segments(self) -> impl Iterator<Item = &'a str> {
        let path = match self {
            Self::Whole => None,
            Self::Nested(path) => Some(path),
        };
        path.into_iter().flat_map(|p| p.split(SEPARATOR))
    }
}

/// Split a dotted key into its root key and path.
///
/// ```
/// use registry::resolver::{split, KeyPath};
///
/// assert_eq!(split("app"), ("app", KeyPath::Whole));
/// assert_eq!(split("app.feature.enabled"), ("app", KeyPath::Nested("feature.enabled")));
/// ```
#[must_use]
pub fn split(key: &str) -> (&str, KeyPath<'_>) {
    match key.split_once(SEPARATOR) {
        Some((root, rest)) => (root, KeyPath::Nested(rest)),
        None => (key, KeyPath::Whole),
    }
}

/// Read the value at `path` inside `value`.
///
/// Returns `None` if any segment is missing or an intermediate level is not
/// an object.
#[must_use]
pub fn read_path<'v>(value: &'v Value, path: KeyPath<'_>) -> Option<&'v Value> {
    path.segments()
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Write `new_value` at `path` inside `value` and return the result.
///
/// Missing intermediate levels are created as empty objects, and any
/// intermediate that is not an object (the root value included) is replaced
/// by one. Writing at [`KeyPath::Whole`] returns `new_value`.
#[must_use]
pub fn write_path(value: Value, path: KeyPath<'_>, new_value: Value) -> Value {
    write_segments(value, path.segments(), new_value)
}

fn write_segments<'s, I>(value: Value, mut segments: I, new_value: Value) -> Value
where
    I: Iterator<Item = &'s str>,
{
    let Some(segment) = segments.next() else {
        return new_value;
    };

    let mut map = match value {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let child = map.remove(segment).unwrap_or(Value::Null);
    map.insert(segment.to_string(), write_segments(child, segments, new_value));
    Value::Object(map)
}

/// Remove the leaf named by `path` from `value`.
///
/// Returns `None` for [`KeyPath::Whole`]: the entry itself is gone. For a
/// nested path the updated value is returned; a missing leaf or a missing
/// intermediate level leaves it untouched.
#[must_use]
pub fn delete_path(value: Value, path: KeyPath<'_>) -> Option<Value> {
    let KeyPath::Nested(nested) = path else {
        return None;
    };

    let mut root = value;
    let (parents, leaf) = match nested.rsplit_once(SEPARATOR) {
        Some((parents, leaf)) => (KeyPath::Nested(parents), leaf),
        None => (KeyPath::Whole, nested),
    };

    if let Some(parent) = read_path_mut(&mut root, parents).and_then(Value::as_object_mut) {
        parent.remove(leaf);
    }

    Some(root)
}

fn read_path_mut<'v>(value: &'v mut Value, path: KeyPath<'_>) -> Option<&'v mut Value> {
    path.segments()
        .try_fold(value, |current, segment| current.as_object_mut()?.get_mut(segment))
}
