//! Path resolution over a JSON value tree.
//!
//! Every function here either succeeds or leaves the tree untouched. The one
//! that creates missing objects checks up front that the rest of the path can
//! be created before it inserts anything.

use crate::error::{Error, Result};
use crate::path::{KeyPath, Segment};
use serde_json::{Map, Value};

const CONTAINER: &str = "object or array";

/// Short name for the variant of `value`, used in error messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

/// `true` for objects and arrays.
pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn path_type(path: &KeyPath, depth: usize, expected: &'static str, found: &Value) -> Error {
    Error::PathType {
        path: path.prefix(depth),
        expected,
        found: kind(found),
    }
}

fn not_found(path: &KeyPath, depth: usize) -> Error {
    Error::KeyNotFound {
        path: path.prefix(depth),
    }
}

fn step<'t>(node: &'t Value, segment: &Segment, path: &KeyPath, depth: usize) -> Result<&'t Value> {
    match node {
        Value::Object(map) => match segment {
            Segment::Key(k) => map.get(k).ok_or_else(|| not_found(path, depth + 1)),
            Segment::Index(_) => Err(path_type(path, depth, "array", node)),
        },
        Value::Array(arr) => {
            let index = segment
                .as_index()
                .ok_or_else(|| path_type(path, depth, "object", node))?;
            arr.get(index).ok_or_else(|| not_found(path, depth + 1))
        }
        _ => Err(path_type(path, depth, CONTAINER, node)),
    }
}

fn step_mut<'t>(
    node: &'t mut Value,
    segment: &Segment,
    path: &KeyPath,
    depth: usize,
) -> Result<&'t mut Value> {
    match node {
        Value::Object(map) => match segment {
            Segment::Key(k) => map.get_mut(k).ok_or_else(|| not_found(path, depth + 1)),
            Segment::Index(_) => Err(Error::PathType {
                path: path.prefix(depth),
                expected: "array",
                found: "object",
            }),
        },
        Value::Array(arr) => {
            let index = segment.as_index().ok_or_else(|| Error::PathType {
                path: path.prefix(depth),
                expected: "object",
                found: "array",
            })?;
            arr.get_mut(index).ok_or_else(|| not_found(path, depth + 1))
        }
        other => Err(path_type(path, depth, CONTAINER, other)),
    }
}

/// Walk `path` from `tree`, failing at the first missing key or mismatched
/// variant.
pub fn resolve<'t>(tree: &'t Value, path: &KeyPath) -> Result<&'t Value> {
    let mut cursor = tree;
    for (depth, segment) in path.iter().enumerate() {
        cursor = step(cursor, segment, path, depth)?;
    }
    Ok(cursor)
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut<'t>(tree: &'t mut Value, path: &KeyPath) -> Result<&'t mut Value> {
    let mut cursor = tree;
    for (depth, segment) in path.iter().enumerate() {
        cursor = step_mut(cursor, segment, path, depth)?;
    }
    Ok(cursor)
}

/// Like [`resolve_mut`], but missing object members along `path` are created
/// as empty objects. `tail` is the segment the caller will address inside the
/// result; a freshly created object can only take a key there.
fn ensure_objects<'t>(
    tree: &'t mut Value,
    path: &KeyPath,
    tail: Option<&Segment>,
) -> Result<&'t mut Value> {
    let mut cursor = tree;
    for (depth, segment) in path.iter().enumerate() {
        if let (Value::Object(map), Segment::Key(k)) = (&mut *cursor, segment) {
            if !map.contains_key(k) {
                let mut rest = path.segments()[depth + 1..].iter().chain(tail);
                if rest.any(|s| matches!(s, Segment::Index(_))) {
                    return Err(not_found(path, depth + 1));
                }
                map.insert(k.clone(), Value::Object(Map::new()));
            }
        }
        cursor = step_mut(cursor, segment, path, depth)?;
    }
    Ok(cursor)
}

/// Write `value` at `path`, creating intermediate objects. Returns the value
/// that was replaced, if any. An array index equal to the array's length
/// appends.
pub fn insert(tree: &mut Value, path: &KeyPath, value: Value) -> Result<Option<Value>> {
    let Some(last) = path.segments().last() else {
        if !is_container(&value) {
            return Err(path_type(path, 0, CONTAINER, &value));
        }
        return Ok(Some(std::mem::replace(tree, value)));
    };
    let parent_path = path.prefix(path.len() - 1);
    let parent = ensure_objects(tree, &parent_path, Some(last))?;
    match parent {
        Value::Object(map) => match last {
            Segment::Key(k) => Ok(map.insert(k.clone(), value)),
            Segment::Index(_) => Err(Error::PathType {
                path: parent_path,
                expected: "array",
                found: "object",
            }),
        },
        Value::Array(arr) => {
            let index = last.as_index().ok_or_else(|| Error::PathType {
                path: parent_path.clone(),
                expected: "object",
                found: "array",
            })?;
            if index < arr.len() {
                Ok(Some(std::mem::replace(&mut arr[index], value)))
            } else if index == arr.len() {
                arr.push(value);
                Ok(None)
            } else {
                Err(Error::KeyNotFound { path: path.clone() })
            }
        }
        other => Err(Error::PathType {
            path: parent_path,
            expected: CONTAINER,
            found: kind(other),
        }),
    }
}

/// Remove and return the value at `path`. The root cannot be removed.
pub fn remove(tree: &mut Value, path: &KeyPath) -> Result<Value> {
    let Some(last) = path.segments().last() else {
        return Err(Error::KeyNotFound { path: path.clone() });
    };
    let parent_path = path.prefix(path.len() - 1);
    match resolve_mut(tree, &parent_path)? {
        Value::Object(map) => match last {
            Segment::Key(k) => map
                .remove(k)
                .ok_or_else(|| Error::KeyNotFound { path: path.clone() }),
            Segment::Index(_) => Err(Error::PathType {
                path: parent_path,
                expected: "array",
                found: "object",
            }),
        },
        Value::Array(arr) => {
            let index = last.as_index().ok_or_else(|| Error::PathType {
                path: parent_path.clone(),
                expected: "object",
                found: "array",
            })?;
            if index < arr.len() {
                Ok(arr.remove(index))
            } else {
                Err(Error::KeyNotFound { path: path.clone() })
            }
        }
        other => Err(Error::PathType {
            path: parent_path,
            expected: CONTAINER,
            found: kind(other),
        }),
    }
}

/// Push `value` onto the array at `path`, creating the array (and any missing
/// parent objects) if absent. Returns the new element's index.
pub fn push(tree: &mut Value, path: &KeyPath, value: Value) -> Result<usize> {
    let exists = match resolve(tree, path) {
        Ok(_) => true,
        Err(Error::KeyNotFound { .. }) if !path.is_root() => false,
        Err(e) => return Err(e),
    };
    if !exists {
        insert(tree, path, Value::Array(vec![value]))?;
        return Ok(0);
    }
    match resolve_mut(tree, path)? {
        Value::Array(arr) => {
            arr.push(value);
            Ok(arr.len() - 1)
        }
        other => Err(Error::PathType {
            path: path.clone(),
            expected: "array",
            found: kind(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p<const N: usize>(keys: [&str; N]) -> KeyPath {
        KeyPath::new(keys)
    }

    #[test]
    fn resolve_walks_objects_and_arrays() {
        let tree = json!({"a": {"b": [10, {"c": true}]}});
        assert_eq!(resolve(&tree, &p(["a", "b", "0"])).unwrap(), &json!(10));
        let path = KeyPath::new(["a", "b"]).child(1usize).child("c");
        assert_eq!(resolve(&tree, &path).unwrap(), &json!(true));
        assert_eq!(resolve(&tree, &KeyPath::root()).unwrap(), &tree);
    }

    #[test]
    fn resolve_reports_first_mismatch() {
        let tree = json!({"a": 1, "l": [1]});
        assert_eq!(
            resolve(&tree, &p(["a", "b"])).unwrap_err(),
            Error::PathType {
                path: p(["a"]),
                expected: "object or array",
                found: "number",
            }
        );
        assert_eq!(
            resolve(&tree, &p(["x", "y"])).unwrap_err(),
            Error::KeyNotFound { path: p(["x"]) }
        );
        assert_eq!(
            resolve(&tree, &p(["l", "name"])).unwrap_err(),
            Error::PathType {
                path: p(["l"]),
                expected: "object",
                found: "array",
            }
        );
        assert_eq!(
            resolve(&tree, &p(["l", "5"])).unwrap_err(),
            Error::KeyNotFound { path: p(["l", "5"]) }
        );
    }

    #[test]
    fn insert_creates_intermediate_objects() {
        let mut tree = json!({});
        assert_eq!(insert(&mut tree, &p(["a", "b", "c"]), json!(1)).unwrap(), None);
        assert_eq!(tree, json!({"a": {"b": {"c": 1}}}));
        assert_eq!(
            insert(&mut tree, &p(["a", "b", "c"]), json!(2)).unwrap(),
            Some(json!(1))
        );
    }

    #[test]
    fn insert_into_scalar_fails_without_mutation() {
        let mut tree = json!({"a": 1});
        let err = insert(&mut tree, &p(["a", "b", "c"]), json!(1)).unwrap_err();
        assert!(matches!(err, Error::PathType { found: "number", .. }));
        assert_eq!(tree, json!({"a": 1}));
    }

    #[test]
    fn insert_refuses_to_invent_arrays() {
        let mut tree = json!({});
        let path = KeyPath::new(["x"]).child(0usize).child("y");
        let err = insert(&mut tree, &path, json!(1)).unwrap_err();
        assert_eq!(err, Error::KeyNotFound { path: p(["x"]) });
        assert_eq!(tree, json!({}));
    }

    #[test]
    fn insert_array_positions() {
        let mut tree = json!({"l": [1, 2]});
        insert(&mut tree, &KeyPath::new(["l"]).child(0usize), json!(9)).unwrap();
        insert(&mut tree, &KeyPath::new(["l"]).child(2usize), json!(3)).unwrap();
        assert_eq!(tree, json!({"l": [9, 2, 3]}));
        let err = insert(&mut tree, &KeyPath::new(["l"]).child(7usize), json!(0)).unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { .. }));
    }

    #[test]
    fn insert_at_root_requires_container() {
        let mut tree = json!({"a": 1});
        assert!(insert(&mut tree, &KeyPath::root(), json!("nope")).is_err());
        insert(&mut tree, &KeyPath::root(), json!([1])).unwrap();
        assert_eq!(tree, json!([1]));
    }

    #[test]
    fn remove_from_objects_and_arrays() {
        let mut tree = json!({"a": {"b": 1}, "l": [1, 2, 3]});
        assert_eq!(remove(&mut tree, &p(["a", "b"])).unwrap(), json!(1));
        assert_eq!(remove(&mut tree, &p(["l", "1"])).unwrap(), json!(2));
        assert_eq!(tree, json!({"a": {}, "l": [1, 3]}));
        assert_eq!(
            remove(&mut tree, &p(["a", "b"])).unwrap_err(),
            Error::KeyNotFound { path: p(["a", "b"]) }
        );
    }

    #[test]
    fn push_creates_missing_array() {
        let mut tree = json!({});
        assert_eq!(push(&mut tree, &p(["tags"]), json!("x")).unwrap(), 0);
        assert_eq!(push(&mut tree, &p(["tags"]), json!("y")).unwrap(), 1);
        assert_eq!(tree, json!({"tags": ["x", "y"]}));

        let mut tree = json!({"tags": {}});
        assert!(matches!(
            push(&mut tree, &p(["tags"]), json!(1)).unwrap_err(),
            Error::PathType { expected: "array", .. }
        ));
    }
}
