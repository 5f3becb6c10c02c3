//! Dotted-path CRUD over the free-form `custom` part of a session
//!
//! Paths are split on `.`; every segment but the last names a nested
//! mapping. `set` is permissive and builds (or clobbers) the intermediate
//! mappings it needs. `update` and `delete` are strict: the whole path must
//! already exist. None of these touch the store; persisting is the caller's
//! job (see [`crate::dispatch::Context`]).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nested JSON mapping stored under `session.custom`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomTree(Map<String, Value>);

/// Splits `a.b.c` into (`[a, b]`, `c`)
fn split_path(path: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or(path);
    (segments, last)
}

impl CustomTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Create-or-replace `path`, building intermediate mappings as needed.
    ///
    /// An intermediate segment holding a non-mapping value is replaced by an
    /// empty mapping.
    pub fn set(&mut self, path: &str, value: Value) -> bool {
        let (parents, last) = split_path(path);
        let mut current = &mut self.0;

        for segment in parents {
            let slot = current.entry(segment.to_string()).or_insert(Value::Null);
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = match slot.as_object_mut() {
                Some(map) => map,
                None => return false,
            };
        }

        current.insert(last.to_string(), value);
        true
    }

    /// Value at `path`, or `None` as soon as a segment is missing or a
    /// non-mapping is hit mid-path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Mapping that holds the final segment, when every parent exists and is a mapping
    fn parent_mut(&mut self, parents: &[&str]) -> Option<&mut Map<String, Value>> {
        let mut current = &mut self.0;
        for segment in parents {
            current = current.get_mut(*segment)?.as_object_mut()?;
        }
        Some(current)
    }

    /// Overwrites an existing key; `false` (and no change) if any part of
    /// the path is absent
    pub fn update_one(&mut self, path: &str, value: Value) -> bool {
        let (parents, last) = split_path(path);
        match self.parent_mut(&parents).and_then(|parent| parent.get_mut(last)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Strict multi-key update. Each path is applied independently and gets
    /// its own result.
    pub fn update<I, K>(&mut self, updates: I) -> UpdateReport
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let results = updates
            .into_iter()
            .map(|(path, value)| {
                let path = path.into();
                let applied = self.update_one(&path, value);
                (path, applied)
            })
            .collect();
        UpdateReport { results }
    }

    /// Removes the final segment of `path`; `false` if it does not resolve
    pub fn delete(&mut self, path: &str) -> bool {
        let (parents, last) = split_path(path);
        self.parent_mut(&parents)
            .and_then(|parent| parent.remove(last))
            .is_some()
    }
}

impl From<Map<String, Value>> for CustomTree {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Per-key outcome of [`CustomTree::update`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub results: Vec<(String, bool)>,
}

impl UpdateReport {
    pub fn applied(&self, path: &str) -> Option<bool> {
        self.results.iter().find(|(p, _)| p == path).map(|(_, ok)| *ok)
    }

    pub fn any_applied(&self) -> bool {
        self.results.iter().any(|(_, ok)| *ok)
    }

    pub fn all_applied(&self) -> bool {
        self.results.iter().all(|(_, ok)| *ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> CustomTree {
        match value {
            Value::Object(map) => CustomTree::from(map),
            _ => panic!("tree() takes an object"),
        }
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let mut custom = CustomTree::new();
        for (path, value) in [
            ("foo", json!("bar")),
            ("a.b.c", json!(3)),
            ("a.b.d", json!([1, 2])),
            ("x.y", json!({"z": true})),
            ("nul", Value::Null),
        ] {
            assert!(custom.set(path, value.clone()));
            assert_eq!(custom.get(path), Some(&value), "path {path}");
        }
        // siblings survive
        assert_eq!(custom.get("a.b.c"), Some(&json!(3)));
    }

    #[test]
    fn test_set_clobbers_non_mapping_intermediate() {
        let mut custom = tree(json!({"a": 5}));
        custom.set("a.b", json!("deep"));
        assert_eq!(custom.as_map().get("a"), Some(&json!({"b": "deep"})));
    }

    #[test]
    fn test_get_stops_at_missing_or_scalar() {
        let custom = tree(json!({"a": {"b": 1}, "s": "text"}));
        assert_eq!(custom.get("a.c"), None);
        assert_eq!(custom.get("missing.b"), None);
        assert_eq!(custom.get("s.len"), None);
        assert_eq!(custom.get("a.b.c"), None);
        assert_eq!(custom.get("a"), Some(&json!({"b": 1})));
    }

    #[test]
    fn test_delete_missing_final_key_leaves_tree_unchanged() {
        let mut custom = tree(json!({"a": {"b": 1}}));
        let before = custom.clone();
        assert!(!custom.delete("a.c"));
        assert!(!custom.delete("nope"));
        assert!(!custom.delete("a.b.c"));
        assert_eq!(custom, before);
    }

    #[test]
    fn test_delete_existing_key() {
        let mut custom = tree(json!({"a": {"b": 1, "c": 2}, "count": 1}));
        assert!(custom.delete("a.b"));
        assert!(custom.delete("count"));
        assert_eq!(custom, tree(json!({"a": {"c": 2}})));
    }

    #[test]
    fn test_update_requires_existing_path() {
        let mut custom = tree(json!({"a": {"b": 1}, "hello": "x"}));
        let before = custom.clone();

        let report = custom.update([("a.missing.b", json!(9)), ("nothere", json!(1))]);
        assert!(!report.any_applied());
        assert_eq!(report.applied("a.missing.b"), Some(false));
        assert_eq!(custom, before);
    }

    #[test]
    fn test_update_reports_per_key() {
        let mut custom = tree(json!({"a": {"b": 1}, "hello": "x"}));
        let report = custom.update([("hello", json!("world")), ("count", json!(1)), ("a.b", json!(2))]);

        assert_eq!(report.applied("hello"), Some(true));
        assert_eq!(report.applied("count"), Some(false));
        assert_eq!(report.applied("a.b"), Some(true));
        assert!(report.any_applied());
        assert!(!report.all_applied());
        assert_eq!(custom, tree(json!({"a": {"b": 2}, "hello": "world"})));
    }

    #[test]
    fn test_update_through_scalar_intermediate_fails() {
        let mut custom = tree(json!({"a": 1}));
        assert!(!custom.update_one("a.b", json!(2)));
        assert_eq!(custom.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let custom = tree(json!({"foo": "bar"}));
        assert_eq!(serde_json::to_string(&custom).unwrap(), r#"{"foo":"bar"}"#);
    }
}
