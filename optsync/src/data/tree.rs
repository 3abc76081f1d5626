use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value::Scalar;
use crate::error::ReconcileError;

/// A node in the configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigNode {
    /// Scalar value stored at a full attribute path.
    Leaf(Scalar),
    /// Nested mapping for an intermediate path segment.
    Branch(ConfigTree),
}

impl ConfigNode {
    pub fn as_leaf(&self) -> Option<&Scalar> {
        match self {
            ConfigNode::Leaf(v) => Some(v),
            ConfigNode::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&ConfigTree> {
        match self {
            ConfigNode::Branch(t) => Some(t),
            ConfigNode::Leaf(_) => None,
        }
    }

    /// Turn this node into a branch, discarding a leaf value if present.
    fn make_branch(&mut self) -> &mut ConfigTree {
        if let ConfigNode::Leaf(_) = self {
            *self = ConfigNode::Branch(ConfigTree::new());
        }
        match self {
            ConfigNode::Branch(t) => t,
            ConfigNode::Leaf(_) => unreachable!("leaf was replaced above"),
        }
    }
}

/// How [`ConfigTree::insert`] treats an existing node in the way of a new
/// leaf: a scalar where an intermediate branch is needed (setting `a.b.c`
/// while `a.b` holds a value), or a branch where the leaf goes (setting
/// `a.b` while `a.b.c` exists).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Replace the blocking node. The most recent edit wins.
    #[default]
    Overwrite,
    /// Fail with [`ReconcileError::PathCollision`] and change nothing.
    Reject,
}

/// Text layout used when serializing a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextStyle {
    /// Two-space indented JSON.
    #[default]
    Pretty,
    /// Single-line JSON without whitespace.
    Compact,
}

/// Nested mapping of configuration values keyed by path segment.
///
/// Keys are kept sorted so the serialized form is canonical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ConfigTree(BTreeMap<String, ConfigNode>);

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigNode> {
        self.0.iter()
    }

    /// Get the node at a dotted path.
    pub fn get(&self, path: &str) -> Option<&ConfigNode> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.0.get(first)?;
        for seg in segments {
            node = node.as_branch()?.0.get(seg)?;
        }
        Some(node)
    }

    /// Get the scalar at a dotted path. Returns `None` when any segment is
    /// missing or the path ends on a branch.
    pub fn get_leaf(&self, path: &str) -> Option<&Scalar> {
        self.get(path).and_then(ConfigNode::as_leaf)
    }

    /// Path of the node that inserting a leaf at `path` would discard: the
    /// first proper prefix holding a scalar, or `path` itself when it holds
    /// a branch.
    pub fn collision(&self, path: &str) -> Option<String> {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments.split_last()?;
        let mut cur = self;
        for (i, seg) in parents.iter().enumerate() {
            match cur.0.get(*seg) {
                Some(ConfigNode::Branch(t)) => cur = t,
                Some(ConfigNode::Leaf(_)) => return Some(parents[..=i].join(".")),
                None => return None,
            }
        }
        match cur.0.get(*last) {
            Some(ConfigNode::Branch(_)) => Some(path.to_string()),
            _ => None,
        }
    }

    /// Insert a scalar at a dotted path, creating intermediate branches.
    ///
    /// Returns the path of the node that was discarded, if the policy
    /// allowed one to be overwritten.
    pub fn insert(
        &mut self,
        path: &str,
        value: Scalar,
        policy: CollisionPolicy,
    ) -> Result<Option<String>, ReconcileError> {
        if policy == CollisionPolicy::Reject
            && let Some(at) = self.collision(path)
        {
            return Err(ReconcileError::PathCollision {
                path: path.to_string(),
                at,
            });
        }
        Ok(self.set(path, value))
    }

    /// Insert a scalar at a dotted path, always replacing whatever blocks
    /// it. Returns the discarded path, if any.
    pub fn set(&mut self, path: &str, value: Scalar) -> Option<String> {
        let collided = self.collision(path);
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments.split_last()?;

        let mut cur: &mut ConfigTree = self;
        for seg in parents {
            cur = cur
                .0
                .entry(seg.to_string())
                .or_insert_with(|| ConfigNode::Branch(ConfigTree::new()))
                .make_branch();
        }
        cur.0.insert(last.to_string(), ConfigNode::Leaf(value));
        collided
    }

    /// Remove the node at a dotted path. Branches left empty by the removal
    /// are pruned.
    pub fn remove(&mut self, path: &str) -> Option<ConfigNode> {
        let segments: Vec<&str> = path.split('.').collect();
        self.remove_segments(&segments)
    }

    fn remove_segments(&mut self, segments: &[&str]) -> Option<ConfigNode> {
        let (first, rest) = segments.split_first()?;
        if rest.is_empty() {
            return self.0.remove(*first);
        }
        let ConfigNode::Branch(child) = self.0.get_mut(*first)? else {
            return None;
        };
        let removed = child.remove_segments(rest)?;
        if child.is_empty() {
            self.0.remove(*first);
        }
        Some(removed)
    }

    /// Dotted paths of every leaf, in key order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaf_paths("", &mut out);
        out
    }

    fn collect_leaf_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (key, node) in &self.0 {
            let path = join_path(prefix, key);
            match node {
                ConfigNode::Leaf(_) => out.push(path),
                ConfigNode::Branch(t) => t.collect_leaf_paths(&path, out),
            }
        }
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(k, node)| {
                let v = match node {
                    ConfigNode::Leaf(s) => s.to_json(),
                    ConfigNode::Branch(t) => t.to_json(),
                };
                (k.clone(), v)
            })
            .collect();
        Value::Object(map)
    }

    /// Render the tree as JSON text.
    pub fn to_text(&self, style: TextStyle) -> String {
        let value = self.to_json();
        match style {
            TextStyle::Pretty => format!("{value:#}"),
            TextStyle::Compact => value.to_string(),
        }
    }

    fn from_map(map: &Map<String, Value>, prefix: &str) -> Result<Self, ReconcileError> {
        let mut nodes = BTreeMap::new();
        for (key, value) in map {
            let path = join_path(prefix, key);
            let node = match value {
                Value::Object(inner) => ConfigNode::Branch(Self::from_map(inner, &path)?),
                Value::Null => {
                    return Err(ReconcileError::shape(path, "null is not a config value"));
                }
                Value::Array(_) => {
                    return Err(ReconcileError::shape(path, "arrays are not supported"));
                }
                other => match Scalar::from_json(other) {
                    Some(s) => ConfigNode::Leaf(s),
                    None => return Err(ReconcileError::shape(path, "unsupported value")),
                },
            };
            nodes.insert(key.clone(), node);
        }
        Ok(ConfigTree(nodes))
    }
}

impl TryFrom<&Value> for ConfigTree {
    type Error = ReconcileError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Self::from_map(map, ""),
            other => Err(ReconcileError::shape(
                "",
                format!("expected an object at the top level, found {}", json_kind(other)),
            )),
        }
    }
}

impl TryFrom<Value> for ConfigTree {
    type Error = ReconcileError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(v: Value) -> ConfigTree {
        ConfigTree::try_from(v).unwrap()
    }

    #[test]
    fn test_get_leaf_walks_segments() {
        let t = tree(json!({"editor": {"minimap": {"enabled": false}}}));
        assert_eq!(t.get_leaf("editor.minimap.enabled"), Some(&Scalar::from(false)));
        assert!(t.get_leaf("editor.minimap").is_none());
        assert!(t.get_leaf("editor.missing.enabled").is_none());
        assert!(t.get_leaf("editor.minimap.enabled.deeper").is_none());
    }

    #[test]
    fn test_insert_creates_branches() {
        let mut t = ConfigTree::new();
        let collided = t
            .insert("a.b.c", Scalar::from(1), CollisionPolicy::Overwrite)
            .unwrap();
        assert!(collided.is_none());
        assert_eq!(t.to_json(), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_insert_overwrites_scalar_in_path() {
        let mut t = tree(json!({"a": {"b": "scalar", "keep": 1}}));
        let collided = t
            .insert("a.b.c", Scalar::from(2), CollisionPolicy::Overwrite)
            .unwrap();
        assert_eq!(collided.as_deref(), Some("a.b"));
        assert_eq!(t.to_json(), json!({"a": {"b": {"c": 2}, "keep": 1}}));
    }

    #[test]
    fn test_insert_reject_leaves_tree_untouched() {
        let mut t = tree(json!({"a": {"b": "scalar"}}));
        let before = t.clone();
        let err = t
            .insert("a.b.c", Scalar::from(2), CollisionPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::PathCollision { ref at, .. } if at == "a.b"));
        assert_eq!(t, before);
    }

    #[test]
    fn test_insert_branch_at_leaf_position() {
        let mut t = tree(json!({"a": {"b": {"c": 1}}}));
        let before = t.clone();
        let err = t
            .insert("a.b", Scalar::from("flat"), CollisionPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::PathCollision { ref at, .. } if at == "a.b"));
        assert_eq!(t, before);

        let collided = t
            .insert("a.b", Scalar::from("flat"), CollisionPolicy::Overwrite)
            .unwrap();
        assert_eq!(collided.as_deref(), Some("a.b"));
        assert_eq!(t.to_json(), json!({"a": {"b": "flat"}}));

        // Replacing a leaf with a leaf is not a collision.
        let collided = t
            .insert("a.b", Scalar::from("again"), CollisionPolicy::Reject)
            .unwrap();
        assert!(collided.is_none());
    }

    #[test]
    fn test_remove_prunes_empty_branches() {
        let mut t = tree(json!({"editor": {"fontSize": 12}, "theme": "dark"}));
        let removed = t.remove("editor.fontSize");
        assert_eq!(removed, Some(ConfigNode::Leaf(Scalar::from(12))));
        assert_eq!(t.to_json(), json!({"theme": "dark"}));
    }

    #[test]
    fn test_remove_keeps_siblings() {
        let mut t = tree(json!({"editor": {"fontSize": 12, "theme": "dark"}}));
        t.remove("editor.fontSize");
        assert_eq!(t.to_json(), json!({"editor": {"theme": "dark"}}));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut t = tree(json!({"editor": {"theme": "dark"}, "x": {}}));
        assert!(t.remove("editor.fontSize").is_none());
        assert!(t.remove("editor.theme.deeper").is_none());
        assert!(t.remove("nothing.here").is_none());
        // Untouched empty branches stay.
        assert_eq!(t.to_json(), json!({"editor": {"theme": "dark"}, "x": {}}));
    }

    #[test]
    fn test_shape_errors_name_the_path() {
        let err = ConfigTree::try_from(json!({"a": {"b": [1]}})).unwrap_err();
        assert!(
            matches!(err, ReconcileError::InvalidConfigShape { ref path, .. } if path == "a.b")
        );
        let err = ConfigTree::try_from(json!({"a": null})).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidConfigShape { ref path, .. } if path == "a"));
        let err = ConfigTree::try_from(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidConfigShape { ref path, .. } if path.is_empty()));
    }

    #[test]
    fn test_text_styles() {
        let t = tree(json!({"editor": {"theme": "light", "fontSize": 12}}));
        assert_eq!(
            t.to_text(TextStyle::Compact),
            r#"{"editor":{"fontSize":12,"theme":"light"}}"#
        );
        assert_eq!(
            t.to_text(TextStyle::Pretty),
            "{\n  \"editor\": {\n    \"fontSize\": 12,\n    \"theme\": \"light\"\n  }\n}"
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let t = tree(json!({"a": {"b": 1.5, "c": "x"}, "d": true}));
        let text = serde_json::to_string(&t).unwrap();
        let back: ConfigTree = serde_json::from_str(&text).unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<ConfigTree>("[1]").is_err());
    }

    #[test]
    fn test_leaf_paths() {
        let t = tree(json!({"b": 1, "a": {"y": 2, "x": {"z": 3}}}));
        assert_eq!(t.leaf_paths(), vec!["a.x.z", "a.y", "b"]);
    }
}
