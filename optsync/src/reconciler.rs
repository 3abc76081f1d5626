//! Keeps attribute descriptors, the configuration tree and its JSON text
//! consistent.

use log::{debug, warn};
use serde_json::Value;

use crate::{
    data::{CollisionPolicy, ConfigTree, DescriptorList, Scalar, TextStyle},
    error::ReconcileError,
};

/// Reconciles three views of the same settings: the descriptor list (shape
/// and per-attribute values), the nested [`ConfigTree`], and its serialized
/// text.
///
/// Every operation either completes and leaves all three consistent, or
/// fails and leaves the reconciler unchanged.
#[derive(Debug, Clone)]
pub struct Reconciler {
    descriptors: DescriptorList,
    tree: ConfigTree,
    text: String,
    policy: CollisionPolicy,
    style: TextStyle,
}

/// Builder for [`Reconciler`].
#[derive(Debug, Clone)]
pub struct ReconcilerBuilder {
    descriptors: DescriptorList,
    policy: CollisionPolicy,
    style: TextStyle,
}

impl ReconcilerBuilder {
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn text_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Build a reconciler seeded from the descriptor defaults.
    pub fn build(self) -> Reconciler {
        let mut reconciler = Reconciler {
            descriptors: self.descriptors,
            tree: ConfigTree::new(),
            text: String::new(),
            policy: self.policy,
            style: self.style,
        };
        reconciler.reset_to_defaults();
        reconciler
    }
}

impl Reconciler {
    /// Reconciler with default policy and pretty text, seeded from defaults.
    pub fn new(descriptors: DescriptorList) -> Self {
        Self::builder(descriptors).build()
    }

    pub fn builder(descriptors: DescriptorList) -> ReconcilerBuilder {
        ReconcilerBuilder {
            descriptors,
            policy: CollisionPolicy::default(),
            style: TextStyle::default(),
        }
    }

    /// Set every attribute to its default and rebuild the tree from scratch.
    ///
    /// The resulting tree holds exactly the descriptor paths.
    pub fn reset_to_defaults(&mut self) {
        let mut tree = ConfigTree::new();
        for d in self.descriptors.iter_mut() {
            d.current = Some(d.default.clone());
            tree.set(&d.path, d.default.clone());
        }
        self.tree = tree;
        self.refresh_text();
        debug!("reset {} attributes to defaults", self.descriptors.len());
    }

    /// Set or clear the value of one attribute.
    ///
    /// `None` removes the leaf so the attribute inherits its default, which
    /// is distinct from storing the default value explicitly.
    pub fn set_value(&mut self, path: &str, value: Option<Scalar>) -> Result<(), ReconcileError> {
        let Some(descriptor) = self.descriptors.get_mut(path) else {
            return Err(ReconcileError::UnknownAttribute(path.to_string()));
        };

        match value {
            None => {
                if self.tree.get_leaf(path).is_some() {
                    self.tree.remove(path);
                }
                descriptor.current = None;
                debug!("unset `{path}`");
            }
            Some(value) => {
                descriptor.kind.check(path, &value)?;
                if let Some(at) = self.tree.insert(path, value.clone(), self.policy)? {
                    warn!("setting `{path}` discarded the data stored at `{at}`");
                }
                debug!("set `{path}` = {value}");
                descriptor.current = Some(value);
            }
        }
        self.refresh_text();
        Ok(())
    }

    /// Replace the tree with an externally supplied JSON value.
    ///
    /// Fails with [`ReconcileError::InvalidConfigShape`] when the value is
    /// not a nested mapping of mappings and scalars.
    pub fn load_from_tree(&mut self, value: &Value) -> Result<(), ReconcileError> {
        let tree = ConfigTree::try_from(value)?;
        self.load_tree(tree);
        Ok(())
    }

    /// Replace the tree wholesale and re-read every attribute from it.
    ///
    /// Attributes whose path is missing, blocked by a scalar, or holding a
    /// value of the wrong kind are left unset and fall back to their default.
    pub fn load_tree(&mut self, tree: ConfigTree) {
        for d in self.descriptors.iter_mut() {
            d.current = match tree.get_leaf(&d.path) {
                Some(value) => match d.kind.check(&d.path, value) {
                    Ok(()) => Some(value.clone()),
                    Err(e) => {
                        warn!("ignoring stored value: {e}");
                        None
                    }
                },
                None => None,
            };
        }
        self.tree = tree;
        self.refresh_text();
    }

    /// Parse JSON text and load it as the new tree.
    ///
    /// Fails with [`ReconcileError::MalformedText`] when the text is not JSON.
    pub fn load_from_text(&mut self, text: &str) -> Result<(), ReconcileError> {
        let value: Value = serde_json::from_str(text)?;
        self.load_from_tree(&value)
    }

    /// Canonical text form of the current tree.
    pub fn serialize(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    pub fn descriptors(&self) -> &DescriptorList {
        &self.descriptors
    }

    /// Leaf stored in the tree at `path`, `None` when absent.
    pub fn get(&self, path: &str) -> Option<&Scalar> {
        self.tree.get_leaf(path)
    }

    /// Effective value of an attribute: explicit value or default.
    pub fn effective_value(&self, path: &str) -> Result<&Scalar, ReconcileError> {
        self.descriptors
            .get(path)
            .map(|d| d.current_value())
            .ok_or_else(|| ReconcileError::UnknownAttribute(path.to_string()))
    }

    /// Theme name stored at the top-level `theme` key.
    pub fn theme(&self) -> Option<&str> {
        self.tree.get_leaf("theme").and_then(Scalar::as_str)
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn text_style(&self) -> TextStyle {
        self.style
    }

    fn refresh_text(&mut self) {
        self.text = self.tree.to_text(self.style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AttributeDescriptor;
    use serde_json::json;

    fn descriptors() -> DescriptorList {
        DescriptorList::new(vec![
            AttributeDescriptor::number("editor.fontSize", 12),
            AttributeDescriptor::enumeration("editor.theme", ["light", "dark"], "light"),
        ])
        .unwrap()
    }

    fn compact() -> Reconciler {
        Reconciler::builder(descriptors())
            .text_style(TextStyle::Compact)
            .build()
    }

    #[test]
    fn test_reset_then_edit_scenario() {
        let mut r = compact();
        r.reset_to_defaults();
        assert_eq!(r.serialize(), r#"{"editor":{"fontSize":12,"theme":"light"}}"#);

        r.set_value("editor.theme", Some(Scalar::from("dark"))).unwrap();
        assert_eq!(r.serialize(), r#"{"editor":{"fontSize":12,"theme":"dark"}}"#);

        r.set_value("editor.fontSize", None).unwrap();
        assert_eq!(r.serialize(), r#"{"editor":{"theme":"dark"}}"#);
        assert!(!r.serialize().contains("fontSize"));
        assert!(r.get("editor.fontSize").is_none());
        assert_eq!(
            r.effective_value("editor.fontSize").unwrap(),
            &Scalar::from(12)
        );
    }

    #[test]
    fn test_reset_sets_current_to_default() {
        let mut r = compact();
        r.set_value("editor.fontSize", Some(Scalar::from(20))).unwrap();
        r.reset_to_defaults();
        for d in r.descriptors() {
            assert_eq!(d.explicit_value(), Some(d.default_value()));
        }
    }

    #[test]
    fn test_reset_drops_stale_paths() {
        let mut r = compact();
        r.load_from_text(r#"{"editor":{"theme":"dark","extra":1},"stale":true}"#)
            .unwrap();
        r.reset_to_defaults();
        assert_eq!(r.tree().leaf_paths(), vec!["editor.fontSize", "editor.theme"]);
    }

    #[test]
    fn test_set_value_reads_back() {
        let mut r = compact();
        r.set_value("editor.fontSize", Some(Scalar::from(18))).unwrap();
        assert_eq!(r.get("editor.fontSize"), Some(&Scalar::from(18)));
        assert_eq!(
            r.descriptors().get("editor.fontSize").unwrap().explicit_value(),
            Some(&Scalar::from(18))
        );
    }

    #[test]
    fn test_set_value_unknown_attribute() {
        let mut r = compact();
        let before = r.serialize().to_string();
        let err = r.set_value("editor.nope", Some(Scalar::from(1))).unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownAttribute(ref p) if p == "editor.nope"));
        assert!(matches!(
            r.set_value("editor.nope", None),
            Err(ReconcileError::UnknownAttribute(_))
        ));
        assert_eq!(r.serialize(), before);
    }

    #[test]
    fn test_set_value_type_mismatch_is_atomic() {
        let mut r = compact();
        let before = r.serialize().to_string();
        assert!(matches!(
            r.set_value("editor.theme", Some(Scalar::from("blue"))),
            Err(ReconcileError::TypeMismatch { .. })
        ));
        assert!(matches!(
            r.set_value("editor.fontSize", Some(Scalar::from("big"))),
            Err(ReconcileError::TypeMismatch { .. })
        ));
        assert_eq!(r.serialize(), before);
        assert_eq!(
            r.effective_value("editor.theme").unwrap(),
            &Scalar::from("light")
        );
    }

    #[test]
    fn test_load_from_tree_missing_leaves_use_defaults() {
        let mut r = compact();
        r.load_from_tree(&json!({"editor": {"theme": "dark"}})).unwrap();
        let font = r.descriptors().get("editor.fontSize").unwrap();
        assert_eq!(font.current_value(), &Scalar::from(12));
        assert!(!font.is_set());
        assert_eq!(
            r.descriptors().get("editor.theme").unwrap().current_value(),
            &Scalar::from("dark")
        );
        // Missing leaves are not re-introduced by serialization.
        assert_eq!(r.serialize(), r#"{"editor":{"theme":"dark"}}"#);
    }

    #[test]
    fn test_load_from_tree_missing_branch() {
        let mut r = compact();
        r.load_from_tree(&json!({"other": 1})).unwrap();
        assert!(r.descriptors().iter().all(|d| !d.is_set()));
        r.load_from_tree(&json!({"editor": "flat"})).unwrap();
        assert!(r.descriptors().iter().all(|d| !d.is_set()));
    }

    #[test]
    fn test_load_from_tree_wrong_kind_falls_back() {
        let mut r = compact();
        r.load_from_tree(&json!({"editor": {"theme": "purple", "fontSize": "x"}}))
            .unwrap();
        assert!(r.descriptors().iter().all(|d| !d.is_set()));
        // The raw tree is kept as supplied.
        assert_eq!(r.get("editor.theme"), Some(&Scalar::from("purple")));
    }

    #[test]
    fn test_load_from_tree_invalid_shape() {
        let mut r = compact();
        r.set_value("editor.theme", Some(Scalar::from("dark"))).unwrap();
        let before = r.serialize().to_string();
        for bad in [json!([1]), json!("x"), json!({"editor": {"fontSize": null}})] {
            assert!(matches!(
                r.load_from_tree(&bad),
                Err(ReconcileError::InvalidConfigShape { .. })
            ));
        }
        assert_eq!(r.serialize(), before);
        assert_eq!(
            r.effective_value("editor.theme").unwrap(),
            &Scalar::from("dark")
        );
    }

    #[test]
    fn test_load_from_text_malformed_is_atomic() {
        let mut r = compact();
        r.set_value("editor.fontSize", Some(Scalar::from(16))).unwrap();
        let before: Vec<_> = r.descriptors().iter().map(|d| d.explicit_value().cloned()).collect();
        let text = r.serialize().to_string();

        let err = r.load_from_text("not json").unwrap_err();
        assert!(matches!(err, ReconcileError::MalformedText(_)));

        let after: Vec<_> = r.descriptors().iter().map(|d| d.explicit_value().cloned()).collect();
        assert_eq!(before, after);
        assert_eq!(r.serialize(), text);
    }

    #[test]
    fn test_text_round_trip_is_stable() {
        for style in [TextStyle::Pretty, TextStyle::Compact] {
            let mut r = Reconciler::builder(descriptors()).text_style(style).build();
            r.set_value("editor.fontSize", Some(Scalar::float(13.5).unwrap()))
                .unwrap();
            r.set_value("editor.theme", None).unwrap();
            let text = r.serialize().to_string();
            r.load_from_text(&text).unwrap();
            assert_eq!(r.serialize(), text);
            assert!(!text.contains("theme"));
        }
    }

    #[test]
    fn test_collision_overwrite_and_reject() {
        let list = DescriptorList::new(vec![AttributeDescriptor::number("a.b.c", 1)]).unwrap();

        let mut r = Reconciler::builder(list.clone())
            .text_style(TextStyle::Compact)
            .build();
        r.load_from_text(r#"{"a":{"b":"scalar"}}"#).unwrap();
        r.set_value("a.b.c", Some(Scalar::from(5))).unwrap();
        assert_eq!(r.serialize(), r#"{"a":{"b":{"c":5}}}"#);

        let mut r = Reconciler::builder(list)
            .collision_policy(CollisionPolicy::Reject)
            .text_style(TextStyle::Compact)
            .build();
        r.load_from_text(r#"{"a":{"b":"scalar"}}"#).unwrap();
        let err = r.set_value("a.b.c", Some(Scalar::from(5))).unwrap_err();
        assert!(matches!(err, ReconcileError::PathCollision { .. }));
        assert_eq!(r.serialize(), r#"{"a":{"b":"scalar"}}"#);
        assert!(!r.descriptors().get("a.b.c").unwrap().is_set());
    }

    #[test]
    fn test_set_value_over_branch() {
        let list = DescriptorList::new(vec![AttributeDescriptor::number("a.b", 1)]).unwrap();
        let stored = r#"{"a":{"b":{"c":1}}}"#;

        let mut r = Reconciler::builder(list.clone())
            .collision_policy(CollisionPolicy::Reject)
            .text_style(TextStyle::Compact)
            .build();
        r.load_from_text(stored).unwrap();
        let err = r.set_value("a.b", Some(Scalar::from(2))).unwrap_err();
        assert!(matches!(err, ReconcileError::PathCollision { ref at, .. } if at == "a.b"));
        assert_eq!(r.serialize(), stored);
        // Unsetting does not drop the subtree either.
        r.set_value("a.b", None).unwrap();
        assert_eq!(r.serialize(), stored);

        let mut r = Reconciler::builder(list)
            .text_style(TextStyle::Compact)
            .build();
        r.load_from_text(stored).unwrap();
        r.set_value("a.b", Some(Scalar::from(2))).unwrap();
        assert_eq!(r.serialize(), r#"{"a":{"b":2}}"#);
    }

    #[test]
    fn test_theme() {
        let list = DescriptorList::new(vec![AttributeDescriptor::enumeration(
            "theme",
            ["vs", "vs-dark"],
            "vs",
        )])
        .unwrap();
        let mut r = Reconciler::new(list);
        assert_eq!(r.theme(), Some("vs"));
        r.set_value("theme", None).unwrap();
        assert_eq!(r.theme(), None);
    }

    #[test]
    fn test_pretty_is_default() {
        let r = Reconciler::new(descriptors());
        assert_eq!(r.text_style(), TextStyle::Pretty);
        assert!(r.serialize().contains("\n  \"editor\": {"));
    }
}
