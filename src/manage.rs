//! Manage-tab fragment plugins.
//!
//! The manage surface for a collection is assembled from plugins keyed by
//! content model: every registered [`ManagePlugin`] whose models intersect
//! the object's models folds its fragments into a shared [`RenderTree`]
//! accumulator, in registration order. The resulting tree is opaque to the
//! gateway — it is serialized verbatim as the manage endpoint's response.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::RepositoryObject;

/// One named fragment of the manage surface.
#[derive(Debug, Clone, Serialize)]
pub struct RenderFragment {
    pub title: String,
    pub body: serde_json::Value,
}

/// Accumulator the plugins fold fragments into.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderTree {
    pub sections: BTreeMap<String, RenderFragment>,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, fragment: RenderFragment) {
        self.sections.insert(id.to_string(), fragment);
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// A manage-surface contributor.
///
/// Implementations declare which content models they apply to and fold
/// their fragments into the accumulator when dispatched.
pub trait ManagePlugin: Send + Sync {
    /// Plugin identifier, used for logging and ordering diagnostics.
    fn name(&self) -> &str;

    /// Content models this plugin contributes fragments for.
    fn content_models(&self) -> &[String];

    /// Whether the plugin applies to `object`. Defaults to a content-model
    /// intersection test.
    fn applies_to(&self, object: &RepositoryObject) -> bool {
        object.has_model_in(self.content_models())
    }

    /// Fold this plugin's fragments into the accumulator.
    fn build(&self, object: &RepositoryObject, tree: &mut RenderTree);
}

/// Ordered registry of manage plugins.
pub struct ManageRegistry {
    plugins: Vec<Box<dyn ManagePlugin>>,
}

impl ManageRegistry {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Registry pre-loaded with the built-in collection plugins, applied to
    /// the given collection content models.
    pub fn with_builtins(collection_models: &[String]) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PolicyPlugin::new(collection_models)));
        registry.register(Box::new(ChildrenPlugin::new(collection_models)));
        registry.register(Box::new(MembersPlugin::new(collection_models)));
        registry
    }

    pub fn register(&mut self, plugin: Box<dyn ManagePlugin>) {
        self.plugins.push(plugin);
    }

    pub fn plugins(&self) -> &[Box<dyn ManagePlugin>] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Dispatch every applicable plugin over a fresh accumulator.
    pub fn render(&self, object: &RepositoryObject) -> RenderTree {
        let mut tree = RenderTree::new();
        for plugin in &self.plugins {
            if plugin.applies_to(object) {
                tracing::debug!(plugin = plugin.name(), pid = %object.pid, "building manage fragment");
                plugin.build(object, &mut tree);
            }
        }
        tree
    }
}

impl Default for ManageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============ Built-in plugins ============

/// Collection policy management fragment.
pub struct PolicyPlugin {
    models: Vec<String>,
}

impl PolicyPlugin {
    pub fn new(models: &[String]) -> Self {
        Self {
            models: models.to_vec(),
        }
    }
}

impl ManagePlugin for PolicyPlugin {
    fn name(&self) -> &str {
        "collection_policy"
    }

    fn content_models(&self) -> &[String] {
        &self.models
    }

    fn build(&self, object: &RepositoryObject, tree: &mut RenderTree) {
        tree.insert(
            "collection_policy",
            RenderFragment {
                title: "Manage collection policy".to_string(),
                body: serde_json::json!({
                    "form": "collection-policy",
                    "collection": object.pid,
                    "has_policy": object.has_collection_policy(),
                }),
            },
        );
    }
}

/// Child sharing and migration fragment.
pub struct ChildrenPlugin {
    models: Vec<String>,
}

impl ChildrenPlugin {
    pub fn new(models: &[String]) -> Self {
        Self {
            models: models.to_vec(),
        }
    }
}

impl ManagePlugin for ChildrenPlugin {
    fn name(&self) -> &str {
        "children"
    }

    fn content_models(&self) -> &[String] {
        &self.models
    }

    fn build(&self, object: &RepositoryObject, tree: &mut RenderTree) {
        tree.insert(
            "children",
            RenderFragment {
                title: "Share or migrate members".to_string(),
                body: serde_json::json!({
                    "form": "collection-children",
                    "collection": object.pid,
                    "actions": ["share", "migrate"],
                }),
            },
        );
    }
}

/// Member deletion fragment.
pub struct MembersPlugin {
    models: Vec<String>,
}

impl MembersPlugin {
    pub fn new(models: &[String]) -> Self {
        Self {
            models: models.to_vec(),
        }
    }
}

impl ManagePlugin for MembersPlugin {
    fn name(&self) -> &str {
        "delete_members"
    }

    fn content_models(&self) -> &[String] {
        &self.models
    }

    fn build(&self, object: &RepositoryObject, tree: &mut RenderTree) {
        tree.insert(
            "delete_members",
            RenderFragment {
                title: "Delete members of this collection".to_string(),
                body: serde_json::json!({
                    "form": "collection-delete-members",
                    "collection": object.pid,
                }),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION_MODEL: &str = "core:collectionModel";

    fn collection_models() -> Vec<String> {
        vec![COLLECTION_MODEL.to_string()]
    }

    fn object(models: &[&str]) -> RepositoryObject {
        RepositoryObject {
            pid: "coll:1".to_string(),
            label: "Test".to_string(),
            models: models.iter().map(|m| m.to_string()).collect(),
            properties: Default::default(),
        }
    }

    #[test]
    fn test_builtins_apply_to_collection_objects() {
        let registry = ManageRegistry::with_builtins(&collection_models());
        let tree = registry.render(&object(&[COLLECTION_MODEL]));

        assert_eq!(tree.sections.len(), 3);
        assert!(tree.sections.contains_key("collection_policy"));
        assert!(tree.sections.contains_key("children"));
        assert!(tree.sections.contains_key("delete_members"));
    }

    #[test]
    fn test_non_collection_object_gets_empty_tree() {
        let registry = ManageRegistry::with_builtins(&collection_models());
        let tree = registry.render(&object(&["core:imageModel"]));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_custom_plugin_dispatched_by_model() {
        struct AuditPlugin {
            models: Vec<String>,
        }

        impl ManagePlugin for AuditPlugin {
            fn name(&self) -> &str {
                "audit"
            }

            fn content_models(&self) -> &[String] {
                &self.models
            }

            fn build(&self, object: &RepositoryObject, tree: &mut RenderTree) {
                tree.insert(
                    "audit",
                    RenderFragment {
                        title: "Audit trail".to_string(),
                        body: serde_json::json!({ "collection": object.pid }),
                    },
                );
            }
        }

        let mut registry = ManageRegistry::new();
        registry.register(Box::new(AuditPlugin {
            models: vec!["core:newspaperModel".to_string()],
        }));

        let matched = registry.render(&object(&["core:newspaperModel"]));
        assert!(matched.sections.contains_key("audit"));

        let unmatched = registry.render(&object(&[COLLECTION_MODEL]));
        assert!(unmatched.is_empty());
    }

    #[test]
    fn test_fragments_serialize_with_collection_pid() {
        let registry = ManageRegistry::with_builtins(&collection_models());
        let tree = registry.render(&object(&[COLLECTION_MODEL]));
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json["sections"]["collection_policy"]["body"]["collection"],
            "coll:1"
        );
    }
}
