//! Access decisions for the manage, share/migrate, and ingest surfaces.
//!
//! Every check collapses to a coarse [`AccessDecision`]: a missing object, a
//! wrong content model, an empty ingest configuration, and a denied
//! permission all yield `Forbidden` with no distinguishing detail. The
//! permission predicates themselves live behind [`PermissionGate`] so that
//! deployments plug in their real permission engine; the shipped
//! [`StaticGate`] reads grants from configuration.

use anyhow::Result;

use crate::config::AccessConfig;
use crate::ingest::{can_display_ingest_form, IngestResolver};
use crate::models::RepositoryObject;
use crate::objects::ObjectStore;

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Forbidden,
}

impl AccessDecision {
    pub fn allowed_if(condition: bool) -> Self {
        if condition {
            Self::Allowed
        } else {
            Self::Forbidden
        }
    }

    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Named permission predicates over repository objects.
///
/// Injected into the access adapters rather than looked up ambiently, so a
/// host system's user/role model stays out of this crate.
pub trait PermissionGate: Send + Sync {
    /// May the caller manage this collection (policy, children, members)?
    fn can_manage(&self, object: &RepositoryObject) -> bool;

    /// May the caller share or migrate this collection's members?
    fn can_share_migrate(&self, object: &RepositoryObject) -> bool;

    /// May the caller ingest new objects into this collection?
    fn can_ingest(&self, object: &RepositoryObject) -> bool;
}

/// Permission gate with fixed, config-supplied grants.
pub struct StaticGate {
    manage: bool,
    share_migrate: bool,
    ingest: bool,
}

impl StaticGate {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            manage: config.manage,
            share_migrate: config.share_migrate,
            ingest: config.ingest,
        }
    }
}

impl PermissionGate for StaticGate {
    fn can_manage(&self, _object: &RepositoryObject) -> bool {
        self.manage
    }

    fn can_share_migrate(&self, _object: &RepositoryObject) -> bool {
        self.share_migrate
    }

    fn can_ingest(&self, _object: &RepositoryObject) -> bool {
        self.ingest
    }
}

/// Decide whether the manage surface is available for `pid`.
///
/// Mirrors the manage predicate exactly for present objects; an absent
/// object is forbidden.
pub async fn manage_access(
    store: &dyn ObjectStore,
    gate: &dyn PermissionGate,
    pid: &str,
) -> Result<AccessDecision> {
    let object = store.load(pid).await?;
    Ok(match object {
        Some(object) => AccessDecision::allowed_if(gate.can_manage(&object)),
        None => AccessDecision::Forbidden,
    })
}

/// Decide whether share/migrate actions are available for `pid`.
pub async fn share_migrate_access(
    store: &dyn ObjectStore,
    gate: &dyn PermissionGate,
    pid: &str,
) -> Result<AccessDecision> {
    let object = store.load(pid).await?;
    Ok(match object {
        Some(object) => AccessDecision::allowed_if(gate.can_share_migrate(&object)),
        None => AccessDecision::Forbidden,
    })
}

/// Decide whether ingest into `pid` is available.
///
/// Allowed only when every clause holds: the object exists and is typed with
/// a configured collection model, it carries a collection policy, the
/// resolved ingest configuration has at least one displayable step, and the
/// gate grants ingest.
pub async fn ingest_access(
    store: &dyn ObjectStore,
    gate: &dyn PermissionGate,
    resolver: &dyn IngestResolver,
    collection_models: &[String],
    pid: &str,
) -> Result<AccessDecision> {
    let Some(object) = store.load(pid).await? else {
        return Ok(AccessDecision::Forbidden);
    };

    let is_a_collection = object.has_model_in(collection_models) && object.has_collection_policy();
    if !is_a_collection {
        return Ok(AccessDecision::Forbidden);
    }

    let Some(configuration) = resolver.resolve(&object).await? else {
        return Ok(AccessDecision::Forbidden);
    };

    Ok(AccessDecision::allowed_if(
        can_display_ingest_form(&configuration) && gate.can_ingest(&object),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::PolicyResolver;
    use crate::models::COLLECTION_POLICY_PROPERTY;
    use crate::objects::MemoryObjectStore;
    use serde_json::json;
    use std::collections::BTreeMap;

    const COLLECTION_MODEL: &str = "core:collectionModel";

    fn gate(manage: bool, share_migrate: bool, ingest: bool) -> StaticGate {
        StaticGate {
            manage,
            share_migrate,
            ingest,
        }
    }

    fn collection_models() -> Vec<String> {
        vec![COLLECTION_MODEL.to_string()]
    }

    fn policy_value() -> serde_json::Value {
        json!({
            "members": [
                { "model": "core:imageModel", "label": "Image", "form": "image-metadata" }
            ]
        })
    }

    fn collection_object(pid: &str) -> RepositoryObject {
        let mut properties = BTreeMap::new();
        properties.insert(COLLECTION_POLICY_PROPERTY.to_string(), policy_value());
        RepositoryObject {
            pid: pid.to_string(),
            label: "Test Collection".to_string(),
            models: vec![COLLECTION_MODEL.to_string()],
            properties,
        }
    }

    #[tokio::test]
    async fn test_manage_access_mirrors_predicate() {
        let store = MemoryObjectStore::new();
        store.insert(collection_object("coll:1"));

        let allowed = manage_access(&store, &gate(true, false, false), "coll:1")
            .await
            .unwrap();
        assert_eq!(allowed, AccessDecision::Allowed);

        let denied = manage_access(&store, &gate(false, false, false), "coll:1")
            .await
            .unwrap();
        assert_eq!(denied, AccessDecision::Forbidden);
    }

    #[tokio::test]
    async fn test_manage_access_missing_object_forbidden() {
        let store = MemoryObjectStore::new();
        let decision = manage_access(&store, &gate(true, true, true), "coll:absent")
            .await
            .unwrap();
        assert_eq!(decision, AccessDecision::Forbidden);
    }

    #[tokio::test]
    async fn test_share_migrate_access_mirrors_predicate() {
        let store = MemoryObjectStore::new();
        store.insert(collection_object("coll:1"));

        let allowed = share_migrate_access(&store, &gate(false, true, false), "coll:1")
            .await
            .unwrap();
        assert_eq!(allowed, AccessDecision::Allowed);

        let denied = share_migrate_access(&store, &gate(true, false, true), "coll:1")
            .await
            .unwrap();
        assert_eq!(denied, AccessDecision::Forbidden);
    }

    #[tokio::test]
    async fn test_ingest_access_all_clauses_hold() {
        let store = MemoryObjectStore::new();
        store.insert(collection_object("coll:1"));

        let decision = ingest_access(
            &store,
            &gate(false, false, true),
            &PolicyResolver::new(),
            &collection_models(),
            "coll:1",
        )
        .await
        .unwrap();
        assert_eq!(decision, AccessDecision::Allowed);
    }

    #[tokio::test]
    async fn test_ingest_access_wrong_model_forbidden() {
        let store = MemoryObjectStore::new();
        let mut object = collection_object("coll:1");
        object.models = vec!["core:imageModel".to_string()];
        store.insert(object);

        let decision = ingest_access(
            &store,
            &gate(false, false, true),
            &PolicyResolver::new(),
            &collection_models(),
            "coll:1",
        )
        .await
        .unwrap();
        assert_eq!(decision, AccessDecision::Forbidden);
    }

    #[tokio::test]
    async fn test_ingest_access_no_policy_forbidden() {
        let store = MemoryObjectStore::new();
        let mut object = collection_object("coll:1");
        object.properties.clear();
        store.insert(object);

        let decision = ingest_access(
            &store,
            &gate(false, false, true),
            &PolicyResolver::new(),
            &collection_models(),
            "coll:1",
        )
        .await
        .unwrap();
        assert_eq!(decision, AccessDecision::Forbidden);
    }

    #[tokio::test]
    async fn test_ingest_access_no_displayable_steps_forbidden() {
        let store = MemoryObjectStore::new();
        let mut object = collection_object("coll:1");
        object.properties.insert(
            COLLECTION_POLICY_PROPERTY.to_string(),
            json!({ "members": [{ "model": "core:imageModel", "label": "Image" }] }),
        );
        store.insert(object);

        let decision = ingest_access(
            &store,
            &gate(false, false, true),
            &PolicyResolver::new(),
            &collection_models(),
            "coll:1",
        )
        .await
        .unwrap();
        assert_eq!(decision, AccessDecision::Forbidden);
    }

    #[tokio::test]
    async fn test_ingest_access_permission_denied_forbidden() {
        let store = MemoryObjectStore::new();
        store.insert(collection_object("coll:1"));

        let decision = ingest_access(
            &store,
            &gate(true, true, false),
            &PolicyResolver::new(),
            &collection_models(),
            "coll:1",
        )
        .await
        .unwrap();
        assert_eq!(decision, AccessDecision::Forbidden);
    }

    #[tokio::test]
    async fn test_ingest_access_missing_object_forbidden() {
        let store = MemoryObjectStore::new();
        let decision = ingest_access(
            &store,
            &gate(true, true, true),
            &PolicyResolver::new(),
            &collection_models(),
            "coll:absent",
        )
        .await
        .unwrap();
        assert_eq!(decision, AccessDecision::Forbidden);
    }
}
