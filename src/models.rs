//! Core data models used throughout Collection Gate.
//!
//! These types represent the repository objects, search matches, and count
//! summaries that flow between the HTTP surface and the collaborator seams.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Property name that marks an object as carrying a collection policy.
pub const COLLECTION_POLICY_PROPERTY: &str = "collection-policy";

/// A repository object as surfaced by the object store.
///
/// Only the fields this service consults are modeled: the persistent
/// identifier, the display label, the attached content-model tags, and the
/// named properties (policy documents and similar metadata blobs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryObject {
    pub pid: String,
    pub label: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl RepositoryObject {
    /// True if any of the object's content models appears in `models`.
    pub fn has_model_in(&self, models: &[String]) -> bool {
        self.models.iter().any(|m| models.contains(m))
    }

    /// Look up a named property value.
    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }

    /// True if the object carries a collection policy property.
    pub fn has_collection_policy(&self) -> bool {
        self.properties.contains_key(COLLECTION_POLICY_PROPERTY)
    }
}

/// One element of the collection search response.
///
/// `value` is the candidate's pid; `label` embeds both the display label and
/// the pid, formatted as `"<label> (<pid>)"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionMatch {
    pub value: String,
    pub label: String,
}

impl CollectionMatch {
    pub fn new(pid: &str, label: &str) -> Self {
        Self {
            value: pid.to_string(),
            label: format!("{} ({})", label, pid),
        }
    }
}

/// Totals reported by the object-count endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectCounts {
    pub objects: u64,
    pub collections: u64,
    pub generated_at: DateTime<Utc>,
}
