//! Ingest configuration resolution and form assembly.
//!
//! An ingest configuration is a derived description of the steps required to
//! admit a new object into a collection. The gateway never runs the ingest
//! pipeline itself — it only resolves the configuration (via the
//! [`IngestResolver`] seam) and hands it to a [`FormBuilder`] that produces
//! the form document served to the client.
//!
//! The shipped [`PolicyResolver`] derives the configuration from the
//! object's collection policy: a JSON document listing the permitted child
//! content models, each optionally naming a metadata form. Deployments with
//! a different policy vocabulary implement [`IngestResolver`] directly.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{RepositoryObject, COLLECTION_POLICY_PROPERTY};

/// What executing a step amounts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// A metadata form presented to the user.
    Form { name: String },
    /// A server-side step with no form to display.
    Callback,
}

/// One step of an ingest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStep {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl IngestStep {
    pub fn is_form(&self) -> bool {
        matches!(self.kind, StepKind::Form { .. })
    }
}

/// Derived description of the steps required to ingest into a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfiguration {
    /// Pid of the target collection.
    pub collection: String,
    /// Content models the collection admits.
    pub models: Vec<String>,
    /// Ordered ingest steps.
    pub steps: Vec<IngestStep>,
}

/// True when the configuration yields at least one displayable (form) step.
pub fn can_display_ingest_form(configuration: &IngestConfiguration) -> bool {
    configuration.steps.iter().any(|s| s.is_form())
}

/// Resolves an ingest configuration for a target object.
///
/// `Ok(None)` means no configuration is derivable from this object — the
/// ingest action's not-found path and one of the ingest-access forbidden
/// clauses.
#[async_trait]
pub trait IngestResolver: Send + Sync {
    async fn resolve(&self, object: &RepositoryObject) -> Result<Option<IngestConfiguration>>;
}

/// Collection policy document shape consumed by [`PolicyResolver`].
#[derive(Debug, Clone, Deserialize)]
struct CollectionPolicy {
    #[serde(default)]
    members: Vec<PolicyMember>,
}

/// One permitted child entry of a collection policy.
#[derive(Debug, Clone, Deserialize)]
struct PolicyMember {
    model: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    form: Option<String>,
}

/// Default resolver deriving the configuration from the object's collection
/// policy property.
pub struct PolicyResolver;

impl PolicyResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PolicyResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IngestResolver for PolicyResolver {
    async fn resolve(&self, object: &RepositoryObject) -> Result<Option<IngestConfiguration>> {
        let Some(value) = object.property(COLLECTION_POLICY_PROPERTY) else {
            return Ok(None);
        };

        let policy: CollectionPolicy = match serde_json::from_value(value.clone()) {
            Ok(policy) => policy,
            Err(err) => {
                tracing::warn!(pid = %object.pid, %err, "unparsable collection policy");
                return Ok(None);
            }
        };

        let models: Vec<String> = policy.members.iter().map(|m| m.model.clone()).collect();
        let steps: Vec<IngestStep> = policy
            .members
            .into_iter()
            .map(|member| {
                let label = member.label.unwrap_or_else(|| member.model.clone());
                let kind = match member.form {
                    Some(name) => StepKind::Form { name },
                    None => StepKind::Callback,
                };
                IngestStep {
                    id: format!("ingest:{}", member.model),
                    label,
                    kind,
                }
            })
            .collect();

        Ok(Some(IngestConfiguration {
            collection: object.pid.clone(),
            models,
            steps,
        }))
    }
}

/// The form document served by the ingest action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestForm {
    pub form: String,
    pub collection: String,
    pub steps: Vec<IngestStep>,
}

/// Assembles the served form from a resolved configuration.
pub trait FormBuilder: Send + Sync {
    fn build(&self, configuration: &IngestConfiguration) -> Result<IngestForm>;
}

/// Default builder producing a named form over the configuration's
/// displayable steps.
pub struct NamedFormBuilder {
    form: String,
}

impl NamedFormBuilder {
    pub fn new(form: &str) -> Self {
        Self {
            form: form.to_string(),
        }
    }
}

impl FormBuilder for NamedFormBuilder {
    fn build(&self, configuration: &IngestConfiguration) -> Result<IngestForm> {
        Ok(IngestForm {
            form: self.form.clone(),
            collection: configuration.collection.clone(),
            steps: configuration
                .steps
                .iter()
                .filter(|s| s.is_form())
                .cloned()
                .collect(),
        })
    }
}
