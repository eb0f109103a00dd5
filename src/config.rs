use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub repository: RepositoryConfig,
    pub triplestore: TripleStoreConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RepositoryConfig {
    /// Base URL of the object store's REST API.
    pub endpoint: String,
    /// Content models that mark an object as a collection.
    #[serde(default = "default_collection_models")]
    pub collection_models: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_collection_models() -> Vec<String> {
    vec!["core:collectionModel".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct TripleStoreConfig {
    /// SPARQL query endpoint URL.
    pub endpoint: String,
    #[serde(default = "default_label_predicate")]
    pub label_predicate: String,
    #[serde(default = "default_model_predicate")]
    pub model_predicate: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_label_predicate() -> String {
    "http://repo.example/model#label".to_string()
}

fn default_model_predicate() -> String {
    "http://repo.example/model#hasModel".to_string()
}

/// Grants consumed by the static permission gate.
///
/// Embedding deployments with a real permission engine implement
/// [`PermissionGate`](crate::access::PermissionGate) instead and ignore this
/// section.
#[derive(Debug, Deserialize, Clone)]
pub struct AccessConfig {
    #[serde(default)]
    pub manage: bool,
    #[serde(default)]
    pub share_migrate: bool,
    #[serde(default = "default_true")]
    pub ingest: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            manage: false,
            share_migrate: false,
            ingest: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Name of the form assembled by the default form builder.
    #[serde(default = "default_ingest_form")]
    pub form: String,
}

fn default_ingest_form() -> String {
    "collection-ingest".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            form: default_ingest_form(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.repository.collection_models.is_empty() {
        anyhow::bail!("repository.collection_models must name at least one content model");
    }

    if config.repository.timeout_secs == 0 {
        anyhow::bail!("repository.timeout_secs must be > 0");
    }

    if config.triplestore.timeout_secs == 0 {
        anyhow::bail!("triplestore.timeout_secs must be > 0");
    }

    Ok(config)
}
