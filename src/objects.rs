//! Object loader abstraction.
//!
//! The [`ObjectStore`] trait is the seam to the external repository holding
//! the actual object graph. The gateway never owns object state; it loads an
//! object profile per request and discards it.
//!
//! Two implementations ship with the crate:
//! - **[`RestObjectStore`]** — fetches object profiles from the repository's
//!   REST API.
//! - **[`MemoryObjectStore`]** — `HashMap`-backed store for tests and
//!   embedded use.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::config::RepositoryConfig;
use crate::models::RepositoryObject;

/// Abstract loader for repository objects.
///
/// An absent object is `Ok(None)`, not an error; callers translate absence
/// into their own not-found or forbidden outcome.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Load an object profile by pid.
    async fn load(&self, pid: &str) -> Result<Option<RepositoryObject>>;
}

/// Object store backed by the repository's REST API.
///
/// Fetches `GET {endpoint}/objects/{pid}` and deserializes the JSON object
/// profile. HTTP 404 maps to `None`; any other non-success status is an
/// error.
pub struct RestObjectStore {
    endpoint: String,
    client: reqwest::Client,
}

impl RestObjectStore {
    pub fn new(config: &RepositoryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl ObjectStore for RestObjectStore {
    async fn load(&self, pid: &str) -> Result<Option<RepositoryObject>> {
        let url = format!("{}/objects/{}", self.endpoint, pid);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("object store error {} for {}: {}", status, pid, body);
        }

        let object: RepositoryObject = response.json().await?;
        Ok(Some(object))
    }
}

/// In-memory object store for tests and embedded use.
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, RepositoryObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace an object, keyed by its pid.
    pub fn insert(&self, object: RepositoryObject) {
        let mut objects = self.objects.write().unwrap();
        objects.insert(object.pid.clone(), object);
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn load(&self, pid: &str) -> Result<Option<RepositoryObject>> {
        let objects = self.objects.read().unwrap();
        Ok(objects.get(pid).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: &str) -> RepositoryObject {
        RepositoryObject {
            pid: pid.to_string(),
            label: "Sample".to_string(),
            models: vec!["core:collectionModel".to_string()],
            properties: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryObjectStore::new();
        store.insert(sample("coll:1"));

        let loaded = store.load("coll:1").await.unwrap();
        assert_eq!(loaded.unwrap().pid, "coll:1");
        assert!(store.load("coll:missing").await.unwrap().is_none());
    }

    #[test]
    fn test_rest_store_trims_trailing_slash() {
        let config = RepositoryConfig {
            endpoint: "http://localhost:8080/repo/".to_string(),
            collection_models: vec!["core:collectionModel".to_string()],
            timeout_secs: 5,
        };
        let store = RestObjectStore::new(&config).unwrap();
        assert_eq!(store.endpoint, "http://localhost:8080/repo");
    }
}
