//! Triple store query abstraction.
//!
//! The [`TripleStore`] trait is the seam to the repository's resource index,
//! an RDF graph database queried with SPARQL SELECT. The gateway only ever
//! issues read queries; writes belong to the repository itself.
//!
//! [`SparqlHttpClient`] is the production implementation: it POSTs the query
//! to a SPARQL protocol endpoint and parses the standard
//! `application/sparql-results+json` envelope. There is no retry layer — a
//! failed query propagates to the caller.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::config::TripleStoreConfig;

/// One solution row of a SELECT result: variable name → bound value.
///
/// Only the lexical form of each binding is retained; datatype and language
/// annotations are dropped.
#[derive(Debug, Clone, Default)]
pub struct BindingSet {
    values: HashMap<String, String>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, var: &str, value: &str) -> Self {
        self.values.insert(var.to_string(), value.to_string());
        self
    }

    /// Value bound to `var`, if any.
    pub fn get(&self, var: &str) -> Option<&str> {
        self.values.get(var).map(|v| v.as_str())
    }
}

/// Abstract SPARQL SELECT executor.
#[async_trait]
pub trait TripleStore: Send + Sync {
    async fn select(&self, query: &str) -> Result<Vec<BindingSet>>;
}

/// Triple store client speaking the SPARQL protocol over HTTP.
pub struct SparqlHttpClient {
    endpoint: String,
    client: reqwest::Client,
}

impl SparqlHttpClient {
    pub fn new(config: &TripleStoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

#[async_trait]
impl TripleStore for SparqlHttpClient {
    async fn select(&self, query: &str) -> Result<Vec<BindingSet>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/sparql-results+json")
            .form(&[("query", query)])
            .send()
            .await
            .with_context(|| format!("query request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("triple store error {}: {}", status, body);
        }

        let body = response.text().await?;
        parse_select_response(&body)
    }
}

/// Parse a `application/sparql-results+json` SELECT response body.
///
/// Each solution's bindings are flattened to their `value` strings; unbound
/// variables are simply absent from the row.
pub fn parse_select_response(body: &str) -> Result<Vec<BindingSet>> {
    let json: serde_json::Value =
        serde_json::from_str(body).with_context(|| "invalid query result JSON")?;

    let bindings = json
        .get("results")
        .and_then(|r| r.get("bindings"))
        .and_then(|b| b.as_array())
        .ok_or_else(|| anyhow::anyhow!("query result missing results.bindings"))?;

    let mut rows = Vec::with_capacity(bindings.len());
    for solution in bindings {
        let Some(vars) = solution.as_object() else {
            bail!("malformed solution in query result");
        };
        let mut row = BindingSet::new();
        for (var, term) in vars {
            if let Some(value) = term.get("value").and_then(|v| v.as_str()) {
                row = row.bind(var, value);
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_rows() {
        let body = r#"{
            "head": { "vars": ["pid", "label"] },
            "results": { "bindings": [
                {
                    "pid": { "type": "uri", "value": "coll:100" },
                    "label": { "type": "literal", "value": "Fruit Collection" }
                },
                {
                    "pid": { "type": "uri", "value": "coll:200" },
                    "label": { "type": "literal", "value": "Vegetable Collection" }
                }
            ] }
        }"#;

        let rows = parse_select_response(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("pid"), Some("coll:100"));
        assert_eq!(rows[0].get("label"), Some("Fruit Collection"));
        assert_eq!(rows[1].get("pid"), Some("coll:200"));
    }

    #[test]
    fn test_parse_empty_result() {
        let body = r#"{ "head": { "vars": ["pid"] }, "results": { "bindings": [] } }"#;
        let rows = parse_select_response(body).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_unbound_variable_absent() {
        let body = r#"{
            "head": { "vars": ["pid", "label"] },
            "results": { "bindings": [
                { "pid": { "type": "uri", "value": "coll:1" } }
            ] }
        }"#;
        let rows = parse_select_response(body).unwrap();
        assert_eq!(rows[0].get("pid"), Some("coll:1"));
        assert_eq!(rows[0].get("label"), None);
    }

    #[test]
    fn test_parse_rejects_missing_envelope() {
        assert!(parse_select_response("{}").is_err());
        assert!(parse_select_response("not json").is_err());
    }
}
