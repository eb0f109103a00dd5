//! Repository count summary.
//!
//! Answers "how many objects, how many collections" with two aggregate
//! queries against the triple store seam. Used by the counts endpoint and
//! the `cgate counts` command.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::Config;
use crate::models::ObjectCounts;
use crate::triplestore::TripleStore;

fn count_all_objects_query(config: &Config) -> String {
    format!(
        "SELECT (COUNT(DISTINCT ?pid) AS ?count)\n\
         WHERE {{ ?pid <{label}> ?label }}",
        label = config.triplestore.label_predicate,
    )
}

fn count_collections_query(config: &Config) -> String {
    let models = config
        .repository
        .collection_models
        .iter()
        .map(|m| format!("<{}>", m))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "SELECT (COUNT(DISTINCT ?pid) AS ?count)\n\
         WHERE {{\n\
         \x20 VALUES ?model {{ {models} }}\n\
         \x20 ?pid <{model}> ?model .\n\
         }}",
        models = models,
        model = config.triplestore.model_predicate,
    )
}

async fn run_count_query(store: &dyn TripleStore, query: &str) -> Result<u64> {
    let rows = store.select(query).await?;
    let row = rows
        .first()
        .ok_or_else(|| anyhow::anyhow!("count query returned no solutions"))?;
    let value = row
        .get("count")
        .ok_or_else(|| anyhow::anyhow!("count query missing count binding"))?;
    value
        .parse::<u64>()
        .with_context(|| format!("count binding is not a number: {}", value))
}

/// Count all labeled objects and all collection-typed objects.
pub async fn count_objects(store: &dyn TripleStore, config: &Config) -> Result<ObjectCounts> {
    let objects = run_count_query(store, &count_all_objects_query(config)).await?;
    let collections = run_count_query(store, &count_collections_query(config)).await?;

    Ok(ObjectCounts {
        objects,
        collections,
        generated_at: Utc::now(),
    })
}

/// CLI entry point — prints the count summary.
pub async fn run_counts(store: &dyn TripleStore, config: &Config) -> Result<()> {
    let counts = count_objects(store, config).await?;

    println!("Repository counts");
    println!("=================");
    println!();
    println!("  Objects:     {}", counts.objects);
    println!("  Collections: {}", counts.collections);
    println!("  As of:       {}", counts.generated_at.format("%Y-%m-%dT%H:%M:%SZ"));

    Ok(())
}
