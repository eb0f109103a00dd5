//! Filtered collection search.
//!
//! Builds the SELECT query that finds collection-typed objects whose label
//! or pid matches the user's text case-insensitively, executes it against
//! the triple store seam, and shapes each solution into a
//! [`CollectionMatch`] pair.
//!
//! The free-text needle is never spliced into the query raw: it is escaped
//! so that it can only match as a literal substring. See
//! [`escape_search_literal`].

use anyhow::Result;

use crate::config::Config;
use crate::models::CollectionMatch;
use crate::triplestore::TripleStore;

/// Characters with special meaning inside a `regex()` pattern.
const REGEX_METACHARACTERS: &str = r".^$*+?()[]{}|";

/// Escape free text for use inside a double-quoted `regex()` pattern.
///
/// Two layers are neutralized at once: the string-literal layer (quotes,
/// backslashes, control characters) and the regex layer (metacharacters are
/// backslash-escaped so they match themselves). The returned text embeds
/// directly into a `"..."` pattern and matches the input as a literal
/// substring, nothing more.
pub fn escape_search_literal(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() * 2);
    for c in needle.chars() {
        match c {
            '\\' => escaped.push_str(r"\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if REGEX_METACHARACTERS.contains(c) => {
                escaped.push_str("\\\\");
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Build the collection search query.
///
/// The graph pattern requires the candidate to carry a label and to be typed
/// with one of the configured collection content models; the FILTER applies
/// the escaped needle case-insensitively against both the label and the
/// stringified pid.
pub fn collection_search_query(config: &Config, needle: &str) -> String {
    let pattern = escape_search_literal(needle);
    let models = config
        .repository
        .collection_models
        .iter()
        .map(|m| format!("<{}>", m))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "SELECT ?pid ?label\n\
         WHERE {{\n\
         \x20 VALUES ?model {{ {models} }}\n\
         \x20 ?pid <{label}> ?label ;\n\
         \x20      <{model}> ?model .\n\
         \x20 FILTER(regex(?label, \"{pattern}\", \"i\") || regex(str(?pid), \"{pattern}\", \"i\"))\n\
         }}",
        models = models,
        label = config.triplestore.label_predicate,
        model = config.triplestore.model_predicate,
        pattern = pattern,
    )
}

/// Execute the collection search and shape the results.
///
/// Result order mirrors the query result order; no pagination, ranking, or
/// deduplication is applied. An empty match set is an empty vector. Query
/// failures propagate unretried.
pub async fn find_collections(
    store: &dyn TripleStore,
    config: &Config,
    needle: &str,
) -> Result<Vec<CollectionMatch>> {
    let query = collection_search_query(config, needle);
    tracing::debug!(needle, "running collection search");

    let rows = store.select(&query).await?;

    let mut matches = Vec::with_capacity(rows.len());
    for row in rows {
        match (row.get("pid"), row.get("label")) {
            (Some(pid), Some(label)) => matches.push(CollectionMatch::new(pid, label)),
            _ => tracing::warn!("search solution missing pid or label binding, skipping"),
        }
    }

    Ok(matches)
}

/// CLI entry point — runs the search and prints matches to stdout.
pub async fn run_search(store: &dyn TripleStore, config: &Config, needle: &str) -> Result<()> {
    if needle.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let matches = find_collections(store, config, needle).await?;
    if matches.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for m in &matches {
        println!("{:<24} {}", m.value, m.label);
    }
    Ok(())
}
