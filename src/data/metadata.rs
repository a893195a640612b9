//! Node metadata loading and attachment

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::graph::Graph;

/// Loads a JSON object mapping node ids to arbitrary attribute payloads.
pub fn load(path: &Path) -> Result<HashMap<String, Value>> {
    log::info!("reading node metadata: {}", path.display());
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let metadata: HashMap<String, Value> = serde_json::from_str(&contents)
        .with_context(|| format!("invalid metadata JSON in {}", path.display()))?;
    Ok(metadata)
}

/// Attaches each payload to its node under `key`, skipping ids that are not
/// in the graph. Returns the number of nodes annotated.
pub fn apply(
    graph: &mut Graph<String>,
    metadata: &HashMap<String, Value>,
    key: &str,
) -> Result<usize> {
    let mut applied = 0;
    for (id, payload) in metadata {
        if graph.contains(id) {
            graph.attach_attribute(id, key, payload.clone())?;
            applied += 1;
        } else {
            log::debug!("metadata id `{id}` not in graph, skipping");
        }
    }

    log::info!("attached `{key}` metadata to {applied} nodes");
    Ok(applied)
}
