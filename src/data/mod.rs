//! Input parsing: edge lists, GML files, and node metadata

pub mod edgelist;
pub mod gml;
pub mod metadata;

use std::path::Path;

use anyhow::Result;

use crate::graph::Graph;

/// Loads a graph file, dispatching on the extension: `.gml` is parsed as
/// GML, anything else as a whitespace-delimited edge list.
pub fn load_graph(path: &Path) -> Result<Graph<String>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("gml") => gml::load(path),
        _ => edgelist::load(path),
    }
}
