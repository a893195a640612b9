//! Visualization data export
//!
//! No rendering happens here; these files feed external tools (Gephi,
//! plotting scripts) with the graph, the community assignment from the
//! finest partition, and the degree rank sequence.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::community::Partition;
use crate::graph::Graph;
use crate::metrics;

/// Generates visualization data files from analysis results.
pub fn generate_visualizations(
    graph: &Graph<String>,
    partitions: &[Partition<String>],
    output_dir: &str,
) -> Result<()> {
    log::info!("generating visualization data");

    let viz_dir = Path::new(output_dir).join("visualizations");
    fs::create_dir_all(&viz_dir)?;

    let assignment = community_assignment(partitions);

    write_graphml(graph, &assignment, &viz_dir)?;
    write_node_csv(graph, &assignment, &viz_dir)?;
    write_degree_rank(graph, &viz_dir)?;

    log::info!("visualization data written");

    Ok(())
}

/// Maps each node id to its community index in the finest partition.
fn community_assignment(partitions: &[Partition<String>]) -> HashMap<String, usize> {
    let mut assignment = HashMap::new();
    if let Some(finest) = partitions.last() {
        for (community, members) in finest.communities.iter().enumerate() {
            for node in members {
                assignment.insert(node.clone(), community);
            }
        }
    }
    assignment
}

/// Writes the graph as GraphML with a per-node community attribute.
fn write_graphml(
    graph: &Graph<String>,
    assignment: &HashMap<String, usize>,
    viz_dir: &Path,
) -> Result<()> {
    let path = viz_dir.join("network.graphml");
    let mut file = File::create(path)?;

    writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(file, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
    writeln!(
        file,
        "  <key id=\"community\" for=\"node\" attr.name=\"community\" attr.type=\"int\"/>"
    )?;
    writeln!(file, "  <graph id=\"G\" edgedefault=\"undirected\">")?;

    for (idx, node) in graph.nodes().enumerate() {
        let community = assignment.get(node).copied().unwrap_or(0);
        writeln!(
            file,
            "    <node id=\"n{idx}\">\n      <data key=\"community\">{community}</data>\n    </node>"
        )?;
    }

    for (edge_id, (src, dst)) in graph.edge_indices().into_iter().enumerate() {
        writeln!(
            file,
            "    <edge id=\"e{edge_id}\" source=\"n{src}\" target=\"n{dst}\"/>"
        )?;
    }

    writeln!(file, "  </graph>")?;
    writeln!(file, "</graphml>")?;

    Ok(())
}

/// Writes the id,community assignment table.
fn write_node_csv(
    graph: &Graph<String>,
    assignment: &HashMap<String, usize>,
    viz_dir: &Path,
) -> Result<()> {
    let path = viz_dir.join("nodes.csv");
    let mut file = File::create(path)?;

    writeln!(file, "id,community")?;
    for node in graph.nodes() {
        let community = assignment.get(node).copied().unwrap_or(0);
        writeln!(file, "{node},{community}")?;
    }

    Ok(())
}

/// Writes the descending degree sequence for log-log rank plots.
fn write_degree_rank(graph: &Graph<String>, viz_dir: &Path) -> Result<()> {
    let path = viz_dir.join("degree_rank.csv");
    let mut file = File::create(path)?;

    writeln!(file, "rank,degree")?;
    for (rank, degree) in metrics::degree_distribution(graph).iter().enumerate() {
        writeln!(file, "{},{}", rank + 1, degree)?;
    }

    Ok(())
}
