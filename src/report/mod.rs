//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, to_string_pretty, Value};

use crate::community::Partition;
use crate::error::GraphError;
use crate::graph::Graph;
use crate::metrics;

/// Saves analysis results to the specified directory.
pub fn save_results(
    graph: &Graph<String>,
    partitions: &[Partition<String>],
    output_dir: &str,
) -> Result<()> {
    log::info!("saving analysis results to {output_dir}");

    fs::create_dir_all(output_dir)?;

    save_summary(graph, partitions, output_dir)?;
    save_centrality_report(graph, output_dir)?;
    save_degree_distribution(graph, output_dir)?;
    save_communities(partitions, output_dir)?;

    log::info!("results saved successfully");

    Ok(())
}

/// Saves graph-level and community-level summary statistics.
fn save_summary(
    graph: &Graph<String>,
    partitions: &[Partition<String>],
    output_dir: &str,
) -> Result<()> {
    log::info!("saving summary information");

    let average_path_length = match metrics::average_path_length(graph) {
        Ok(value) => json!(value),
        Err(GraphError::DisconnectedSingleton) => {
            log::warn!("average path length undefined: largest component below 2 nodes");
            Value::Null
        }
        Err(err) => return Err(err.into()),
    };

    let summary = json!({
        "graph_stats": {
            "node_count": graph.node_count(),
            "edge_count": graph.edge_count(),
            "density": metrics::density(graph),
            "clustering_coefficient": metrics::clustering_coefficient(graph),
            "average_path_length": average_path_length,
            "connected_components": graph.connected_components().len(),
        },
        "community_stats": {
            "levels": partitions.len(),
            "final_community_count": partitions.last().map_or(0, Partition::len),
        }
    });

    let path = Path::new(output_dir).join("summary.json");
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Saves the per-metric `node: value` text report.
fn save_centrality_report(graph: &Graph<String>, output_dir: &str) -> Result<()> {
    log::info!("saving centrality report");

    let path = Path::new(output_dir).join("centrality.txt");
    let mut file = File::create(path)?;

    let sections = [
        ("Degree Centrality", metrics::degree_centrality(graph)),
        ("Betweenness Centrality", metrics::betweenness_centrality(graph)),
        ("Closeness Centrality", metrics::closeness_centrality(graph)),
    ];

    for (i, (title, values)) in sections.iter().enumerate() {
        if i > 0 {
            writeln!(file)?;
        }
        writeln!(file, "{title}:")?;
        for (node, value) in values {
            writeln!(file, "{node}: {value:.6}")?;
        }
    }

    Ok(())
}

/// Saves the descending degree sequence for rank plotting.
fn save_degree_distribution(graph: &Graph<String>, output_dir: &str) -> Result<()> {
    log::info!("saving degree distribution");

    let path = Path::new(output_dir).join("degree_distribution.csv");
    let mut file = File::create(path)?;

    writeln!(file, "rank,degree")?;
    for (rank, degree) in metrics::degree_distribution(graph).iter().enumerate() {
        writeln!(file, "{},{}", rank + 1, degree)?;
    }

    Ok(())
}

/// Saves one JSON file per detection level plus an index of all levels.
fn save_communities(partitions: &[Partition<String>], output_dir: &str) -> Result<()> {
    log::info!("saving {} community levels", partitions.len());

    let communities_dir = Path::new(output_dir).join("communities");
    fs::create_dir_all(&communities_dir)?;

    for (i, partition) in partitions.iter().enumerate() {
        let level = json!({
            "level": i + 1,
            "community_count": partition.len(),
            "communities": partition.communities,
        });

        let path = communities_dir.join(format!("level_{}.json", i + 1));
        let mut file = File::create(path)?;
        file.write_all(to_string_pretty(&level)?.as_bytes())?;
    }

    let index = json!({
        "levels": partitions.iter().enumerate().map(|(i, partition)| {
            json!({
                "level": i + 1,
                "community_count": partition.len(),
                "largest_community": partition.communities.first().map_or(0, Vec::len),
            })
        }).collect::<Vec<_>>()
    });

    let path = Path::new(output_dir).join("communities.json");
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&index)?.as_bytes())?;

    Ok(())
}
