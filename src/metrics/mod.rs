//! Stateless graph metrics over an immutable snapshot

pub mod centrality;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use itertools::Itertools;
use rayon::prelude::*;

use crate::error::GraphError;
use crate::graph::Graph;

pub use centrality::{
    betweenness_centrality, closeness_centrality, degree_centrality,
    edge_betweenness,
};

/// Computes the density of the graph: the ratio of edges to the maximum
/// possible edges, `2m / (n(n - 1))`.
///
/// Graphs with one node or fewer have density 0.
pub fn density<K>(graph: &Graph<K>) -> f64
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    let n = graph.node_count() as f64;
    if n <= 1.0 {
        return 0.0;
    }
    2.0 * graph.edge_count() as f64 / (n * (n - 1.0))
}

/// Computes the average clustering coefficient: the mean over all nodes of
/// `triangles(v) / (deg(v)·(deg(v) - 1) / 2)`.
///
/// Nodes with degree below 2 contribute 0; the empty graph scores 0.
pub fn clustering_coefficient<K>(graph: &Graph<K>) -> f64
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    let n = graph.node_count();
    if n == 0 {
        return 0.0;
    }

    let mut sum = 0.0;
    for v in 0..n as u32 {
        let neighbors = graph.neighbors(v);
        let degree = neighbors.len();
        if degree < 2 {
            continue;
        }

        let closed = neighbors
            .iter()
            .tuple_combinations()
            .filter(|(&u, &w)| graph.has_edge(u, w))
            .count();
        sum += closed as f64 / (degree * (degree - 1) / 2) as f64;
    }

    sum / n as f64
}

/// Computes the mean shortest-path distance over all reachable node pairs of
/// the largest connected component.
///
/// When several components share the maximum size the one containing the
/// smallest node index wins. Fails with
/// [`GraphError::DisconnectedSingleton`] when that component has fewer than
/// 2 nodes.
pub fn average_path_length<K>(graph: &Graph<K>) -> Result<f64, GraphError>
where
    K: Clone + Eq + Hash + Ord + Debug + Display + Sync,
{
    let components = graph.connected_components();

    // Components are ordered by smallest member, so keeping the first
    // maximal one realizes the documented tie-break.
    let mut largest: &[u32] = &[];
    for component in &components {
        if component.len() > largest.len() {
            largest = component;
        }
    }
    if largest.len() < 2 {
        return Err(GraphError::DisconnectedSingleton);
    }

    let total: u64 = largest
        .par_iter()
        .map(|&source| component_distance_sum(graph, source))
        .sum();

    let pairs = (largest.len() * (largest.len() - 1)) as f64;
    Ok(total as f64 / pairs)
}

/// Returns the node degrees sorted descending; ties keep insertion order.
pub fn degree_distribution<K>(graph: &Graph<K>) -> Vec<usize>
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    let mut degrees: Vec<usize> = (0..graph.node_count() as u32)
        .map(|v| graph.degree_of(v))
        .collect();
    // Stable sort preserves insertion order among equal degrees.
    degrees.sort_by(|a, b| b.cmp(a));
    degrees
}

/// Sums BFS distances from one source; only nodes in the source's component
/// are reachable, so no membership filtering is needed.
fn component_distance_sum<K>(graph: &Graph<K>, source: u32) -> u64
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    use std::collections::VecDeque;

    let mut dist = vec![u32::MAX; graph.node_count()];
    dist[source as usize] = 0;

    let mut total = 0u64;
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        for &w in graph.neighbors(v) {
            if dist[w as usize] == u32::MAX {
                dist[w as usize] = dist[v as usize] + 1;
                total += u64::from(dist[w as usize]);
                queue.push_back(w);
            }
        }
    }

    total
}
