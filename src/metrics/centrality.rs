//! Centrality measures over an immutable graph snapshot

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use rayon::prelude::*;

use crate::graph::Graph;

/// Sources per parallel task in the Brandes sweeps.
const SOURCE_CHUNK: usize = 128;

/// Returns each node's degree centrality: `degree(v) / (n - 1)`.
///
/// Graphs with one node or fewer yield zeros, since the share of possible
/// neighbors is undefined there.
pub fn degree_centrality<K>(graph: &Graph<K>) -> BTreeMap<K, f64>
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    let n = graph.node_count();
    let scale = if n > 1 { 1.0 / (n as f64 - 1.0) } else { 0.0 };

    graph
        .nodes()
        .enumerate()
        .map(|(i, node)| (node.clone(), graph.degree_of(i as u32) as f64 * scale))
        .collect()
}

/// Returns each node's closeness centrality with the Wasserman–Faust
/// correction for disconnected graphs.
///
/// For a node `v` reaching `r` nodes (itself included) with total
/// shortest-path distance `d`, the value is `(r - 1) / d` scaled by
/// `(r - 1) / (n - 1)`. On a connected graph the scale factor is 1; an
/// isolated node scores 0. One BFS per source, sources swept in parallel.
pub fn closeness_centrality<K>(graph: &Graph<K>) -> BTreeMap<K, f64>
where
    K: Clone + Eq + Hash + Ord + Debug + Display + Sync,
{
    let n = graph.node_count();
    let values: Vec<f64> = (0..n as u32)
        .into_par_iter()
        .map(|source| {
            let (reached, total) = bfs_distance_sum(graph, source);
            if total == 0 || n <= 1 {
                return 0.0;
            }
            let reachable = (reached - 1) as f64;
            (reachable / total as f64) * (reachable / (n as f64 - 1.0))
        })
        .collect();

    keyed(graph, values)
}

/// Returns each node's betweenness centrality via Brandes' accumulation
/// algorithm, normalized by `2 / ((n - 1)(n - 2))` for undirected graphs.
///
/// One BFS plus dependency back-propagation per source, O(V·E) total;
/// sources are swept in parallel and partial sums reduced. Graphs with two
/// nodes or fewer yield zeros.
pub fn betweenness_centrality<K>(graph: &Graph<K>) -> BTreeMap<K, f64>
where
    K: Clone + Eq + Hash + Ord + Debug + Display + Sync,
{
    let n = graph.node_count();
    if n <= 2 {
        return keyed(graph, vec![0.0; n]);
    }

    // Fixed chunk boundaries and an ordered final fold keep the
    // floating-point summation order identical across runs.
    let sources: Vec<u32> = (0..n as u32).collect();
    let partials: Vec<Vec<f64>> = sources
        .par_chunks(SOURCE_CHUNK)
        .map(|chunk| {
            let mut acc = vec![0.0; n];
            for &source in chunk {
                for (a, p) in acc.iter_mut().zip(node_dependencies(graph, source)) {
                    *a += p;
                }
            }
            acc
        })
        .collect();

    let mut sums = vec![0.0; n];
    for partial in partials {
        for (a, p) in sums.iter_mut().zip(partial) {
            *a += p;
        }
    }

    // The per-source sums count every ordered (s, t) pair, so the undirected
    // half and the 2/((n-1)(n-2)) normalization collapse into one factor.
    let scale = 1.0 / ((n as f64 - 1.0) * (n as f64 - 2.0));
    keyed(graph, sums.into_iter().map(|v| v * scale).collect())
}

/// Returns the betweenness of every undirected edge, keyed by its endpoint
/// ids in `(lo, hi)` insertion order.
///
/// Values count the shortest paths traversing each edge, halved for the
/// direction double-count; no further normalization is applied.
pub fn edge_betweenness<K>(graph: &Graph<K>) -> BTreeMap<(K, K), f64>
where
    K: Clone + Eq + Hash + Ord + Debug + Display + Sync,
{
    let adjacency: Vec<Vec<u32>> = (0..graph.node_count() as u32)
        .map(|v| graph.neighbors(v).to_vec())
        .collect();

    edge_betweenness_scores(&adjacency)
        .into_iter()
        .map(|((a, b), score)| {
            ((graph.label(a).clone(), graph.label(b).clone()), score)
        })
        .collect()
}

/// Brandes' edge-accumulation variant over raw adjacency lists.
///
/// Operates on adjacency lists rather than a [`Graph`] so the community
/// engine can recompute scores on its shrinking working copy. Keys are
/// `(lo, hi)` index pairs; values are halved for the direction double-count.
pub(crate) fn edge_betweenness_scores(
    adjacency: &[Vec<u32>],
) -> HashMap<(u32, u32), f64> {
    let n = adjacency.len();

    // Index the surviving edges so per-source partials are flat vectors.
    let mut edge_ids: HashMap<(u32, u32), usize> = HashMap::new();
    let mut pairs: Vec<(u32, u32)> = Vec::new();
    for (v, neighbors) in adjacency.iter().enumerate() {
        for &w in neighbors {
            if (v as u32) < w {
                edge_ids.insert((v as u32, w), pairs.len());
                pairs.push((v as u32, w));
            }
        }
    }

    if pairs.is_empty() {
        return HashMap::new();
    }

    // Same fixed-order reduction as the node variant.
    let sources: Vec<u32> = (0..n as u32).collect();
    let partials: Vec<Vec<f64>> = sources
        .par_chunks(SOURCE_CHUNK)
        .map(|chunk| {
            let mut acc = vec![0.0; pairs.len()];
            for &source in chunk {
                let partial = edge_dependencies(adjacency, &edge_ids, source);
                for (a, p) in acc.iter_mut().zip(partial) {
                    *a += p;
                }
            }
            acc
        })
        .collect();

    let mut sums = vec![0.0; pairs.len()];
    for partial in partials {
        for (a, p) in sums.iter_mut().zip(partial) {
            *a += p;
        }
    }

    pairs
        .into_iter()
        .zip(sums)
        .map(|(pair, sum)| (pair, sum / 2.0))
        .collect()
}

/// Single-source BFS returning `(nodes reached, sum of distances)`.
fn bfs_distance_sum<K>(graph: &Graph<K>, source: u32) -> (usize, u64)
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    let n = graph.node_count();
    let mut dist = vec![u32::MAX; n];
    dist[source as usize] = 0;

    let mut reached = 1;
    let mut total = 0u64;
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        for &w in graph.neighbors(v) {
            if dist[w as usize] == u32::MAX {
                dist[w as usize] = dist[v as usize] + 1;
                reached += 1;
                total += u64::from(dist[w as usize]);
                queue.push_back(w);
            }
        }
    }

    (reached, total)
}

/// Brandes dependency accumulation for one source: BFS forward pass counting
/// shortest paths, then back-propagation in reverse visit order.
fn node_dependencies<K>(graph: &Graph<K>, source: u32) -> Vec<f64>
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    let n = graph.node_count();
    let (order, preds, sigma) = shortest_path_dag(
        |v| graph.neighbors(v),
        n,
        source,
    );

    let mut delta = vec![0.0; n];
    let mut partial = vec![0.0; n];
    for &w in order.iter().rev() {
        for &v in &preds[w as usize] {
            delta[v as usize] +=
                sigma[v as usize] / sigma[w as usize] * (1.0 + delta[w as usize]);
        }
        if w != source {
            partial[w as usize] += delta[w as usize];
        }
    }

    partial
}

/// Edge-variant accumulation for one source: dependency flows onto the DAG
/// edges instead of the interior nodes.
fn edge_dependencies(
    adjacency: &[Vec<u32>],
    edge_ids: &HashMap<(u32, u32), usize>,
    source: u32,
) -> Vec<f64> {
    let n = adjacency.len();
    let (order, preds, sigma) = shortest_path_dag(
        |v| adjacency[v as usize].as_slice(),
        n,
        source,
    );

    let mut delta = vec![0.0; n];
    let mut partial = vec![0.0; edge_ids.len()];
    for &w in order.iter().rev() {
        let coeff = (1.0 + delta[w as usize]) / sigma[w as usize];
        for &v in &preds[w as usize] {
            let flow = sigma[v as usize] * coeff;
            partial[edge_ids[&(v.min(w), v.max(w))]] += flow;
            delta[v as usize] += flow;
        }
    }

    partial
}

/// BFS forward pass shared by both Brandes variants: returns the visit
/// order, the shortest-path predecessor lists, and the path counts.
fn shortest_path_dag<'a, F>(
    neighbors: F,
    n: usize,
    source: u32,
) -> (Vec<u32>, Vec<Vec<u32>>, Vec<f64>)
where
    F: Fn(u32) -> &'a [u32],
{
    let mut dist = vec![-1i64; n];
    let mut sigma = vec![0.0f64; n];
    let mut preds: Vec<Vec<u32>> = vec![Vec::new(); n];
    let mut order = Vec::with_capacity(n);

    dist[source as usize] = 0;
    sigma[source as usize] = 1.0;

    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        order.push(v);
        for &w in neighbors(v) {
            if dist[w as usize] < 0 {
                dist[w as usize] = dist[v as usize] + 1;
                queue.push_back(w);
            }
            if dist[w as usize] == dist[v as usize] + 1 {
                sigma[w as usize] += sigma[v as usize];
                preds[w as usize].push(v);
            }
        }
    }

    (order, preds, sigma)
}

/// Zips per-index values back onto node ids.
fn keyed<K>(graph: &Graph<K>, values: Vec<f64>) -> BTreeMap<K, f64>
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    graph
        .nodes()
        .cloned()
        .zip(values)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(pairs: &[(&str, &str)], extra_nodes: &[&str]) -> Graph<String> {
        let mut nodes: Vec<String> = Vec::new();
        for (a, b) in pairs {
            for id in [a, b] {
                if !nodes.iter().any(|n| n == id) {
                    nodes.push(id.to_string());
                }
            }
        }
        for id in extra_nodes {
            nodes.push(id.to_string());
        }
        let edges: Vec<(String, String)> = pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        Graph::new(nodes, &edges).unwrap()
    }

    fn star() -> Graph<String> {
        graph_from(&[("x", "p"), ("x", "q"), ("x", "r")], &[])
    }

    fn cycle4() -> Graph<String> {
        graph_from(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")], &[])
    }

    #[test]
    fn degree_centrality_star() {
        let dc = degree_centrality(&star());
        assert!((dc["x"] - 1.0).abs() < 1e-12);
        assert!((dc["p"] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn degree_centrality_cycle() {
        let dc = degree_centrality(&cycle4());
        for value in dc.values() {
            assert!((value - 2.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn degree_centrality_trivial_graphs_are_zero() {
        let empty: Graph<String> = Graph::new(vec![], &[]).unwrap();
        assert!(degree_centrality(&empty).is_empty());

        let single = graph_from(&[], &["a"]);
        assert_eq!(degree_centrality(&single)["a"], 0.0);
    }

    #[test]
    fn handshake_lemma() {
        let graph = graph_from(&[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")], &[]);
        let n = graph.node_count() as f64;
        let sum: f64 = degree_centrality(&graph).values().sum();
        assert!((sum * (n - 1.0) - 2.0 * graph.edge_count() as f64).abs() < 1e-9);
    }

    #[test]
    fn betweenness_star() {
        let bc = betweenness_centrality(&star());
        assert!((bc["x"] - 1.0).abs() < 1e-12);
        assert!(bc["p"].abs() < 1e-12);
        assert!(bc["q"].abs() < 1e-12);
    }

    #[test]
    fn betweenness_path() {
        // a - b - c - d: each interior node carries (a,c) or (b,d) plus
        // (a,d), i.e. 2 of the 3 pairs not involving itself.
        let bc = betweenness_centrality(&graph_from(
            &[("a", "b"), ("b", "c"), ("c", "d")],
            &[],
        ));
        assert!(bc["a"].abs() < 1e-12);
        assert!((bc["b"] - 2.0 / 3.0).abs() < 1e-12);
        assert!((bc["c"] - 2.0 / 3.0).abs() < 1e-12);
        assert!(bc["d"].abs() < 1e-12);
    }

    #[test]
    fn betweenness_split_paths() {
        // Diamond a-b-c plus a-d-c: b and d each carry half of the (a, c)
        // pair.
        let bc = betweenness_centrality(&graph_from(
            &[("a", "b"), ("b", "c"), ("a", "d"), ("d", "c")],
            &[],
        ));
        assert!((bc["b"] - 1.0 / 6.0).abs() < 1e-12);
        assert!((bc["d"] - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn betweenness_non_negative() {
        let bc = betweenness_centrality(&graph_from(
            &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")],
            &["e"],
        ));
        for value in bc.values() {
            assert!(*value >= 0.0);
        }
    }

    #[test]
    fn closeness_cycle() {
        let cc = closeness_centrality(&cycle4());
        for value in cc.values() {
            assert!((value - 0.75).abs() < 1e-12);
        }
    }

    #[test]
    fn closeness_star() {
        let cc = closeness_centrality(&star());
        assert!((cc["x"] - 1.0).abs() < 1e-12);
        assert!((cc["p"] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn closeness_isolated_node_is_zero() {
        let cc = closeness_centrality(&graph_from(&[("a", "b")], &["c"]));
        assert_eq!(cc["c"], 0.0);
        // Wasserman–Faust scaling: (1/1) * (1/2) for a and b.
        assert!((cc["a"] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn edge_betweenness_path() {
        // a - b - c: both edges lie on two of the three shortest paths.
        let eb = edge_betweenness(&graph_from(&[("a", "b"), ("b", "c")], &[]));
        assert_eq!(eb.len(), 2);
        for value in eb.values() {
            assert!((value - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn edge_betweenness_bridge_dominates() {
        // Two triangles joined by a bridge: the bridge carries all 9
        // cross-pairs.
        let eb = edge_betweenness(&graph_from(
            &[
                ("a", "b"),
                ("b", "c"),
                ("c", "a"),
                ("c", "d"),
                ("d", "e"),
                ("e", "f"),
                ("f", "d"),
            ],
            &[],
        ));
        let bridge = eb[&("c".to_string(), "d".to_string())];
        for ((lo, hi), value) in &eb {
            if (lo.as_str(), hi.as_str()) != ("c", "d") {
                assert!(*value < bridge);
            }
        }
        assert!((bridge - 9.0).abs() < 1e-12);
    }

    #[test]
    fn metrics_are_deterministic() {
        let graph = graph_from(
            &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "e")],
            &[],
        );
        assert_eq!(
            betweenness_centrality(&graph),
            betweenness_centrality(&graph)
        );
        assert_eq!(closeness_centrality(&graph), closeness_centrality(&graph));
    }
}
