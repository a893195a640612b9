//! Girvan–Newman community detection

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::community::Partition;
use crate::error::GraphError;
use crate::graph::Graph;
use crate::metrics::centrality::edge_betweenness_scores;

/// Relative tolerance for treating edge-betweenness scores as tied.
const TIE_TOLERANCE: f64 = 1e-9;

/// Union-Find over dense node indices for component recomputation.
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i).
    parent: Vec<u32>,

    /// Size of each root's set, for union by rank.
    rank: Vec<u32>,
}

impl DisjointSets {
    /// Creates a structure with every node in its own set.
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![1; size],
        }
    }

    /// Finds the root of the set containing `x`, compressing the path.
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Second pass: point everything on the path at the root.
        let mut cursor = x;
        while self.parent[cursor as usize] != root {
            let next = self.parent[cursor as usize];
            self.parent[cursor as usize] = root;
            cursor = next;
        }
        root
    }

    /// Merges the sets containing `x` and `y`.
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }

        // Attach the smaller tree under the larger root.
        if self.rank[root_x as usize] >= self.rank[root_y as usize] {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += self.rank[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.rank[root_y as usize] += self.rank[root_x as usize];
        }
    }
}

/// A bounded, restartable sequence of partitions from iterative
/// edge-betweenness removal.
///
/// Each `next()` call performs one transition: edge betweenness is computed
/// over the remaining edge set and every edge tied for the maximum is
/// removed, repeating until the connected-component count strictly exceeds
/// the previous level's, at which point the new partition is yielded. The
/// sequence ends once every community is a singleton (or immediately after
/// yielding the component partition of an edgeless input graph).
pub struct CommunityLevels<'a, K> {
    graph: &'a Graph<K>,

    /// Working adjacency lists; edges are removed here, the input graph is
    /// untouched.
    adjacency: Vec<Vec<u32>>,

    /// Undirected edges remaining in the working copy.
    remaining_edges: usize,

    /// Community count of the last yielded partition (input component count
    /// before the first yield).
    communities: usize,

    done: bool,
}

impl<'a, K> CommunityLevels<'a, K>
where
    K: Clone + Eq + Hash + Ord + Debug + Display + Sync,
{
    /// Starts a fresh detection sequence over a full copy of the graph's
    /// edge set.
    pub fn new(graph: &'a Graph<K>) -> Self {
        let adjacency: Vec<Vec<u32>> = (0..graph.node_count() as u32)
            .map(|v| graph.neighbors(v).to_vec())
            .collect();
        let remaining_edges = graph.edge_count();
        let communities = graph.connected_components().len();

        Self {
            graph,
            adjacency,
            remaining_edges,
            communities,
            done: graph.node_count() == 0,
        }
    }

    /// Removes every edge whose betweenness is within tolerance of the
    /// maximum; returns how many were removed.
    fn remove_central_edges(&mut self) -> usize {
        let scores = edge_betweenness_scores(&self.adjacency);
        let max = scores.values().fold(0.0f64, |acc, &v| acc.max(v));
        let cutoff = max - TIE_TOLERANCE * max.max(1.0);

        let doomed: Vec<(u32, u32)> = scores
            .into_iter()
            .filter(|&(_, score)| score >= cutoff)
            .map(|(pair, _)| pair)
            .collect();

        for &(a, b) in &doomed {
            self.adjacency[a as usize].retain(|&w| w != b);
            self.adjacency[b as usize].retain(|&w| w != a);
        }
        self.remaining_edges -= doomed.len();

        doomed.len()
    }

    /// Recomputes connected components of the working edge set.
    fn components(&self) -> Vec<Vec<u32>> {
        let n = self.adjacency.len();
        let mut sets = DisjointSets::new(n);
        for (v, neighbors) in self.adjacency.iter().enumerate() {
            for &w in neighbors {
                sets.union(v as u32, w);
            }
        }

        let mut grouped: HashMap<u32, Vec<u32>> = HashMap::new();
        for v in 0..n as u32 {
            grouped.entry(sets.find(v)).or_default().push(v);
        }
        grouped.into_values().collect()
    }

    /// Maps index components back onto node ids, largest community first.
    fn make_partition(&self, mut components: Vec<Vec<u32>>) -> Partition<K> {
        for component in &mut components {
            component.sort_unstable();
        }
        components.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));

        let communities = components
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .map(|idx| self.graph.label(idx).clone())
                    .collect()
            })
            .collect();

        Partition { communities }
    }
}

impl<K> Iterator for CommunityLevels<'_, K>
where
    K: Clone + Eq + Hash + Ord + Debug + Display + Sync,
{
    type Item = Partition<K>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // An edgeless input has nothing to remove; its component partition
        // is yielded once.
        if self.remaining_edges == 0 {
            self.done = true;
            return Some(self.make_partition(self.components()));
        }

        let baseline = self.communities;
        while self.remaining_edges > 0 {
            self.remove_central_edges();
            let components = self.components();
            if components.len() > baseline {
                self.communities = components.len();
                if self.communities == self.graph.node_count()
                    || self.remaining_edges == 0
                {
                    self.done = true;
                }
                return Some(self.make_partition(components));
            }
        }

        self.done = true;
        None
    }
}

/// Runs Girvan–Newman detection for at most `levels` transitions, coarsest
/// partition first.
///
/// Fails with [`GraphError::InvalidBound`] when `levels < 1`. Fewer than
/// `levels` partitions are returned if every community becomes a singleton
/// early.
pub fn detect_communities<K>(
    graph: &Graph<K>,
    levels: usize,
) -> Result<Vec<Partition<K>>, GraphError>
where
    K: Clone + Eq + Hash + Ord + Debug + Display + Sync,
{
    if levels < 1 {
        return Err(GraphError::InvalidBound(levels));
    }

    log::debug!(
        "detecting up to {} community levels over {} nodes / {} edges",
        levels,
        graph.node_count(),
        graph.edge_count()
    );

    Ok(CommunityLevels::new(graph).take(levels).collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

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

    fn barbell() -> Graph<String> {
        // Two triangles joined by a single bridge c-d.
        graph_from(
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
        )
    }

    fn assert_covers(partition: &Partition<String>, graph: &Graph<String>) {
        let mut seen = HashSet::new();
        for community in &partition.communities {
            for node in community {
                assert!(seen.insert(node.clone()), "node {node} appears twice");
            }
        }
        assert_eq!(seen.len(), graph.node_count());
    }

    #[test]
    fn invalid_bound_rejected() {
        let graph = barbell();
        assert_eq!(
            detect_communities(&graph, 0).unwrap_err(),
            GraphError::InvalidBound(0)
        );
    }

    #[test]
    fn bridge_splits_first() {
        let graph = barbell();
        let partitions = detect_communities(&graph, 1).unwrap();
        assert_eq!(partitions.len(), 1);

        let first = &partitions[0];
        assert_eq!(first.len(), 2);
        assert_eq!(first.communities[0], vec!["a", "b", "c"]);
        assert_eq!(first.communities[1], vec!["d", "e", "f"]);
        assert_covers(first, &graph);
    }

    #[test]
    fn levels_are_strictly_finer() {
        let graph = barbell();
        let partitions = detect_communities(&graph, 10).unwrap();

        let mut previous = graph.connected_components().len();
        for partition in &partitions {
            assert!(partition.len() > previous);
            previous = partition.len();
            assert_covers(partition, &graph);
        }
        assert_eq!(partitions.last().unwrap().len(), graph.node_count());
    }

    #[test]
    fn connected_graph_reaches_singletons() {
        // A 4-cycle's edges all tie, so one transition dissolves it.
        let graph = graph_from(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")], &[]);
        let partitions = detect_communities(&graph, graph.node_count()).unwrap();

        assert!(partitions.len() <= graph.node_count() - 1);
        assert_eq!(partitions.last().unwrap().len(), graph.node_count());
    }

    #[test]
    fn bound_caps_the_sequence() {
        // Barbell with a pendant g on a: the bridge goes first, then the
        // pendant edge, then the triangles dissolve — three levels total.
        let graph = graph_from(
            &[
                ("a", "b"),
                ("b", "c"),
                ("c", "a"),
                ("c", "d"),
                ("d", "e"),
                ("e", "f"),
                ("f", "d"),
                ("a", "g"),
            ],
            &[],
        );

        let full = detect_communities(&graph, 10).unwrap();
        assert_eq!(
            full.iter().map(Partition::len).collect::<Vec<_>>(),
            vec![2, 3, 7]
        );

        let capped = detect_communities(&graph, 2).unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[1].len(), 3);
    }

    #[test]
    fn edgeless_graph_yields_singletons_once() {
        let graph = graph_from(&[], &["a", "b", "c"]);
        let partitions = detect_communities(&graph, 5).unwrap();

        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].len(), 3);
        assert_covers(&partitions[0], &graph);
    }

    #[test]
    fn sequence_is_restartable() {
        let graph = barbell();
        let first: Vec<_> = CommunityLevels::new(&graph).take(2).collect();
        let second: Vec<_> = CommunityLevels::new(&graph).take(2).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn disjoint_sets_union_and_find() {
        let mut sets = DisjointSets::new(5);
        sets.union(0, 1);
        sets.union(3, 4);

        assert_eq!(sets.find(0), sets.find(1));
        assert_eq!(sets.find(3), sets.find(4));
        assert_ne!(sets.find(0), sets.find(3));
        assert_ne!(sets.find(2), sets.find(0));
    }
}
