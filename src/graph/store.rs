//! In-memory undirected graph store

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde_json::Value;

use crate::error::GraphError;

/// An undirected simple graph over opaque node identifiers.
///
/// Node identifiers of type `K` are mapped to dense `u32` indices at
/// construction; adjacency is stored in compressed sparse rows (an offset
/// array plus one concatenated neighbor array) with each neighbor list
/// sorted for binary-search membership tests. The node and edge sets are
/// fixed once built; only per-node attributes can be mutated afterwards.
#[derive(Debug, Clone)]
pub struct Graph<K> {
    /// Node identifiers, in insertion order (index -> id).
    labels: Vec<K>,

    /// Reverse mapping (id -> index).
    index: HashMap<K, u32>,

    /// Offset array: `offsets[i]..offsets[i+1]` is node i's neighbor range.
    offsets: Vec<u32>,

    /// Concatenated sorted neighbor lists.
    adjacency: Vec<u32>,

    /// Number of undirected edges.
    edge_count: usize,

    /// Per-node attribute mappings, attached after construction.
    attributes: Vec<HashMap<String, Value>>,
}

impl<K> Graph<K>
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    /// Builds a graph from an explicit node set and a list of undirected
    /// edges.
    ///
    /// Fails with [`GraphError::MalformedInput`] if a node id is duplicated,
    /// an edge references an id absent from the node set, or an edge is a
    /// self-loop. Parallel edges collapse to a single edge.
    pub fn new(nodes: Vec<K>, edges: &[(K, K)]) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.clone(), i as u32).is_some() {
                return Err(GraphError::MalformedInput(format!(
                    "duplicate node id `{node}`"
                )));
            }
        }

        let mut lists: Vec<Vec<u32>> = vec![Vec::new(); nodes.len()];
        let mut seen = HashSet::with_capacity(edges.len());
        for (a, b) in edges {
            let i = *index.get(a).ok_or_else(|| {
                GraphError::MalformedInput(format!(
                    "edge ({a}, {b}) references unknown node `{a}`"
                ))
            })?;
            let j = *index.get(b).ok_or_else(|| {
                GraphError::MalformedInput(format!(
                    "edge ({a}, {b}) references unknown node `{b}`"
                ))
            })?;
            if i == j {
                return Err(GraphError::MalformedInput(format!(
                    "self-loop on node `{a}`"
                )));
            }
            if seen.insert((i.min(j), i.max(j))) {
                lists[i as usize].push(j);
                lists[j as usize].push(i);
            }
        }

        Ok(Self::from_adjacency(nodes, index, lists))
    }

    /// Assembles the CSR arrays from per-node neighbor lists.
    ///
    /// Callers must supply symmetric, deduplicated lists; the builder and
    /// the validating constructor both guarantee this.
    pub(crate) fn from_adjacency(
        labels: Vec<K>,
        index: HashMap<K, u32>,
        mut lists: Vec<Vec<u32>>,
    ) -> Self {
        let total: usize = lists.iter().map(|l| l.len()).sum();
        let mut offsets = Vec::with_capacity(labels.len() + 1);
        let mut adjacency = Vec::with_capacity(total);

        offsets.push(0);
        let mut offset = 0u32;
        for list in &mut lists {
            // Sorted lists let `has_edge` use binary search.
            list.sort_unstable();
            adjacency.extend_from_slice(list);
            offset += list.len() as u32;
            offsets.push(offset);
        }

        let attributes = vec![HashMap::new(); labels.len()];

        Self {
            labels,
            index,
            offsets,
            adjacency,
            edge_count: total / 2,
            attributes,
        }
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns the number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Checks whether a node id is present.
    pub fn contains(&self, node: &K) -> bool {
        self.index.contains_key(node)
    }

    /// Returns the dense index of a node id.
    pub fn index_of(&self, node: &K) -> Option<u32> {
        self.index.get(node).copied()
    }

    /// Returns the id at a dense index.
    pub fn label(&self, idx: u32) -> &K {
        &self.labels[idx as usize]
    }

    /// Iterates node ids in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &K> {
        self.labels.iter()
    }

    /// Returns the sorted neighbor indices of a node.
    pub fn neighbors(&self, idx: u32) -> &[u32] {
        let start = self.offsets[idx as usize] as usize;
        let end = self.offsets[idx as usize + 1] as usize;
        &self.adjacency[start..end]
    }

    /// Checks adjacency between two node indices.
    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Returns the number of edges incident to a node.
    ///
    /// Fails with [`GraphError::UnknownNode`] if the id is absent.
    pub fn degree(&self, node: &K) -> Result<usize, GraphError> {
        let idx = self
            .index_of(node)
            .ok_or_else(|| GraphError::UnknownNode(node.to_string()))?;
        Ok(self.degree_of(idx))
    }

    /// Degree by dense index.
    pub fn degree_of(&self, idx: u32) -> usize {
        (self.offsets[idx as usize + 1] - self.offsets[idx as usize]) as usize
    }

    /// Returns each undirected edge once as a `(lo, hi)` index pair.
    pub fn edge_indices(&self) -> Vec<(u32, u32)> {
        let mut pairs = Vec::with_capacity(self.edge_count);
        for v in 0..self.node_count() as u32 {
            for &w in self.neighbors(v) {
                if v < w {
                    pairs.push((v, w));
                }
            }
        }
        pairs
    }

    /// Attaches an attribute value to a node, replacing any previous value
    /// under the same key.
    ///
    /// Fails with [`GraphError::UnknownNode`] if the id is absent.
    pub fn attach_attribute(
        &mut self,
        node: &K,
        key: &str,
        value: Value,
    ) -> Result<(), GraphError> {
        let idx = self
            .index_of(node)
            .ok_or_else(|| GraphError::UnknownNode(node.to_string()))?;
        self.attributes[idx as usize].insert(key.to_string(), value);
        Ok(())
    }

    /// Reads back a node attribute.
    pub fn attribute(&self, node: &K, key: &str) -> Option<&Value> {
        let idx = self.index_of(node)?;
        self.attributes[idx as usize].get(key)
    }

    /// Partitions the node indices into connected components by breadth-first
    /// traversal.
    ///
    /// Components are ordered by their smallest node index; members within a
    /// component are sorted ascending.
    pub fn connected_components(&self) -> Vec<Vec<u32>> {
        let n = self.node_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n as u32 {
            if visited[start as usize] {
                continue;
            }
            visited[start as usize] = true;

            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(v) = queue.pop_front() {
                for &w in self.neighbors(v) {
                    if !visited[w as usize] {
                        visited[w as usize] = true;
                        component.push(w);
                        queue.push_back(w);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn nodes(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn construct_and_count() {
        let graph = Graph::new(
            nodes(&["a", "b", "c"]),
            &edges(&[("a", "b"), ("b", "c")]),
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(&"b".to_string()).unwrap(), 2);
        assert_eq!(graph.degree(&"a".to_string()).unwrap(), 1);
    }

    #[test]
    fn duplicate_node_rejected() {
        let err = Graph::<String>::new(nodes(&["a", "b", "a"]), &[]).unwrap_err();
        assert!(matches!(err, GraphError::MalformedInput(_)));
    }

    #[test]
    fn unknown_endpoint_rejected() {
        let err =
            Graph::new(nodes(&["a", "b"]), &edges(&[("a", "z")])).unwrap_err();
        assert!(matches!(err, GraphError::MalformedInput(_)));
    }

    #[test]
    fn self_loop_rejected() {
        let err =
            Graph::new(nodes(&["a", "b"]), &edges(&[("a", "a")])).unwrap_err();
        assert!(matches!(err, GraphError::MalformedInput(_)));
    }

    #[test]
    fn parallel_edges_collapse() {
        let graph = Graph::new(
            nodes(&["a", "b"]),
            &edges(&[("a", "b"), ("b", "a"), ("a", "b")]),
        )
        .unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree(&"a".to_string()).unwrap(), 1);
    }

    #[test]
    fn attributes_attach_and_read() {
        let mut graph = Graph::new(nodes(&["a", "b"]), &edges(&[("a", "b")])).unwrap();

        graph
            .attach_attribute(&"a".to_string(), "genres", json!(["rock", "jazz"]))
            .unwrap();

        assert_eq!(
            graph.attribute(&"a".to_string(), "genres"),
            Some(&json!(["rock", "jazz"]))
        );
        assert_eq!(graph.attribute(&"b".to_string(), "genres"), None);

        let err = graph
            .attach_attribute(&"z".to_string(), "genres", json!(1))
            .unwrap_err();
        assert_eq!(err, GraphError::UnknownNode("z".to_string()));
    }

    #[test]
    fn degree_of_unknown_node_fails() {
        let graph = Graph::new(nodes(&["a"]), &[]).unwrap();
        assert_eq!(
            graph.degree(&"z".to_string()).unwrap_err(),
            GraphError::UnknownNode("z".to_string())
        );
    }

    #[test]
    fn connected_components_split() {
        let graph = Graph::new(
            nodes(&["a", "b", "c", "d", "e"]),
            &edges(&[("a", "b"), ("c", "d")]),
        )
        .unwrap();

        let components = graph.connected_components();
        assert_eq!(components, vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn edge_indices_listed_once() {
        let graph = Graph::new(
            nodes(&["a", "b", "c"]),
            &edges(&[("a", "b"), ("b", "c"), ("a", "c")]),
        )
        .unwrap();

        assert_eq!(graph.edge_indices(), vec![(0, 1), (0, 2), (1, 2)]);
    }
}
