//! Incremental graph construction for loaders

use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::graph::Graph;

/// Builder for incrementally assembling a [`Graph`] while parsing input.
///
/// Unlike the validating [`Graph::new`] constructor, the builder creates
/// endpoints implicitly as edges arrive (edge-list files carry no explicit
/// node set), skips self-loops, and deduplicates repeated edges.
pub struct GraphBuilder<K> {
    /// Mapping from node ids to dense indices.
    index: HashMap<K, u32>,

    /// Node ids in first-seen order.
    labels: Vec<K>,

    /// Adjacency lists for each node.
    lists: Vec<Vec<u32>>,

    /// Normalized `(lo, hi)` pairs already inserted.
    seen: HashSet<(u32, u32)>,
}

impl<K> GraphBuilder<K>
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            labels: Vec::new(),
            lists: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Returns the dense index for a node id, creating the node on first use.
    pub fn get_or_create_node(&mut self, id: K) -> u32 {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }

        let idx = self.labels.len() as u32;
        self.index.insert(id.clone(), idx);
        self.labels.push(id);
        self.lists.push(Vec::new());

        idx
    }

    /// Adds an undirected edge, creating endpoints as needed.
    ///
    /// Self-loops and repeated edges are skipped.
    pub fn add_edge(&mut self, src: K, dst: K) {
        let i = self.get_or_create_node(src);
        let j = self.get_or_create_node(dst);

        if i == j {
            return;
        }
        if self.seen.insert((i.min(j), i.max(j))) {
            self.lists[i as usize].push(j);
            self.lists[j as usize].push(i);
        }
    }

    /// Returns the number of nodes created so far.
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Finalizes the builder into an immutable graph.
    pub fn build(self) -> Graph<K> {
        Graph::from_adjacency(self.labels, self.index, self.lists)
    }
}

impl<K> Default for GraphBuilder<K>
where
    K: Clone + Eq + Hash + Ord + Debug + Display,
{
    fn default() -> Self {
        Self::new()
    }
}
