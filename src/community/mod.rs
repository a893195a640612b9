//! Community detection module

pub mod detection;

use serde::Serialize;

pub use detection::{detect_communities, CommunityLevels};

/// One partition of the node set produced at a single detection level.
///
/// Communities are pairwise disjoint, their union is the full node set, and
/// they are ordered largest-first (size ties break on the smallest member
/// index). Members within a community are listed in node insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition<K> {
    /// The communities, each a sorted list of node ids.
    pub communities: Vec<Vec<K>>,
}

impl<K> Partition<K> {
    /// Returns the number of communities.
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    /// Returns true if the partition holds no communities.
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }
}
