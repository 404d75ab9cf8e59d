//! Call-scoped neighbor caches.
//!
//! Scoring a user against the similarity family touches the same reader and
//! item sets many times. [`NeighborCache`] snapshots both directions once, in
//! O(|V| + |E|), and is then passed explicitly to the similarity functions.
//! A cache is only valid for the graph state it was built from.

use crate::error::Result;
use crate::graph::{GraphView, NodeId, Partition};

/// Snapshot of item→users and user→items adjacency, indexed by node id.
///
/// # Examples
/// ```
/// use aprender_rec::graph::BipartiteGraph;
/// use aprender_rec::neighbors::NeighborCache;
///
/// let g = BipartiteGraph::from_interactions([("u1", "a"), ("u2", "a"), ("u1", "b")])
///     .expect("valid");
/// let cache = NeighborCache::build(&g).expect("consistent graph");
///
/// let a = g.resolve("a").expect("a");
/// let u1 = g.resolve("u1").expect("u1");
/// assert_eq!(cache.users_of(a).len(), 2);
/// assert_eq!(cache.items_of(u1).len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NeighborCache {
    users_by_item: Vec<Vec<NodeId>>,
    items_by_user: Vec<Vec<NodeId>>,
}

impl NeighborCache {
    /// Build both directions from `graph`.
    ///
    /// # Errors
    /// Propagates [`crate::RecError::InvalidNode`] from the graph; cannot
    /// happen for a view that reports its own node count correctly.
    pub fn build<G: GraphView>(graph: &G) -> Result<Self> {
        let n = graph.num_nodes();
        let mut users_by_item = vec![Vec::new(); n];
        let mut items_by_user = vec![Vec::new(); n];

        for v in 0..n {
            match graph.partition(v) {
                Some(Partition::Item) => {
                    users_by_item[v] = graph.neighbors_of_partition(v, Partition::User)?;
                }
                Some(Partition::User) => {
                    items_by_user[v] = graph.neighbors_of_partition(v, Partition::Item)?;
                }
                None => {}
            }
        }

        Ok(Self {
            users_by_item,
            items_by_user,
        })
    }

    /// Sorted readers of `item`. Empty for users and unknown ids.
    #[must_use]
    pub fn users_of(&self, item: NodeId) -> &[NodeId] {
        self.users_by_item.get(item).map_or(&[], Vec::as_slice)
    }

    /// Sorted items read by `user`. Empty for items and unknown ids.
    #[must_use]
    pub fn items_of(&self, user: NodeId) -> &[NodeId] {
        self.items_by_user.get(user).map_or(&[], Vec::as_slice)
    }
}
