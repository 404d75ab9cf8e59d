//! Bipartite user/item interaction graph.
//!
//! Nodes carry a string label and an immutable [`Partition`] tag. Edges are
//! unweighted and undirected, and always join one USER node to one ITEM node.
//! Adjacency lists are kept sorted so that neighbor-set intersections can use
//! a two-pointer merge and iteration order is stable.
//!
//! Recommenders read the graph through the [`GraphView`] trait, which is
//! implemented by [`BipartiteGraph`] itself and by the [`MaskedGraph`]
//! overlay used for concurrent evaluation.
//!
//! # Examples
//!
//! ```
//! use aprender_rec::graph::{BipartiteGraph, GraphView, Partition};
//!
//! let g = BipartiteGraph::from_interactions([("alice", "dune"), ("bob", "dune")])
//!     .expect("valid interactions");
//!
//! let dune = g.node_id("dune").expect("dune exists");
//! assert_eq!(g.partition(dune), Some(Partition::Item));
//! assert_eq!(g.neighbors_of_partition(dune, Partition::User).expect("valid").len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{RecError, Result};

mod overlay;

pub use overlay::MaskedGraph;

/// Graph node identifier (contiguous integers assigned in insertion order).
pub type NodeId = usize;

/// Side of the bipartition a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Actor that consumes items
    User,
    /// Consumable item (a book)
    Item,
}

impl Partition {
    /// Get string name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Item => "item",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only traversal over a bipartite graph.
///
/// Neighbor iteration must yield node ids in ascending order; the similarity
/// functions and the top-K tie-break both rely on it.
pub trait GraphView {
    /// Number of nodes (ids are `0..num_nodes()`).
    fn num_nodes(&self) -> usize;

    /// Partition of `v`, or `None` if `v` is not in the graph.
    fn partition(&self, v: NodeId) -> Option<Partition>;

    /// Label of `v`, or `None` if `v` is not in the graph.
    fn label(&self, v: NodeId) -> Option<&str>;

    /// Neighbors of `v` in ascending id order. Empty for unknown nodes.
    fn neighbors(&self, v: NodeId) -> impl Iterator<Item = NodeId> + '_;

    /// Number of neighbors of `v`.
    fn degree(&self, v: NodeId) -> usize {
        self.neighbors(v).count()
    }

    /// All neighbors of `v` tagged with `partition`, ascending.
    ///
    /// # Errors
    /// [`RecError::InvalidNode`] if `v` is not in the graph.
    fn neighbors_of_partition(&self, v: NodeId, partition: Partition) -> Result<Vec<NodeId>> {
        if v >= self.num_nodes() {
            return Err(RecError::InvalidNode {
                node: v.to_string(),
            });
        }
        Ok(self
            .neighbors(v)
            .filter(|&w| self.partition(w) == Some(partition))
            .collect())
    }

    /// Ids of all nodes tagged with `partition`, ascending.
    fn nodes_in(&self, partition: Partition) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.num_nodes()).filter(move |&v| self.partition(v) == Some(partition))
    }

    /// Ensure `v` exists and sits in `partition`.
    ///
    /// # Errors
    /// [`RecError::InvalidNode`] or [`RecError::PartitionMismatch`].
    fn require(&self, v: NodeId, partition: Partition) -> Result<()> {
        match self.partition(v) {
            None => Err(RecError::InvalidNode {
                node: v.to_string(),
            }),
            Some(actual) if actual != partition => Err(RecError::PartitionMismatch {
                node: self.label(v).unwrap_or_default().to_string(),
                expected: partition,
                actual,
            }),
            Some(_) => Ok(()),
        }
    }
}

/// Mutable bipartite interaction graph.
///
/// Storage is an adjacency list per node (sorted, deduplicated) plus a
/// label index. Node ids are never reused; there is no node removal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BipartiteGraph {
    adjacency: Vec<Vec<NodeId>>,
    partitions: Vec<Partition>,
    labels: Vec<String>,
    label_to_id: HashMap<String, NodeId>,
    n_edges: usize,
}

impl BipartiteGraph {
    /// Create empty graph.
    ///
    /// # Examples
    /// ```
    /// use aprender_rec::graph::{BipartiteGraph, GraphView};
    ///
    /// let g = BipartiteGraph::new();
    /// assert_eq!(g.num_nodes(), 0);
    /// assert_eq!(g.num_edges(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(user, item)` label pairs.
    ///
    /// The first element of each pair is tagged USER and the second ITEM.
    /// Repeated pairs collapse into a single edge.
    ///
    /// # Errors
    /// [`RecError::PartitionMismatch`] if a label appears on both sides.
    pub fn from_interactions<I, U, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (U, T)>,
        U: AsRef<str>,
        T: AsRef<str>,
    {
        let mut graph = Self::new();
        for (user, item) in pairs {
            graph.add_interaction(user.as_ref(), item.as_ref())?;
        }
        Ok(graph)
    }

    /// Random bipartite graph with users `u0..` and items `k0..`.
    ///
    /// Every (user, item) pair is linked independently with probability
    /// `p_edge`. All users are inserted before all items, so user ids are
    /// `0..n_users` and item ids `n_users..n_users + n_items`.
    ///
    /// # Errors
    /// [`RecError::InvalidHyperparameter`] if `p_edge` is outside `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use aprender_rec::graph::{BipartiteGraph, GraphView, Partition};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let g = BipartiteGraph::random(10, 15, 0.2, &mut rng).expect("valid p_edge");
    /// assert_eq!(g.nodes_in(Partition::User).count(), 10);
    /// assert_eq!(g.nodes_in(Partition::Item).count(), 15);
    /// ```
    pub fn random<R: Rng + ?Sized>(
        n_users: usize,
        n_items: usize,
        p_edge: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&p_edge) {
            return Err(RecError::invalid_hyperparameter(
                "p_edge",
                p_edge,
                "a probability in [0, 1]",
            ));
        }

        let mut graph = Self::new();
        let users: Vec<NodeId> = (0..n_users)
            .map(|i| graph.add_node(&format!("u{i}"), Partition::User))
            .collect::<Result<_>>()?;
        let items: Vec<NodeId> = (0..n_items)
            .map(|j| graph.add_node(&format!("k{j}"), Partition::Item))
            .collect::<Result<_>>()?;

        for &user in &users {
            for &item in &items {
                if rng.gen_bool(p_edge) {
                    graph.add_edge(user, item)?;
                }
            }
        }
        Ok(graph)
    }

    /// Insert a node, or return the id of an existing node with this label.
    ///
    /// # Errors
    /// [`RecError::PartitionMismatch`] if the label already exists with the
    /// other partition tag; partitions never change once assigned.
    pub fn add_node(&mut self, label: &str, partition: Partition) -> Result<NodeId> {
        if let Some(&id) = self.label_to_id.get(label) {
            let actual = self.partitions[id];
            if actual != partition {
                return Err(RecError::PartitionMismatch {
                    node: label.to_string(),
                    expected: partition,
                    actual,
                });
            }
            return Ok(id);
        }

        let id = self.labels.len();
        self.adjacency.push(Vec::new());
        self.partitions.push(partition);
        self.labels.push(label.to_string());
        self.label_to_id.insert(label.to_string(), id);
        Ok(id)
    }

    /// Look up a node id by label.
    #[must_use]
    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.label_to_id.get(label).copied()
    }

    /// Look up a node id by label, failing if absent.
    ///
    /// # Errors
    /// [`RecError::InvalidNode`] if no node has this label.
    pub fn resolve(&self, label: &str) -> Result<NodeId> {
        self.node_id(label).ok_or_else(|| RecError::InvalidNode {
            node: label.to_string(),
        })
    }

    /// Get number of edges in graph.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.n_edges
    }

    /// Sorted neighbor slice of `v`. Empty for unknown nodes.
    #[must_use]
    pub fn neighbors(&self, v: NodeId) -> &[NodeId] {
        self.adjacency.get(v).map_or(&[], Vec::as_slice)
    }

    /// Check whether `user` and `item` are linked.
    #[must_use]
    pub fn has_edge(&self, user: NodeId, item: NodeId) -> bool {
        self.neighbors(user).binary_search(&item).is_ok()
    }

    /// Link `user` to `item`. Idempotent.
    ///
    /// Returns `true` if the edge was newly inserted.
    ///
    /// # Errors
    /// [`RecError::InvalidNode`] for unknown ids, [`RecError::PartitionMismatch`]
    /// if `user` is not a USER node or `item` is not an ITEM node.
    pub fn add_edge(&mut self, user: NodeId, item: NodeId) -> Result<bool> {
        self.check_endpoints(user, item)?;
        Ok(self.insert_edge(user, item))
    }

    /// Add an interaction by label, creating either node as needed.
    ///
    /// # Errors
    /// [`RecError::PartitionMismatch`] if a label exists on the wrong side.
    pub fn add_interaction(&mut self, user: &str, item: &str) -> Result<bool> {
        let u = self.add_node(user, Partition::User)?;
        let i = self.add_node(item, Partition::Item)?;
        Ok(self.insert_edge(u, i))
    }

    /// Unlink `user` from `item`.
    ///
    /// # Errors
    /// [`RecError::EdgeNotFound`] if the edge does not exist. Removal never
    /// succeeds silently on a missing edge.
    pub fn remove_edge(&mut self, user: NodeId, item: NodeId) -> Result<()> {
        self.check_endpoints(user, item)?;
        let pos_u = self.adjacency[user].binary_search(&item);
        let pos_i = self.adjacency[item].binary_search(&user);
        match (pos_u, pos_i) {
            (Ok(pu), Ok(pi)) => {
                self.adjacency[user].remove(pu);
                self.adjacency[item].remove(pi);
                self.n_edges -= 1;
                Ok(())
            }
            _ => Err(RecError::EdgeNotFound {
                user: self.labels[user].clone(),
                item: self.labels[item].clone(),
            }),
        }
    }

    /// Iterate all edges as `(user, item)` pairs, ordered by user then item.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes_in(Partition::User)
            .flat_map(move |u| self.neighbors(u).iter().map(move |&i| (u, i)))
    }

    /// Temporarily remove `(user, item)` for every `item`, run `f`, restore.
    ///
    /// The removed edges are re-inserted on every exit path: normal return,
    /// an error from `f`, a failed removal part-way through the mask, or a
    /// panic unwinding through `f`.
    ///
    /// # Errors
    /// [`RecError::EdgeNotFound`] if any masked edge is missing (nothing stays
    /// removed), otherwise whatever `f` returns.
    ///
    /// # Examples
    /// ```
    /// use aprender_rec::graph::BipartiteGraph;
    ///
    /// let mut g = BipartiteGraph::from_interactions([("u", "a"), ("u", "b")])
    ///     .expect("valid interactions");
    /// let (u, a) = (g.resolve("u").expect("u"), g.resolve("a").expect("a"));
    ///
    /// let seen = g.with_masked(u, &[a], |masked| Ok(masked.has_edge(u, a))).expect("edge exists");
    /// assert!(!seen);
    /// assert!(g.has_edge(u, a));
    /// ```
    pub fn with_masked<T, F>(&mut self, user: NodeId, items: &[NodeId], f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let mut guard = MaskGuard {
            graph: self,
            user,
            removed: Vec::with_capacity(items.len()),
        };
        for &item in items {
            guard.graph.remove_edge(user, item)?;
            guard.removed.push(item);
        }
        f(&*guard.graph)
    }

    fn check_endpoints(&self, user: NodeId, item: NodeId) -> Result<()> {
        self.require(user, Partition::User)?;
        self.require(item, Partition::Item)
    }

    // Endpoints must already be validated.
    fn insert_edge(&mut self, user: NodeId, item: NodeId) -> bool {
        match self.adjacency[user].binary_search(&item) {
            Ok(_) => false,
            Err(pos) => {
                self.adjacency[user].insert(pos, item);
                if let Err(pos) = self.adjacency[item].binary_search(&user) {
                    self.adjacency[item].insert(pos, user);
                }
                self.n_edges += 1;
                true
            }
        }
    }
}

impl GraphView for BipartiteGraph {
    fn num_nodes(&self) -> usize {
        self.labels.len()
    }

    fn partition(&self, v: NodeId) -> Option<Partition> {
        self.partitions.get(v).copied()
    }

    fn label(&self, v: NodeId) -> Option<&str> {
        self.labels.get(v).map(String::as_str)
    }

    fn neighbors(&self, v: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        BipartiteGraph::neighbors(self, v).iter().copied()
    }

    fn degree(&self, v: NodeId) -> usize {
        BipartiteGraph::neighbors(self, v).len()
    }
}

/// Restores masked edges when dropped.
struct MaskGuard<'g> {
    graph: &'g mut BipartiteGraph,
    user: NodeId,
    removed: Vec<NodeId>,
}

impl Drop for MaskGuard<'_> {
    fn drop(&mut self) {
        for &item in &self.removed {
            self.graph.insert_edge(self.user, item);
        }
    }
}

#[cfg(test)]
mod tests;
