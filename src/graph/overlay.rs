//! Per-trial exclusion overlay over a shared graph.

use std::collections::BTreeSet;

use super::{BipartiteGraph, GraphView, NodeId, Partition};
use crate::error::{RecError, Result};

/// A borrowed [`BipartiteGraph`] with one user's edges to a set of items
/// hidden.
///
/// The base graph is never mutated, so any number of overlays can be read
/// concurrently from different threads.
///
/// # Examples
/// ```
/// use aprender_rec::graph::{BipartiteGraph, GraphView, MaskedGraph};
///
/// let g = BipartiteGraph::from_interactions([("u", "a"), ("u", "b")]).expect("valid");
/// let (u, a) = (g.resolve("u").expect("u"), g.resolve("a").expect("a"));
///
/// let view = MaskedGraph::new(&g, u, &[a]).expect("edge exists");
/// assert_eq!(view.degree(u), 1);
/// assert_eq!(g.degree(u), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MaskedGraph<'g> {
    base: &'g BipartiteGraph,
    user: NodeId,
    masked: BTreeSet<NodeId>,
}

impl<'g> MaskedGraph<'g> {
    /// Hide the edges `(user, item)` for every `item`.
    ///
    /// # Errors
    /// [`RecError::EdgeNotFound`] if any of those edges is not in `base`.
    pub fn new(base: &'g BipartiteGraph, user: NodeId, items: &[NodeId]) -> Result<Self> {
        base.require(user, Partition::User)?;
        let mut masked = BTreeSet::new();
        for &item in items {
            base.require(item, Partition::Item)?;
            if !base.has_edge(user, item) || !masked.insert(item) {
                return Err(RecError::EdgeNotFound {
                    user: base.label(user).unwrap_or_default().to_string(),
                    item: base.label(item).unwrap_or_default().to_string(),
                });
            }
        }
        Ok(Self { base, user, masked })
    }

    /// The user whose edges are hidden.
    #[must_use]
    pub fn user(&self) -> NodeId {
        self.user
    }

    /// Check whether `(u, v)` is an edge in this view.
    #[must_use]
    pub fn has_edge(&self, user: NodeId, item: NodeId) -> bool {
        self.base.has_edge(user, item) && !self.is_masked(user, item)
    }

    fn is_masked(&self, a: NodeId, b: NodeId) -> bool {
        (a == self.user && self.masked.contains(&b)) || (b == self.user && self.masked.contains(&a))
    }
}

impl GraphView for MaskedGraph<'_> {
    fn num_nodes(&self) -> usize {
        self.base.num_nodes()
    }

    fn partition(&self, v: NodeId) -> Option<Partition> {
        self.base.partition(v)
    }

    fn label(&self, v: NodeId) -> Option<&str> {
        self.base.label(v)
    }

    fn neighbors(&self, v: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.base
            .neighbors(v)
            .iter()
            .copied()
            .filter(move |&w| !self.is_masked(v, w))
    }
}
