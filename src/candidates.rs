//! Two-hop candidate generation.
//!
//! Only items that share at least one reader with something the target user
//! has read can score above zero, so scoring is restricted to the items read
//! by the user's co-readers instead of the whole catalog.

use std::collections::BTreeSet;

use crate::graph::NodeId;
use crate::neighbors::NeighborCache;

/// Items read by any co-reader of `user`, minus the items `user` has read.
///
/// `read` must be the user's read set as seen by `cache`. The result is in
/// ascending id order, which fixes the iteration order used for scoring.
///
/// # Examples
/// ```
/// use aprender_rec::candidates::candidate_items;
/// use aprender_rec::graph::BipartiteGraph;
/// use aprender_rec::neighbors::NeighborCache;
///
/// let g = BipartiteGraph::from_interactions([("me", "a"), ("you", "a"), ("you", "b")])
///     .expect("valid");
/// let cache = NeighborCache::build(&g).expect("consistent graph");
/// let me = g.resolve("me").expect("me");
///
/// let candidates = candidate_items(&cache, me, cache.items_of(me));
/// assert_eq!(candidates, vec![g.resolve("b").expect("b")]);
/// ```
#[must_use]
pub fn candidate_items(cache: &NeighborCache, user: NodeId, read: &[NodeId]) -> Vec<NodeId> {
    let mut candidates = BTreeSet::new();
    for &book in read {
        for &co_reader in cache.users_of(book) {
            if co_reader == user {
                continue;
            }
            candidates.extend(cache.items_of(co_reader).iter().copied());
        }
    }
    candidates
        .into_iter()
        .filter(|item| read.binary_search(item).is_err())
        .collect()
}
