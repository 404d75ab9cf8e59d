//! Similarity-based Top-N recommendation.
//!
//! For a target user with read set `R`, every two-hop candidate `c` is
//! scored by profile aggregation:
//!
//! ```text
//! score(c) = Σ_{b ∈ R} sim(b, c)
//! ```
//!
//! Summing (rather than taking the max or mean) lets a candidate related to
//! several read items outrank one strongly related to a single item.
//! Candidates with a non-positive aggregate are dropped and the best
//! `top_n` are kept with a bounded heap.
//!
//! # Examples
//!
//! ```
//! use aprender_rec::graph::BipartiteGraph;
//! use aprender_rec::ranking::{Recommender, SimilarityRecommender};
//! use aprender_rec::similarity::SimilarityMethod;
//!
//! let g = BipartiteGraph::from_interactions([
//!     ("alice", "dune"),
//!     ("bob", "dune"),
//!     ("bob", "hyperion"),
//!     ("carol", "hyperion"),
//!     ("carol", "emma"),
//! ])
//! .expect("valid interactions");
//!
//! let alice = g.resolve("alice").expect("alice");
//! let recs = SimilarityRecommender::new(SimilarityMethod::Jaccard)
//!     .recommend(&g, alice, 5)
//!     .expect("alice is a user");
//!
//! assert_eq!(recs.len(), 1);
//! assert_eq!(recs[0].item, g.resolve("hyperion").expect("hyperion"));
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidates::candidate_items;
use crate::error::{RecError, Result};
use crate::graph::{GraphView, NodeId, Partition};
use crate::neighbors::NeighborCache;
use crate::similarity::SimilarityMethod;

/// A recommended item and its relevance score (higher is better).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommended ITEM node
    pub item: NodeId,
    /// Relevance score, ≥ 0
    pub score: f64,
}

impl Recommendation {
    /// Label of the recommended item in `graph`.
    #[must_use]
    pub fn label<'g, G: GraphView>(&self, graph: &'g G) -> Option<&'g str> {
        graph.label(self.item)
    }
}

/// Trait for Top-N recommenders.
///
/// Implementations are stateless across calls: everything derived from the
/// graph is rebuilt (or explicitly passed in) per call.
pub trait Recommender {
    /// Recommend up to `top_n` items `user` has not read, best first.
    ///
    /// # Errors
    /// [`RecError::InvalidNode`] / [`RecError::PartitionMismatch`] if `user`
    /// is not a USER node, [`RecError::InvalidHyperparameter`] if `top_n` is 0.
    fn recommend<G: GraphView>(
        &self,
        graph: &G,
        user: NodeId,
        top_n: usize,
    ) -> Result<Vec<Recommendation>>;

    /// Get algorithm name
    fn name(&self) -> &'static str;
}

/// Heap entry ordered so that "greater" means "ranks higher":
/// larger score first, then smaller node id.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    score: f64,
    item: NodeId,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.item.cmp(&self.item))
    }
}

/// Select the `k` best `(item, score)` pairs without sorting the whole input.
///
/// Runs in O(n log k). Output is ordered by descending score; equal scores
/// are ordered by ascending node id, so the result is fully determined by
/// the input multiset.
///
/// # Examples
/// ```
/// use aprender_rec::ranking::top_k;
///
/// let best = top_k([(4, 0.5), (2, 0.9), (7, 0.5), (1, 0.1)], 3);
/// let items: Vec<_> = best.iter().map(|r| r.item).collect();
/// assert_eq!(items, vec![2, 4, 7]);
/// ```
#[must_use]
pub fn top_k<I>(scored: I, k: usize) -> Vec<Recommendation>
where
    I: IntoIterator<Item = (NodeId, f64)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(k + 1);
    for (item, score) in scored {
        let entry = Ranked { score, item };
        if heap.len() < k {
            heap.push(Reverse(entry));
        } else if heap.peek().is_some_and(|Reverse(worst)| entry > *worst) {
            heap.pop();
            heap.push(Reverse(entry));
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(r)| Recommendation {
            item: r.item,
            score: r.score,
        })
        .collect()
}

pub(crate) fn validate_top_n(top_n: usize) -> Result<()> {
    if top_n == 0 {
        return Err(RecError::invalid_hyperparameter(
            "top_n",
            top_n,
            "a positive integer",
        ));
    }
    Ok(())
}

/// Item-similarity recommender over two-hop candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityRecommender {
    method: SimilarityMethod,
}

impl SimilarityRecommender {
    /// Create a recommender scoring candidates with `method`.
    #[must_use]
    pub fn new(method: SimilarityMethod) -> Self {
        Self { method }
    }

    /// The similarity function in use.
    #[must_use]
    pub fn method(&self) -> SimilarityMethod {
        self.method
    }

    /// Recommend from a prebuilt cache.
    ///
    /// Lets a caller amortize [`NeighborCache::build`] across many users of
    /// an unchanged graph. `user` is not validated against the graph here;
    /// an id the cache does not know as a user simply has nothing read and
    /// gets an empty list.
    ///
    /// # Errors
    /// [`RecError::InvalidHyperparameter`] if `top_n` is 0.
    pub fn recommend_with_cache(
        &self,
        cache: &NeighborCache,
        user: NodeId,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        validate_top_n(top_n)?;

        let read = cache.items_of(user);
        if read.is_empty() {
            debug!(user, method = %self.method, "user has no read items");
            return Ok(Vec::new());
        }

        let candidates = candidate_items(cache, user, read);
        let scored = candidates.iter().filter_map(|&candidate| {
            let score: f64 = read
                .iter()
                .map(|&book| self.method.score(book, candidate, cache))
                .sum();
            (score > 0.0).then_some((candidate, score))
        });
        let recommendations = top_k(scored, top_n);

        debug!(
            user,
            method = %self.method,
            read = read.len(),
            candidates = candidates.len(),
            returned = recommendations.len(),
            "similarity recommendation"
        );
        Ok(recommendations)
    }
}

impl Recommender for SimilarityRecommender {
    fn recommend<G: GraphView>(
        &self,
        graph: &G,
        user: NodeId,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        validate_top_n(top_n)?;
        graph.require(user, Partition::User)?;
        let cache = NeighborCache::build(graph)?;
        self.recommend_with_cache(&cache, user, top_n)
    }

    fn name(&self) -> &'static str {
        self.method.as_str()
    }
}
