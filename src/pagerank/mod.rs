//! Personalized PageRank recommendation.
//!
//! A random walk over the whole interaction graph that restarts at the
//! target user with probability `1 - damping` at each step. The stationary
//! visit probability of each ITEM node is its relevance to the user. Unlike
//! [`crate::ranking::SimilarityRecommender`], this touches every node and
//! edge on every call, so its latency scales with the graph, not with the
//! user's neighborhood.
//!
//! Power iteration (Page et al. 1999) with Kahan summation (Higham 1993)
//! for both the inflow sums and the L1 convergence check. The graph is
//! treated as undirected: each edge carries `1/deg(u)` of `u`'s mass in each
//! direction. Mass on isolated nodes is returned to the seed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecError, Result};
use crate::graph::{GraphView, NodeId, Partition};
use crate::ranking::{top_k, validate_top_n, Recommendation, Recommender};

/// Power-iteration settings.
///
/// # Examples
///
/// ```
/// use aprender_rec::pagerank::PageRankConfig;
///
/// let config = PageRankConfig::new().with_damping(0.9).with_max_iter(200);
/// assert_eq!(config.damping, 0.9);
/// assert_eq!(config.max_iter, 200);
/// assert_eq!(config.tol, 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    /// Probability of following an edge rather than restarting, in (0, 1)
    pub damping: f64,
    /// Maximum power iterations
    pub max_iter: usize,
    /// Per-node tolerance; iteration stops once the L1 change is below `n * tol`
    pub tol: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iter: 100,
            tol: 1e-6,
        }
    }
}

impl PageRankConfig {
    /// Create a configuration with the defaults (0.85, 100, 1e-6).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set damping factor.
    #[must_use]
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set iteration cap.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    /// [`RecError::InvalidHyperparameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(RecError::invalid_hyperparameter(
                "damping",
                self.damping,
                "a fraction in (0, 1)",
            ));
        }
        if self.max_iter == 0 {
            return Err(RecError::invalid_hyperparameter(
                "max_iter",
                self.max_iter,
                "a positive integer",
            ));
        }
        if !(self.tol > 0.0) {
            return Err(RecError::invalid_hyperparameter(
                "tol",
                self.tol,
                "a positive number",
            ));
        }
        Ok(())
    }
}

/// Kahan summation for computing L1 distance between two vectors.
fn kahan_diff(a: &[f64], b: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0; // Compensation term

    for (ai, bi) in a.iter().zip(b.iter()) {
        let y = (ai - bi).abs() - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }

    sum
}

/// PageRank scores with all restart mass on `seed`.
///
/// Returns one score per node id; the scores sum to 1.
///
/// # Errors
/// [`RecError::InvalidNode`] if `seed` is absent, [`RecError::InvalidHyperparameter`]
/// for a bad `config`, [`RecError::ConvergenceFailure`] if the L1 change is
/// still above `n * tol` after `max_iter` iterations.
///
/// # Examples
/// ```
/// use aprender_rec::graph::BipartiteGraph;
/// use aprender_rec::pagerank::{personalized_pagerank, PageRankConfig};
///
/// let g = BipartiteGraph::from_interactions([("u", "a"), ("v", "a"), ("v", "b")])
///     .expect("valid");
/// let u = g.resolve("u").expect("u");
///
/// let pr = personalized_pagerank(&g, u, &PageRankConfig::default()).expect("converges");
/// assert!((pr.iter().sum::<f64>() - 1.0).abs() < 1e-9);
/// ```
pub fn personalized_pagerank<G: GraphView>(
    graph: &G,
    seed: NodeId,
    config: &PageRankConfig,
) -> Result<Vec<f64>> {
    config.validate()?;
    let n = graph.num_nodes();
    if seed >= n {
        return Err(RecError::InvalidNode {
            node: seed.to_string(),
        });
    }

    let damping = config.damping;
    let degrees: Vec<usize> = (0..n).map(|v| graph.degree(v)).collect();
    let mut ranks = vec![1.0 / n as f64; n];
    let mut new_ranks = vec![0.0; n];

    for iteration in 1..=config.max_iter {
        let dangling_sum: f64 = degrees
            .iter()
            .zip(&ranks)
            .filter(|(&d, _)| d == 0)
            .map(|(_, &r)| r)
            .sum();

        #[allow(clippy::needless_range_loop)]
        for v in 0..n {
            let mut sum = 0.0;
            let mut c = 0.0; // Kahan compensation term
            for u in graph.neighbors(v) {
                let y = ranks[u] / degrees[u] as f64 - c;
                let t = sum + y;
                c = (t - sum) - y;
                sum = t;
            }
            new_ranks[v] = damping * sum;
        }
        // Restart and dangling mass both go to the seed
        new_ranks[seed] += (1.0 - damping) + damping * dangling_sum;

        let diff = kahan_diff(&ranks, &new_ranks);
        std::mem::swap(&mut ranks, &mut new_ranks);
        if diff < n as f64 * config.tol {
            debug!(seed, iteration, diff, "personalized pagerank converged");
            return Ok(ranks);
        }
    }

    Err(RecError::ConvergenceFailure {
        iterations: config.max_iter,
    })
}

/// Recommender ranking unread items by personalized PageRank.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageRankRecommender {
    config: PageRankConfig,
}

impl PageRankRecommender {
    /// Create a recommender with `config`.
    #[must_use]
    pub fn new(config: PageRankConfig) -> Self {
        Self { config }
    }

    /// The power-iteration settings in use.
    #[must_use]
    pub fn config(&self) -> &PageRankConfig {
        &self.config
    }
}

impl Recommender for PageRankRecommender {
    fn recommend<G: GraphView>(
        &self,
        graph: &G,
        user: NodeId,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        validate_top_n(top_n)?;
        graph.require(user, Partition::User)?;

        let scores = personalized_pagerank(graph, user, &self.config)?;
        let read = graph.neighbors_of_partition(user, Partition::Item)?;
        let unread = graph
            .nodes_in(Partition::Item)
            .filter(|item| read.binary_search(item).is_err())
            .map(|item| (item, scores[item]));
        let recommendations = top_k(unread, top_n);

        debug!(
            user,
            damping = self.config.damping,
            read = read.len(),
            returned = recommendations.len(),
            "pagerank recommendation"
        );
        Ok(recommendations)
    }

    fn name(&self) -> &'static str {
        "pagerank"
    }
}
