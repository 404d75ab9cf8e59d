//! Leave-out evaluation of recommenders.
//!
//! For each test user with read set `T`, a uniform sample `H ⊂ T` of size
//! `⌊|T| · test_size⌋` is held out: its edges are masked, the recommender is
//! timed on the masked graph, and the graph is restored. Then
//!
//! ```text
//! precision = |recommended ∩ T| / k
//! recall    = |recommended ∩ T| / |H|      (undefined when H is empty)
//! ```
//!
//! Since recommenders never return items the user still has an edge to,
//! every hit is a held-out item.
//!
//! Trials run one at a time on a mutable graph ([`evaluate_method`]), or
//! concurrently on per-trial [`MaskedGraph`] overlays of a shared graph
//! (`evaluate_method_parallel`, feature `parallel`).
//!
//! [`MaskedGraph`]: crate::graph::MaskedGraph
//!
//! # Examples
//!
//! ```
//! use aprender_rec::eval::{evaluate_method, sample_test_users, EvalConfig};
//! use aprender_rec::graph::BipartiteGraph;
//! use aprender_rec::Method;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut graph = BipartiteGraph::random(20, 30, 0.3, &mut rng).expect("valid p_edge");
//! let users = sample_test_users(&graph, 5, &mut rng).expect("enough users");
//!
//! let config = EvalConfig::new().with_k(5);
//! let report = evaluate_method(&mut graph, &users, Method::PageRank, &config, &mut rng)
//!     .expect("evaluation runs");
//!
//! assert_eq!(report.records.len(), 5);
//! assert!((0.0..=1.0).contains(&report.summary.mean_precision));
//! ```

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{RecError, Result};
use crate::graph::{BipartiteGraph, GraphView, NodeId, Partition};
use crate::method::Method;
use crate::ranking::{Recommendation, Recommender};

mod config;

pub use config::{EvalConfig, RestorePolicy};

/// Outcome of one masked trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Test user label
    pub user: String,
    /// Number of held-out items |H|
    pub held_out: usize,
    /// Recommended items that were in the user's full read set
    pub hits: usize,
    /// hits / k
    pub precision: f64,
    /// hits / |H|; `None` when nothing was held out
    pub recall: Option<f64>,
    /// Wall-clock time of the recommender call
    #[serde(with = "duration_secs")]
    pub execution_time: Duration,
}

/// Aggregate over all trials of one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSummary {
    /// Evaluated method
    pub method: Method,
    /// Number of trials
    pub users: usize,
    /// Mean precision over all trials
    pub mean_precision: f64,
    /// Mean recall over trials with a defined recall
    pub mean_recall: Option<f64>,
    /// Trials whose recall was undefined
    pub undefined_recall: usize,
    /// Mean recommender wall-clock time
    #[serde(with = "duration_secs")]
    pub mean_execution_time: Duration,
}

impl MethodSummary {
    /// Aggregate `records` of `method`.
    #[must_use]
    pub fn from_records(method: Method, records: &[TrialRecord]) -> Self {
        let users = records.len();
        let recalls: Vec<f64> = records.iter().filter_map(|r| r.recall).collect();

        let mean_precision = if users == 0 {
            0.0
        } else {
            records.iter().map(|r| r.precision).sum::<f64>() / users as f64
        };
        let mean_recall =
            (!recalls.is_empty()).then(|| recalls.iter().sum::<f64>() / recalls.len() as f64);
        let mean_execution_time = if users == 0 {
            Duration::ZERO
        } else {
            records.iter().map(|r| r.execution_time).sum::<Duration>() / users as u32
        };

        Self {
            method,
            users,
            mean_precision,
            mean_recall,
            undefined_recall: users - recalls.len(),
            mean_execution_time,
        }
    }
}

/// Summary plus the per-user log of one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Aggregate metrics
    pub summary: MethodSummary,
    /// One record per test user, in test-user order
    pub records: Vec<TrialRecord>,
}

impl EvaluationReport {
    fn new(method: Method, records: Vec<TrialRecord>) -> Self {
        let summary = MethodSummary::from_records(method, &records);
        info!(
            method = %method,
            users = summary.users,
            mean_precision = summary.mean_precision,
            mean_recall = ?summary.mean_recall,
            undefined_recall = summary.undefined_recall,
            mean_execution_time = ?summary.mean_execution_time,
            "method evaluated"
        );
        Self { summary, records }
    }
}

/// Uniform sample of `⌊|read| · test_size⌋` items, ascending.
///
/// `read` must be sorted so the sample depends only on the rng state.
pub fn held_out_sample<R: Rng + ?Sized>(
    read: &[NodeId],
    test_size: f64,
    rng: &mut R,
) -> Vec<NodeId> {
    let amount = (read.len() as f64 * test_size).floor() as usize;
    let mut sample: Vec<NodeId> = read.choose_multiple(rng, amount).copied().collect();
    sample.sort_unstable();
    sample
}

/// Uniform sample of `n` distinct USER nodes, in draw order.
///
/// # Errors
/// [`RecError::InvalidHyperparameter`] if the graph has fewer than `n` users.
pub fn sample_test_users<G: GraphView, R: Rng + ?Sized>(
    graph: &G,
    n: usize,
    rng: &mut R,
) -> Result<Vec<NodeId>> {
    let users: Vec<NodeId> = graph.nodes_in(Partition::User).collect();
    if n > users.len() {
        return Err(RecError::invalid_hyperparameter(
            "n_users",
            n,
            &format!("at most the {} users in the graph", users.len()),
        ));
    }
    Ok(users.choose_multiple(rng, n).copied().collect())
}

fn score_trial<G: GraphView>(
    graph: &G,
    user: NodeId,
    read: &[NodeId],
    held_out: &[NodeId],
    recommendations: &[Recommendation],
    k: usize,
    execution_time: Duration,
) -> TrialRecord {
    let recommended: HashSet<NodeId> = recommendations.iter().map(|r| r.item).collect();
    let hits = recommended
        .iter()
        .filter(|item| read.binary_search(item).is_ok())
        .count();

    let precision = hits as f64 / k as f64;
    let recall = if held_out.is_empty() {
        warn!(user, read = read.len(), "nothing held out, recall undefined");
        None
    } else {
        Some(hits as f64 / held_out.len() as f64)
    };

    debug!(
        user,
        held_out = held_out.len(),
        hits,
        precision,
        ?recall,
        ?execution_time,
        "trial scored"
    );

    TrialRecord {
        user: graph.label(user).unwrap_or_default().to_string(),
        held_out: held_out.len(),
        hits,
        precision,
        recall,
        execution_time,
    }
}

fn timed<R: Recommender, G: GraphView>(
    recommender: &R,
    graph: &G,
    user: NodeId,
    k: usize,
) -> Result<(Vec<Recommendation>, Duration)> {
    let start = Instant::now();
    let recommendations = recommender.recommend(graph, user, k)?;
    Ok((recommendations, start.elapsed()))
}

/// Run one masked trial for `user`.
///
/// Masks a held-out sample of the user's edges, times `recommender` on the
/// masked graph, restores the graph according to `config.restore`, and
/// scores the result.
///
/// # Errors
/// [`RecError::PartitionMismatch`] / [`RecError::InvalidNode`] for a bad
/// user, [`RecError::InvalidHyperparameter`] for a bad config, or any error
/// from the recommender. The held-out edges are restored in every case.
pub fn evaluate_user<R, Rn>(
    graph: &mut BipartiteGraph,
    user: NodeId,
    recommender: &R,
    config: &EvalConfig,
    rng: &mut Rn,
) -> Result<TrialRecord>
where
    R: Recommender,
    Rn: Rng + ?Sized,
{
    config.validate()?;
    graph.require(user, Partition::User)?;

    let read = graph.neighbors(user).to_vec();
    let held_out = held_out_sample(&read, config.test_size, rng);

    let (recommendations, elapsed) = graph.with_masked(user, &held_out, |masked| {
        timed(recommender, masked, user, config.k)
    })?;

    if config.restore == RestorePolicy::HeldOutAndRecommended {
        for r in &recommendations {
            if graph.add_edge(user, r.item)? {
                debug!(user, item = r.item, "recommended item linked to user");
            }
        }
    }

    Ok(score_trial(
        &*graph,
        user,
        &read,
        &held_out,
        &recommendations,
        config.k,
        elapsed,
    ))
}

/// Evaluate `method` over `users`, one trial at a time.
///
/// A user whose held-out sample is empty is recorded with undefined recall
/// and does not stop the batch. Any other error aborts the run.
///
/// # Errors
/// See [`evaluate_user`].
pub fn evaluate_method<Rn: Rng + ?Sized>(
    graph: &mut BipartiteGraph,
    users: &[NodeId],
    method: Method,
    config: &EvalConfig,
    rng: &mut Rn,
) -> Result<EvaluationReport> {
    config.validate()?;
    let recommender = method.recommender(config.pagerank);
    let records = users
        .iter()
        .map(|&user| evaluate_user(&mut *graph, user, &recommender, config, &mut *rng))
        .collect::<Result<Vec<_>>>()?;
    Ok(EvaluationReport::new(method, records))
}

/// Evaluate several methods over the same users.
///
/// Each method samples from a fresh `StdRng` seeded with `config.seed` and
/// starts from the graph as passed in, so every method is scored on
/// identical held-out sets.
///
/// Under [`RestorePolicy::HeldOutAndRecommended`] each method runs on its
/// own copy of `graph`; edges healed by one method are never seen by the
/// next, and `graph` itself is left unchanged.
///
/// # Errors
/// See [`evaluate_user`].
pub fn evaluate_methods(
    graph: &mut BipartiteGraph,
    users: &[NodeId],
    methods: &[Method],
    config: &EvalConfig,
) -> Result<Vec<EvaluationReport>> {
    methods
        .iter()
        .map(|&method| {
            let mut rng = StdRng::seed_from_u64(config.seed);
            match config.restore {
                RestorePolicy::HeldOut => {
                    evaluate_method(&mut *graph, users, method, config, &mut rng)
                }
                RestorePolicy::HeldOutAndRecommended => {
                    let mut working = graph.clone();
                    evaluate_method(&mut working, users, method, config, &mut rng)
                }
            }
        })
        .collect()
}

/// Evaluate `method` over `users` concurrently.
///
/// Held-out samples are drawn up front, in user order, from a `StdRng`
/// seeded with `config.seed`, so they match what [`evaluate_method`] draws
/// from the same seed. Each trial then reads the shared graph through its
/// own [`MaskedGraph`]; the graph is never mutated.
///
/// [`MaskedGraph`]: crate::graph::MaskedGraph
///
/// # Errors
/// [`RecError::InvalidHyperparameter`] if `config.restore` is not
/// [`RestorePolicy::HeldOut`] (adding edges needs exclusive access), plus
/// everything [`evaluate_user`] can return.
#[cfg(feature = "parallel")]
pub fn evaluate_method_parallel(
    graph: &BipartiteGraph,
    users: &[NodeId],
    method: Method,
    config: &EvalConfig,
) -> Result<EvaluationReport> {
    use crate::graph::MaskedGraph;
    use rayon::prelude::*;

    config.validate()?;
    if config.restore != RestorePolicy::HeldOut {
        return Err(RecError::invalid_hyperparameter(
            "restore",
            format!("{:?}", config.restore),
            "HeldOut for parallel evaluation",
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let plans = users
        .iter()
        .map(|&user| {
            graph.require(user, Partition::User)?;
            let read = graph.neighbors(user).to_vec();
            let held_out = held_out_sample(&read, config.test_size, &mut rng);
            Ok((user, read, held_out))
        })
        .collect::<Result<Vec<_>>>()?;

    let recommender = method.recommender(config.pagerank);
    let records = plans
        .par_iter()
        .map(|(user, read, held_out)| {
            let view = MaskedGraph::new(graph, *user, held_out)?;
            let (recommendations, elapsed) = timed(&recommender, &view, *user, config.k)?;
            Ok(score_trial(
                graph,
                *user,
                read,
                held_out,
                &recommendations,
                config.k,
                elapsed,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EvaluationReport::new(method, records))
}

/// Serialize a [`Duration`] as fractional seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
