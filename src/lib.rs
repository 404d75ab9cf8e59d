//! Aprender-rec: graph-based item recommendation on bipartite user/item
//! interaction graphs, with an offline leave-out evaluation harness.
//!
//! # Quick Start
//!
//! ```
//! use aprender_rec::prelude::*;
//!
//! let graph = BipartiteGraph::from_interactions([
//!     ("ana", "dune"),
//!     ("ana", "solaris"),
//!     ("ben", "dune"),
//!     ("ben", "hyperion"),
//!     ("cy", "solaris"),
//!     ("cy", "hyperion"),
//!     ("cy", "emma"),
//! ])
//! .expect("valid interactions");
//!
//! let ana = graph.resolve("ana").expect("ana exists");
//! let recs = "resource_allocation"
//!     .parse::<Method>()
//!     .expect("known method")
//!     .recommender(PageRankConfig::default())
//!     .recommend(&graph, ana, 2)
//!     .expect("ana is a user");
//!
//! // hyperion is shared with both of ana's co-readers
//! assert_eq!(recs[0].label(&graph), Some("hyperion"));
//! ```
//!
//! # Modules
//!
//! - [`graph`]: Bipartite graph, read-only [`graph::GraphView`], masking overlay
//! - [`similarity`]: Jaccard, overlap, Adamic–Adar, Resource Allocation
//! - [`neighbors`]: Call-scoped item→users / user→items caches
//! - [`candidates`]: Two-hop candidate generation
//! - [`ranking`]: Profile-aggregated Top-N with bounded-heap selection
//! - [`pagerank`]: Personalized PageRank recommender
//! - [`eval`]: Masked trials, precision/recall/latency, per-method summaries
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (`debug` per call and trial, `info`
//! per method summary, `warn` on undefined recall) and never installs a
//! subscriber.

pub mod candidates;
pub mod error;
pub mod eval;
pub mod graph;
mod method;
pub mod neighbors;
pub mod pagerank;
pub mod ranking;
pub mod similarity;

pub use error::{RecError, Result};
pub use method::{recommend_by_name, Method, MethodRecommender};
pub use similarity::SimilarityMethod;

/// Convenience re-exports for common use.
pub mod prelude {
    pub use crate::error::{RecError, Result};
    pub use crate::eval::{
        evaluate_method, evaluate_methods, sample_test_users, EvalConfig, EvaluationReport,
        MethodSummary, RestorePolicy, TrialRecord,
    };
    pub use crate::graph::{BipartiteGraph, GraphView, MaskedGraph, NodeId, Partition};
    pub use crate::method::{Method, MethodRecommender};
    pub use crate::pagerank::{PageRankConfig, PageRankRecommender};
    pub use crate::ranking::{Recommendation, Recommender, SimilarityRecommender};
    pub use crate::similarity::SimilarityMethod;
}
