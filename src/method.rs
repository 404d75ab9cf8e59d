//! Closed catalog of recommendation methods.
//!
//! Method names arrive as strings from configuration and reporting; they are
//! parsed once into [`Method`] and dispatched with an exhaustive `match`
//! from then on. Unrecognized names fail with [`RecError::UnknownMethod`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RecError, Result};
use crate::graph::{BipartiteGraph, GraphView, NodeId};
use crate::pagerank::{PageRankConfig, PageRankRecommender};
use crate::ranking::{Recommendation, Recommender, SimilarityRecommender};
use crate::similarity::SimilarityMethod;

/// A recommendation method.
///
/// # Examples
///
/// ```
/// use aprender_rec::{Method, SimilarityMethod};
///
/// let m: Method = "adamic_adar".parse().expect("known method");
/// assert_eq!(m, Method::Similarity(SimilarityMethod::AdamicAdar));
/// assert!("cosine".parse::<Method>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    /// Two-hop candidates scored by summed item similarity
    Similarity(SimilarityMethod),
    /// Personalized PageRank over the whole graph
    PageRank,
}

impl Method {
    /// All methods in canonical order.
    pub const ALL: [Self; 5] = [
        Self::Similarity(SimilarityMethod::Jaccard),
        Self::Similarity(SimilarityMethod::Overlap),
        Self::Similarity(SimilarityMethod::AdamicAdar),
        Self::Similarity(SimilarityMethod::ResourceAllocation),
        Self::PageRank,
    ];

    /// Get string name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Similarity(m) => m.as_str(),
            Self::PageRank => "pagerank",
        }
    }

    /// Build the recommender for this method.
    ///
    /// `pagerank` is only read by [`Method::PageRank`].
    #[must_use]
    pub fn recommender(self, pagerank: PageRankConfig) -> MethodRecommender {
        match self {
            Self::Similarity(m) => MethodRecommender::Similarity(SimilarityRecommender::new(m)),
            Self::PageRank => MethodRecommender::PageRank(PageRankRecommender::new(pagerank)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| RecError::UnknownMethod {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for Method {
    type Error = RecError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Method> for String {
    fn from(m: Method) -> Self {
        m.as_str().to_string()
    }
}

/// Recommender for any [`Method`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MethodRecommender {
    /// Similarity family
    Similarity(SimilarityRecommender),
    /// Personalized PageRank
    PageRank(PageRankRecommender),
}

impl Recommender for MethodRecommender {
    fn recommend<G: GraphView>(
        &self,
        graph: &G,
        user: NodeId,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        match self {
            Self::Similarity(r) => r.recommend(graph, user, top_n),
            Self::PageRank(r) => r.recommend(graph, user, top_n),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Similarity(r) => r.name(),
            Self::PageRank(r) => r.name(),
        }
    }
}

/// Recommend for the user labelled `user` with the method named `method`.
///
/// The method name is resolved before the graph is touched, so an unknown
/// name never yields a partial result.
///
/// # Errors
/// [`RecError::UnknownMethod`], [`RecError::InvalidNode`], or anything the
/// chosen recommender raises.
///
/// # Examples
/// ```
/// use aprender_rec::graph::BipartiteGraph;
/// use aprender_rec::recommend_by_name;
///
/// let g = BipartiteGraph::from_interactions([("u", "a"), ("v", "a"), ("v", "b")])
///     .expect("valid");
/// let recs = recommend_by_name(&g, "u", "jaccard", 5).expect("valid request");
/// assert_eq!(recs[0].label(&g), Some("b"));
/// ```
pub fn recommend_by_name(
    graph: &BipartiteGraph,
    user: &str,
    method: &str,
    top_n: usize,
) -> Result<Vec<Recommendation>> {
    let method: Method = method.parse()?;
    let user = graph.resolve(user)?;
    method
        .recommender(PageRankConfig::default())
        .recommend(graph, user, top_n)
}
