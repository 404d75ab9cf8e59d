//! Item-to-item similarity from shared readers.
//!
//! Every function takes the two items' user-neighbor sets as **sorted,
//! deduplicated** slices and walks them with a two-pointer merge, so an
//! intersection costs O(|S1| + |S2|) with no allocation.
//!
//! | Method | Formula | Range |
//! |--------|---------|-------|
//! | Jaccard | \|S1 ∩ S2\| / \|S1 ∪ S2\| | [0, 1] |
//! | Overlap | \|S1 ∩ S2\| / min(\|S1\|, \|S2\|) | [0, 1] |
//! | Adamic–Adar | Σ 1/ln(deg(u)) over common u | [0, ∞) |
//! | Resource Allocation | Σ 1/deg(u) over common u | [0, ∞) |
//!
//! Degenerate inputs (empty sets, degree ≤ 1 for Adamic–Adar, degree 0 for
//! Resource Allocation) contribute `0.0` instead of failing.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RecError;
use crate::graph::NodeId;
use crate::neighbors::NeighborCache;

/// Call `f` for every element present in both sorted slices.
fn for_each_common(a: &[NodeId], b: &[NodeId], mut f: impl FnMut(NodeId)) {
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                f(a[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
}

/// Size of the intersection of two sorted slices.
#[must_use]
pub fn intersection_size(a: &[NodeId], b: &[NodeId]) -> usize {
    let mut count = 0;
    for_each_common(a, b, |_| count += 1);
    count
}

/// Jaccard similarity: |S1 ∩ S2| / |S1 ∪ S2|.
///
/// Returns `0.0` when both sets are empty.
///
/// # Examples
/// ```
/// use aprender_rec::similarity::jaccard_similarity;
///
/// assert_eq!(jaccard_similarity(&[1, 2, 3], &[1, 2, 3]), 1.0);
/// assert!((jaccard_similarity(&[1, 2, 3], &[1]) - 1.0 / 3.0).abs() < 1e-12);
/// assert_eq!(jaccard_similarity(&[], &[]), 0.0);
/// ```
#[must_use]
pub fn jaccard_similarity(users_a: &[NodeId], users_b: &[NodeId]) -> f64 {
    if users_a.is_empty() && users_b.is_empty() {
        return 0.0;
    }
    let common = intersection_size(users_a, users_b);
    let union = users_a.len() + users_b.len() - common;
    common as f64 / union as f64
}

/// Overlap coefficient: |S1 ∩ S2| / min(|S1|, |S2|).
///
/// Returns `0.0` if either set is empty.
///
/// # Examples
/// ```
/// use aprender_rec::similarity::overlap_coefficient;
///
/// assert_eq!(overlap_coefficient(&[1, 2, 3], &[1]), 1.0);
/// assert_eq!(overlap_coefficient(&[1, 2, 3], &[]), 0.0);
/// ```
#[must_use]
pub fn overlap_coefficient(users_a: &[NodeId], users_b: &[NodeId]) -> f64 {
    if users_a.is_empty() || users_b.is_empty() {
        return 0.0;
    }
    let common = intersection_size(users_a, users_b);
    common as f64 / users_a.len().min(users_b.len()) as f64
}

/// Adamic–Adar similarity: Σ 1/ln(deg(u)) over shared readers `u`.
///
/// `deg(u)` is the number of items `u` has read, taken from `cache`.
/// Readers with degree ≤ 1 are skipped (ln 1 = 0).
#[must_use]
pub fn adamic_adar_similarity(
    users_a: &[NodeId],
    users_b: &[NodeId],
    cache: &NeighborCache,
) -> f64 {
    let mut score = 0.0;
    for_each_common(users_a, users_b, |user| {
        let degree = cache.items_of(user).len();
        if degree > 1 {
            score += 1.0 / (degree as f64).ln();
        }
    });
    score
}

/// Resource Allocation similarity: Σ 1/deg(u) over shared readers `u`.
///
/// Readers with degree 0 are skipped.
#[must_use]
pub fn resource_allocation_similarity(
    users_a: &[NodeId],
    users_b: &[NodeId],
    cache: &NeighborCache,
) -> f64 {
    let mut score = 0.0;
    for_each_common(users_a, users_b, |user| {
        let degree = cache.items_of(user).len();
        if degree > 0 {
            score += 1.0 / degree as f64;
        }
    });
    score
}

/// Closed set of item-similarity functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    /// Jaccard index
    Jaccard,
    /// Overlap (Szymkiewicz–Simpson) coefficient
    Overlap,
    /// Adamic–Adar index
    AdamicAdar,
    /// Resource Allocation index
    ResourceAllocation,
}

impl SimilarityMethod {
    /// All similarity methods in canonical order.
    pub const ALL: [Self; 4] = [
        Self::Jaccard,
        Self::Overlap,
        Self::AdamicAdar,
        Self::ResourceAllocation,
    ];

    /// Get string name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jaccard => "jaccard",
            Self::Overlap => "overlap",
            Self::AdamicAdar => "adamic_adar",
            Self::ResourceAllocation => "resource_allocation",
        }
    }

    /// Similarity between two items, reading their reader sets from `cache`.
    ///
    /// Symmetric in `a` and `b`; items the cache does not know score `0.0`.
    #[must_use]
    pub fn score(self, a: NodeId, b: NodeId, cache: &NeighborCache) -> f64 {
        let users_a = cache.users_of(a);
        let users_b = cache.users_of(b);
        match self {
            Self::Jaccard => jaccard_similarity(users_a, users_b),
            Self::Overlap => overlap_coefficient(users_a, users_b),
            Self::AdamicAdar => adamic_adar_similarity(users_a, users_b, cache),
            Self::ResourceAllocation => resource_allocation_similarity(users_a, users_b, cache),
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMethod {
    type Err = RecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| RecError::UnknownMethod {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests;
