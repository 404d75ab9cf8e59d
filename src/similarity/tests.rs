use super::*;
use crate::graph::{BipartiteGraph, GraphView};

const EPS: f64 = 1e-12;

/// Items x, y read by u1..u3; z read by u1 only; w read by u4 only.
/// u4 also reads v so that its degree is 2.
fn shelf() -> (BipartiteGraph, NeighborCache) {
    let g = BipartiteGraph::from_interactions([
        ("u1", "x"),
        ("u2", "x"),
        ("u3", "x"),
        ("u1", "y"),
        ("u2", "y"),
        ("u3", "y"),
        ("u1", "z"),
        ("u4", "w"),
        ("u4", "v"),
    ])
    .expect("valid interactions");
    let cache = NeighborCache::build(&g).expect("consistent graph");
    (g, cache)
}

fn item(g: &BipartiteGraph, label: &str) -> NodeId {
    g.resolve(label).expect("label exists")
}

#[test]
fn test_jaccard_identical_sets() {
    let (g, cache) = shelf();
    let (x, y) = (item(&g, "x"), item(&g, "y"));
    assert!((jaccard_similarity(cache.users_of(x), cache.users_of(y)) - 1.0).abs() < EPS);
}

#[test]
fn test_jaccard_subset() {
    let (g, cache) = shelf();
    let (x, z) = (item(&g, "x"), item(&g, "z"));
    let sim = jaccard_similarity(cache.users_of(x), cache.users_of(z));
    assert!((sim - 1.0 / 3.0).abs() < EPS);
}

#[test]
fn test_overlap_subset_is_one() {
    let (g, cache) = shelf();
    let (x, z) = (item(&g, "x"), item(&g, "z"));
    let sim = overlap_coefficient(cache.users_of(x), cache.users_of(z));
    assert!((sim - 1.0).abs() < EPS);
}

#[test]
fn test_empty_sets() {
    assert_eq!(jaccard_similarity(&[], &[]), 0.0);
    assert_eq!(jaccard_similarity(&[1], &[]), 0.0);
    assert_eq!(overlap_coefficient(&[], &[1, 2]), 0.0);
    assert_eq!(overlap_coefficient(&[], &[]), 0.0);
}

#[test]
fn test_intersection_size() {
    assert_eq!(intersection_size(&[1, 3, 5, 7], &[2, 3, 4, 7, 9]), 2);
    assert_eq!(intersection_size(&[], &[1]), 0);
}

#[test]
fn test_adamic_adar_hand_computed() {
    let (g, cache) = shelf();
    let (x, z) = (item(&g, "x"), item(&g, "z"));
    // Only u1 is shared; u1 reads x, y, z
    let expected = 1.0 / 3.0_f64.ln();
    let sim = adamic_adar_similarity(cache.users_of(x), cache.users_of(z), &cache);
    assert!((sim - expected).abs() < EPS);
}

#[test]
fn test_adamic_adar_skips_degree_one() {
    let g = BipartiteGraph::from_interactions([("solo", "a"), ("other", "a"), ("other", "b")])
        .expect("valid");
    let cache = NeighborCache::build(&g).expect("consistent graph");
    let a = item(&g, "a");
    // Self-pair: shared readers are solo (degree 1, skipped) and other (degree 2)
    let sim = adamic_adar_similarity(cache.users_of(a), cache.users_of(a), &cache);
    assert!((sim - 1.0 / 2.0_f64.ln()).abs() < EPS);
    assert!(sim.is_finite());
}

#[test]
fn test_resource_allocation_hand_computed() {
    let (g, cache) = shelf();
    let (x, y) = (item(&g, "x"), item(&g, "y"));
    // u1 has degree 3, u2 and u3 degree 2
    let expected = 1.0 / 3.0 + 1.0 / 2.0 + 1.0 / 2.0;
    let sim = resource_allocation_similarity(cache.users_of(x), cache.users_of(y), &cache);
    assert!((sim - expected).abs() < EPS);
}

#[test]
fn test_disjoint_sets_score_zero_for_every_method() {
    let (g, cache) = shelf();
    let (x, w) = (item(&g, "x"), item(&g, "w"));
    for method in SimilarityMethod::ALL {
        assert_eq!(method.score(x, w, &cache), 0.0, "{method}");
    }
}

#[test]
fn test_every_method_is_symmetric() {
    let (g, cache) = shelf();
    let items: Vec<NodeId> = g.nodes_in(crate::graph::Partition::Item).collect();
    for method in SimilarityMethod::ALL {
        for &a in &items {
            for &b in &items {
                assert_eq!(method.score(a, b, &cache), method.score(b, a, &cache), "{method}");
            }
        }
    }
}

#[test]
fn test_method_round_trips_through_name() {
    for method in SimilarityMethod::ALL {
        assert_eq!(method.as_str().parse::<SimilarityMethod>().expect("known"), method);
    }
}

#[test]
fn test_unknown_method_name() {
    let err = "cosine"
        .parse::<SimilarityMethod>()
        .expect_err("cosine is not supported");
    assert!(matches!(err, RecError::UnknownMethod { ref name } if name == "cosine"));

    // pagerank is a ranking method, not an item similarity
    assert!("pagerank".parse::<SimilarityMethod>().is_err());
}
