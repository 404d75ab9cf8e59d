//! Tests for the bipartite graph.

use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn library() -> BipartiteGraph {
    BipartiteGraph::from_interactions([
        ("u1", "x"),
        ("u2", "x"),
        ("u3", "x"),
        ("u1", "y"),
        ("u2", "y"),
        ("u3", "y"),
        ("u1", "z"),
    ])
    .expect("valid interactions")
}

fn id(g: &BipartiteGraph, label: &str) -> NodeId {
    g.resolve(label).expect("label exists")
}

#[test]
fn test_empty_graph() {
    let g = BipartiteGraph::new();
    assert_eq!(g.num_nodes(), 0);
    assert_eq!(g.num_edges(), 0);
    assert_eq!(g.edges().count(), 0);
}

#[test]
fn test_from_interactions_tags_partitions() {
    let g = library();
    assert_eq!(g.num_nodes(), 6);
    assert_eq!(g.num_edges(), 7);
    assert_eq!(g.partition(id(&g, "u1")), Some(Partition::User));
    assert_eq!(g.partition(id(&g, "z")), Some(Partition::Item));
}

#[test]
fn test_duplicate_interactions_collapse() {
    let g = BipartiteGraph::from_interactions([("u", "a"), ("u", "a")]).expect("valid");
    assert_eq!(g.num_edges(), 1);
    assert_eq!(g.neighbors(id(&g, "u")), &[id(&g, "a")]);
}

#[test]
fn test_neighbors_sorted() {
    let g = library();
    let u1 = id(&g, "u1");
    let ns = g.neighbors(u1);
    assert_eq!(ns.len(), 3);
    assert!(ns.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_neighbors_of_partition() {
    let g = library();
    let x = id(&g, "x");
    let users = g
        .neighbors_of_partition(x, Partition::User)
        .expect("x exists");
    assert_eq!(users, vec![id(&g, "u1"), id(&g, "u2"), id(&g, "u3")]);

    let items = g
        .neighbors_of_partition(x, Partition::Item)
        .expect("x exists");
    assert!(items.is_empty());
}

#[test]
fn test_neighbors_of_partition_invalid_node() {
    let g = library();
    let err = g
        .neighbors_of_partition(999, Partition::Item)
        .expect_err("node 999 is absent");
    assert!(matches!(err, RecError::InvalidNode { .. }));
}

#[test]
fn test_partition_is_immutable() {
    let mut g = library();
    let err = g
        .add_node("u1", Partition::Item)
        .expect_err("u1 is a user");
    assert!(matches!(
        err,
        RecError::PartitionMismatch {
            expected: Partition::Item,
            actual: Partition::User,
            ..
        }
    ));
    // Same tag is a lookup, not an insert
    assert_eq!(g.add_node("u1", Partition::User).expect("same tag"), id(&g, "u1"));
}

#[test]
fn test_add_edge_rejects_same_partition() {
    let mut g = library();
    let (u1, u2) = (id(&g, "u1"), id(&g, "u2"));
    assert!(matches!(
        g.add_edge(u1, u2),
        Err(RecError::PartitionMismatch { .. })
    ));

    let (x, y) = (id(&g, "x"), id(&g, "y"));
    assert!(matches!(
        g.add_edge(x, y),
        Err(RecError::PartitionMismatch { .. })
    ));
    assert_eq!(g.num_edges(), 7);
}

#[test]
fn test_add_edge_is_idempotent() {
    let mut g = library();
    let (u3, z) = (id(&g, "u3"), id(&g, "z"));
    assert!(g.add_edge(u3, z).expect("valid endpoints"));
    assert!(!g.add_edge(u3, z).expect("valid endpoints"));
    assert_eq!(g.num_edges(), 8);
    assert!(g.has_edge(u3, z));
    assert!(g.neighbors(z).contains(&u3));
}

#[test]
fn test_add_edge_unknown_node() {
    let mut g = library();
    assert!(matches!(
        g.add_edge(0, 999),
        Err(RecError::InvalidNode { .. })
    ));
}

#[test]
fn test_remove_edge() {
    let mut g = library();
    let (u1, z) = (id(&g, "u1"), id(&g, "z"));
    g.remove_edge(u1, z).expect("edge exists");
    assert!(!g.has_edge(u1, z));
    assert!(g.neighbors(z).is_empty());
    assert_eq!(g.num_edges(), 6);
}

#[test]
fn test_remove_missing_edge_fails_loudly() {
    let mut g = library();
    let (u2, z) = (id(&g, "u2"), id(&g, "z"));
    let err = g.remove_edge(u2, z).expect_err("u2 never read z");
    match err {
        RecError::EdgeNotFound { user, item } => {
            assert_eq!(user, "u2");
            assert_eq!(item, "z");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(g.num_edges(), 7);
}

#[test]
fn test_edges_iterates_each_edge_once() {
    let g = library();
    let edges: Vec<_> = g.edges().collect();
    assert_eq!(edges.len(), g.num_edges());
    for (u, i) in edges {
        assert_eq!(g.partition(u), Some(Partition::User));
        assert_eq!(g.partition(i), Some(Partition::Item));
    }
}

#[test]
fn test_with_masked_hides_and_restores() {
    let mut g = library();
    let before = g.clone();
    let (u1, x, z) = (id(&g, "u1"), id(&g, "x"), id(&g, "z"));

    let degree_during = g
        .with_masked(u1, &[x, z], |masked| {
            assert!(!masked.has_edge(u1, x));
            assert!(!masked.has_edge(u1, z));
            Ok(masked.degree(u1))
        })
        .expect("edges exist");

    assert_eq!(degree_during, 1);
    assert_eq!(g, before);
}

#[test]
fn test_with_masked_restores_on_closure_error() {
    let mut g = library();
    let before = g.clone();
    let (u1, x) = (id(&g, "u1"), id(&g, "x"));

    let result: Result<()> = g.with_masked(u1, &[x], |_| {
        Err(RecError::UnknownMethod {
            name: "cosine".to_string(),
        })
    });

    assert!(matches!(result, Err(RecError::UnknownMethod { .. })));
    assert_eq!(g, before);
}

#[test]
fn test_with_masked_rolls_back_partial_mask() {
    let mut g = library();
    let before = g.clone();
    let (u2, x, z) = (id(&g, "u2"), id(&g, "x"), id(&g, "z"));

    // (u2, x) is removed first, then (u2, z) fails
    let result = g.with_masked(u2, &[x, z], |_| Ok(()));

    assert!(matches!(result, Err(RecError::EdgeNotFound { .. })));
    assert_eq!(g, before);
}

#[test]
fn test_with_masked_restores_on_panic() {
    let mut g = library();
    let before = g.clone();
    let (u1, x) = (id(&g, "u1"), id(&g, "x"));

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = g.with_masked(u1, &[x], |_| -> Result<()> { panic!("scoring blew up") });
    }));

    assert!(outcome.is_err());
    assert_eq!(g, before);
}

#[test]
fn test_masked_graph_view() {
    let g = library();
    let (u1, u2, x, y) = (id(&g, "u1"), id(&g, "u2"), id(&g, "x"), id(&g, "y"));

    let view = MaskedGraph::new(&g, u1, &[x]).expect("edge exists");
    assert_eq!(view.user(), u1);
    assert!(!view.has_edge(u1, x));
    assert!(view.has_edge(u1, y));
    assert!(view.has_edge(u2, x));
    assert!(!GraphView::neighbors(&view, x).any(|w| w == u1));
    assert_eq!(view.degree(x), 2);
    // Base graph untouched
    assert!(g.has_edge(u1, x));
}

#[test]
fn test_masked_graph_rejects_missing_edge() {
    let g = library();
    let (u2, z) = (id(&g, "u2"), id(&g, "z"));
    assert!(matches!(
        MaskedGraph::new(&g, u2, &[z]),
        Err(RecError::EdgeNotFound { .. })
    ));
}

#[test]
fn test_masked_graph_rejects_duplicate_item() {
    let g = library();
    let (u1, x) = (id(&g, "u1"), id(&g, "x"));
    assert!(matches!(
        MaskedGraph::new(&g, u1, &[x, x]),
        Err(RecError::EdgeNotFound { .. })
    ));
}

#[test]
fn test_random_graph_is_bipartite() {
    let mut rng = StdRng::seed_from_u64(42);
    let g = BipartiteGraph::random(10, 15, 0.3, &mut rng).expect("valid p_edge");
    assert_eq!(g.num_nodes(), 25);
    assert!(g.num_edges() > 0);
    for (u, i) in g.edges() {
        assert!(u < 10);
        assert!((10..25).contains(&i));
    }
}

#[test]
fn test_random_graph_is_reproducible() {
    let a = BipartiteGraph::random(8, 8, 0.5, &mut StdRng::seed_from_u64(3)).expect("valid");
    let b = BipartiteGraph::random(8, 8, 0.5, &mut StdRng::seed_from_u64(3)).expect("valid");
    assert_eq!(a, b);
}

#[test]
fn test_random_graph_rejects_bad_probability() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        BipartiteGraph::random(2, 2, 1.5, &mut rng),
        Err(RecError::InvalidHyperparameter { .. })
    ));
}
