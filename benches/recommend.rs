use aprender_rec::eval::{evaluate_method, sample_test_users, EvalConfig};
use aprender_rec::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn generate_graph(n_users: usize, n_items: usize) -> BipartiteGraph {
    let mut rng = StdRng::seed_from_u64(42);
    // Roughly ten reads per user regardless of catalog size
    let p_edge = (10.0 / n_items as f64).min(1.0);
    BipartiteGraph::random(n_users, n_items, p_edge, &mut rng).expect("p_edge in [0, 1]")
}

fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    for size in [100, 1_000, 5_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| generate_graph(black_box(size), black_box(size * 2)));
        });
    }

    group.finish();
}

fn bench_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    group.sample_size(30); // PageRank iterates over the whole graph

    for size in [100, 1_000].iter() {
        let graph = generate_graph(*size, size * 2);
        let user = graph.resolve("u0").expect("u0 exists");

        for method in Method::ALL {
            let recommender = method.recommender(PageRankConfig::default());
            group.bench_with_input(BenchmarkId::new(method.as_str(), size), size, |b, _| {
                b.iter(|| {
                    recommender
                        .recommend(&graph, black_box(user), black_box(15))
                        .expect("u0 is a user")
                });
            });
        }
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut graph = generate_graph(500, 1_000);
    let mut rng = StdRng::seed_from_u64(7);
    let users = sample_test_users(&graph, 20, &mut rng).expect("enough users");
    let config = EvalConfig::new();

    c.bench_function("evaluate_jaccard_20_users", |b| {
        b.iter(|| {
            evaluate_method(
                &mut graph,
                black_box(&users),
                Method::Similarity(SimilarityMethod::Jaccard),
                &config,
                &mut rng,
            )
            .expect("should succeed")
        });
    });
}

criterion_group!(benches, bench_build_graph, bench_recommend, bench_evaluate);
criterion_main!(benches);
