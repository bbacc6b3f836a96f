//! Performance benchmarks for submission and storyline traversal.
//!
//! Run with: `cargo bench --bench storyline`
//!
//! | Operation | Cost | Notes |
//! |-----------|------|-------|
//! | Submit under a deep tip | O(depth) | Branch gate walks the ancestors |
//! | Storyline | O(depth) | Parent-link walk |
//! | Snapshot | O(n log n) | Sorted rows + xxh64 |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::thread;

use storyshare_kernel::{
    AuthorId, AuthorRegistry, ContentId, ContributionGraph, StoryShare, StorySnapshot,
};

const AUTHORS: [&str; 3] = ["a", "b", "c"];

fn registry() -> AuthorRegistry {
    let mut authors = AuthorRegistry::new();
    for id in AUTHORS {
        authors
            .create(AuthorId::from(id), id, ContentId::from("pic"))
            .unwrap();
    }
    authors
}

/// A single storyline of `depth` contributions below the root.
fn linear_graph(depth: usize, authors: &mut AuthorRegistry) -> (ContributionGraph, ContentId) {
    let mut graph = ContributionGraph::new(ContentId::from("c0"), AuthorId::from("a"));
    for i in 1..=depth {
        graph
            .submit(
                ContentId::from(format!("c{i}")),
                &ContentId::from(format!("c{}", i - 1)),
                &AuthorId::from(AUTHORS[i % AUTHORS.len()]),
                authors,
            )
            .unwrap();
    }
    (graph, ContentId::from(format!("c{depth}")))
}

/// Benchmark a submission under the tip of a deep storyline.
fn bench_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_at_depth");

    for depth in [10, 100, 1_000] {
        let mut authors = registry();
        let (graph, tip) = linear_graph(depth, &mut authors);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("depth", depth), &graph, |b, graph| {
            b.iter_batched(
                || (graph.clone(), authors.clone()),
                |(mut graph, mut authors)| {
                    graph
                        .submit(
                            ContentId::from("next"),
                            black_box(&tip),
                            &AuthorId::from("c"),
                            &mut authors,
                        )
                        .unwrap()
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark root-to-tip traversal.
fn bench_storyline(c: &mut Criterion) {
    let mut group = c.benchmark_group("storyline");

    for depth in [10, 100, 1_000] {
        let mut authors = registry();
        let (graph, tip) = linear_graph(depth, &mut authors);

        group.bench_with_input(BenchmarkId::new("depth", depth), &graph, |b, graph| {
            b.iter(|| graph.storyline(black_box(&tip)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("leader", depth), &graph, |b, graph| {
            b.iter(|| graph.storyline_leader(black_box(&tip)).unwrap())
        });
    }

    group.finish();
}

/// Benchmark snapshot fingerprinting.
fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for depth in [100, 1_000] {
        let mut authors = registry();
        let (graph, _) = linear_graph(depth, &mut authors);

        group.throughput(Throughput::Elements(depth as u64 + 1));
        group.bench_with_input(BenchmarkId::new("contributions", depth), &graph, |b, graph| {
            b.iter(|| StorySnapshot::compute(black_box(graph)).unwrap())
        });
    }

    group.finish();
}

/// Benchmark concurrent readers against the shared platform.
fn bench_platform_readers(c: &mut Criterion) {
    let mut group = c.benchmark_group("platform_readers");

    let platform = StoryShare::new();
    for id in AUTHORS {
        platform
            .create_author(AuthorId::from(id), id, ContentId::from("pic"))
            .unwrap();
    }
    let story = platform
        .create_story(AuthorId::from("a"), ContentId::from("c0"), "t", "s", "g")
        .unwrap();
    for i in 1..=200 {
        platform
            .contribute(
                &story,
                &AuthorId::from(AUTHORS[i % AUTHORS.len()]),
                ContentId::from(format!("c{i}")),
                &ContentId::from(format!("c{}", i - 1)),
            )
            .unwrap();
    }
    let tip = ContentId::from("c200");

    for num_threads in [1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            &num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let platform = platform.clone();
                            let story = story.clone();
                            let tip = tip.clone();
                            thread::spawn(move || platform.storyline(&story, &tip).unwrap().len())
                        })
                        .collect();
                    handles.into_iter().map(|h| h.join().unwrap()).sum::<usize>()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_submit,
    bench_storyline,
    bench_snapshot,
    bench_platform_readers,
);
criterion_main!(benches);
