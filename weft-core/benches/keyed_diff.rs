//! Benchmarks for the keyed children diff and the LIS pass behind it.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weft_core::renderer::{longest_increasing_subsequence, MemNodeId, MemoryHost, Renderer, VNode};

fn list(keys: &[usize]) -> VNode<MemNodeId> {
    VNode::element("ul").with_children(
        keys.iter()
            .map(|&k| VNode::element("li").with_key(k).with_text(k.to_string()))
            .collect(),
    )
}

/// Deterministic shuffle so runs are comparable.
fn scrambled(n: usize) -> Vec<usize> {
    let mut keys: Vec<usize> = (0..n).collect();
    let mut state = 0x9e37_79b9_7f4a_7c15u64;
    for i in (1..n).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        keys.swap(i, (state % (i as u64 + 1)) as usize);
    }
    keys
}

fn bench_lis(c: &mut Criterion) {
    let mut group = c.benchmark_group("lis");
    for n in [100usize, 1_000, 10_000] {
        let values: Vec<usize> = scrambled(n).into_iter().map(|v| v + 1).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| longest_increasing_subsequence(black_box(values)))
        });
    }
    group.finish();
}

fn bench_keyed_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_patch");
    for n in [100usize, 1_000] {
        let ordered: Vec<usize> = (0..n).collect();
        let shuffled = scrambled(n);
        let mut reversed = ordered.clone();
        reversed.reverse();

        for (name, next) in [("shuffle", &shuffled), ("reverse", &reversed)] {
            group.bench_with_input(BenchmarkId::new(name, n), next, |b, next| {
                b.iter(|| {
                    let mut host = MemoryHost::new();
                    let container = host.create_container("root");
                    let renderer = Renderer::new(host);
                    let mut root = renderer.create_root(container);
                    root.render(list(&ordered));
                    root.render(list(black_box(next)));
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_lis, bench_keyed_patch);
criterion_main!(benches);
