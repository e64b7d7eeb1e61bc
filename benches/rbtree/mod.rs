use criterion::{BenchmarkId, Criterion};
use quotebook_rs::rbtree::{NaturalOrder, RBTree};
use std::hint::black_box;

/// Register benchmarks for the pooled red-black tree
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("RBTree");

    for size in [100usize, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("put_remove", size), size, |b, &size| {
            let mut tree: RBTree<usize, usize> = RBTree::with_capacity(size);
            b.iter(|| {
                for key in 0..size {
                    tree.put(key.wrapping_mul(2_654_435_761) % size, key);
                }
                for key in 0..size {
                    black_box(tree.remove(&key));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("get", size), size, |b, &size| {
            let tree: RBTree<usize, usize> = RBTree::build_from_sorted(
                (0..size).map(|key| (key, key)),
                NaturalOrder,
            )
            .unwrap();
            b.iter(|| {
                for key in 0..size {
                    black_box(tree.get(&key));
                }
            })
        });
    }

    group.finish();
}
