use super::{l2_book, ladder};
use criterion::{BenchmarkId, Criterion};
use quotebook_rs::BookType;
use quotebook_rs::messages::ExchangeId;
use std::hint::black_box;

/// Register benchmarks applying full snapshots
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderBook - Snapshots");

    for depth in [10, 50, 200].iter() {
        let package = ladder(*depth, ExchangeId::NULL);

        // Same-size snapshots overwrite levels in place
        group.bench_with_input(
            BenchmarkId::new("repeat_snapshot", depth),
            depth,
            |b, &depth| {
                let mut book = l2_book(BookType::SingleExchange, depth);
                b.iter(|| black_box(book.update_package(&package).unwrap()))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("fresh_book_snapshot", depth),
            depth,
            |b, &depth| {
                b.iter(|| {
                    let mut book = l2_book(BookType::SingleExchange, depth);
                    black_box(book.update_package(&package).unwrap())
                })
            },
        );
    }

    group.finish();
}
