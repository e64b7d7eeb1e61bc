use super::{l2_book, ladder};
use criterion::{BenchmarkId, Criterion};
use pricelevel::Side;
use quotebook_rs::BookType;
use quotebook_rs::messages::{
    ExchangeId, L2EntryNew, L2EntryUpdate, MarketEntry, PackageHeader, PackageType,
};
use rust_decimal::Decimal;
use std::hint::black_box;

/// Register benchmarks for incremental L2 updates on a single exchange
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderBook - Incremental L2");

    let update = PackageHeader::new("BENCH", PackageType::IncrementalUpdate)
        .with_entry(L2EntryUpdate::update(Side::Buy, 0, Decimal::from(12), 4));
    group.bench_function("update_top_level", |b| {
        let mut book = l2_book(BookType::SingleExchange, 50);
        book.update_package(&ladder(50, ExchangeId::NULL)).unwrap();
        b.iter(|| black_box(book.update_package(&update).unwrap()))
    });

    // Insert at the top then delete it again, keeping the book shape stable
    let churn = PackageHeader::new("BENCH", PackageType::IncrementalUpdate).with_entries([
        MarketEntry::from(L2EntryNew::new(
            Side::Sell,
            0,
            Decimal::from(1000),
            Decimal::from(1),
        )),
        MarketEntry::from(L2EntryUpdate::delete(Side::Sell, 0)),
    ]);
    for depth in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("insert_delete_top", depth),
            depth,
            |b, &depth| {
                let mut book = l2_book(BookType::SingleExchange, depth + 1);
                book.update_package(&ladder(depth, ExchangeId::NULL)).unwrap();
                b.iter(|| black_box(book.update_package(&churn).unwrap()))
            },
        );
    }

    group.finish();
}
