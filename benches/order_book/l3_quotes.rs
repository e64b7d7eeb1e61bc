use criterion::{BenchmarkId, Criterion};
use pricelevel::Side;
use quotebook_rs::messages::{
    L3EntryNew, L3EntryUpdate, MarketEntry, PackageHeader, PackageType,
};
use quotebook_rs::{OrderBook, OrderBookOptions, QuoteLevels};
use rust_decimal::Decimal;
use std::hint::black_box;

fn l3_book(quotes: usize) -> OrderBook {
    let mut book = OrderBook::from_options(
        OrderBookOptions::new()
            .with_symbol("BENCH")
            .with_quote_levels(QuoteLevels::L3)
            .with_initial_depth(quotes)
            .with_max_depth(quotes * 2),
    )
    .unwrap();
    let snapshot = PackageHeader::new("BENCH", PackageType::VendorSnapshot).with_entries(
        (0..quotes).map(|index| {
            L3EntryNew::new(
                &format!("q{}", index),
                Side::Buy,
                Decimal::from(1000 - (index % 50) as i64),
                Decimal::from(10),
            )
        }),
    );
    book.update_package(&snapshot).unwrap();
    book
}

/// Register benchmarks for order-by-order books
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderBook - L3 Quotes");

    let add_cancel = PackageHeader::new("BENCH", PackageType::IncrementalUpdate).with_entries([
        MarketEntry::from(L3EntryNew::new(
            "bench",
            Side::Buy,
            Decimal::from(975),
            Decimal::from(5),
        )),
        MarketEntry::from(L3EntryUpdate::cancel("bench", Side::Buy)),
    ]);

    for quotes in [100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("add_cancel", quotes),
            quotes,
            |b, &quotes| {
                let mut book = l3_book(quotes);
                b.iter(|| black_box(book.update_package(&add_cancel).unwrap()))
            },
        );
    }

    group.finish();
}
