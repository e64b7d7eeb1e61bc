use super::{l2_book, ladder};
use criterion::{BenchmarkId, Criterion};
use pricelevel::Side;
use quotebook_rs::BookType;
use quotebook_rs::messages::{ExchangeId, L2EntryUpdate, PackageHeader, PackageType};
use rust_decimal::Decimal;
use std::hint::black_box;

const EXCHANGES: [&str; 4] = ["XNAS", "BATS", "ARCA", "EDGX"];

/// Register benchmarks for aggregated and consolidated books
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderBook - Multi Exchange");

    for book_type in [BookType::Aggregated, BookType::Consolidated] {
        let ids: Vec<ExchangeId> = EXCHANGES
            .iter()
            .map(|code| ExchangeId::from_code(code).unwrap())
            .collect();
        let snapshots: Vec<PackageHeader> = ids.iter().map(|&id| ladder(20, id)).collect();

        group.bench_with_input(
            BenchmarkId::new("four_exchange_snapshots", book_type),
            &book_type,
            |b, &book_type| {
                let mut book = l2_book(book_type, 200);
                b.iter(|| {
                    for snapshot in &snapshots {
                        black_box(book.update_package(snapshot).unwrap());
                    }
                })
            },
        );

        let updates: Vec<PackageHeader> = ids
            .iter()
            .enumerate()
            .map(|(level, &id)| {
                PackageHeader::new("BENCH", PackageType::IncrementalUpdate).with_entry(
                    L2EntryUpdate::update(Side::Sell, level, Decimal::from(7 + level as i64), 2)
                        .with_exchange_id(id),
                )
            })
            .collect();
        group.bench_with_input(
            BenchmarkId::new("book_level_updates", book_type),
            &book_type,
            |b, &book_type| {
                let mut book = l2_book(book_type, 200);
                for snapshot in &snapshots {
                    book.update_package(snapshot).unwrap();
                }
                b.iter(|| {
                    for update in &updates {
                        black_box(book.update_package(update).unwrap());
                    }
                })
            },
        );
    }

    group.finish();
}
