pub mod incremental;
pub mod l3_quotes;
pub mod multi_exchange;
pub mod snapshots;

use pricelevel::Side;
use quotebook_rs::messages::{ExchangeId, L2EntryNew, PackageHeader, PackageType};
use quotebook_rs::{BookType, OrderBook, OrderBookOptions, QuoteLevels};
use rust_decimal::Decimal;

pub fn register_benchmarks(c: &mut criterion::Criterion) {
    snapshots::register_benchmarks(c);
    incremental::register_benchmarks(c);
    multi_exchange::register_benchmarks(c);
    l3_quotes::register_benchmarks(c);
}

pub(crate) fn l2_book(book_type: BookType, max_depth: usize) -> OrderBook {
    OrderBook::from_options(
        OrderBookOptions::new()
            .with_symbol("BENCH")
            .with_quote_levels(QuoteLevels::L2)
            .with_book_type(book_type)
            .with_initial_depth(max_depth)
            .with_max_depth(max_depth)
            .with_initial_exchanges_pool_size(4),
    )
    .unwrap()
}

/// Both sides of a `depth`-level ladder around 1000 for one exchange.
pub(crate) fn ladder(depth: usize, exchange_id: ExchangeId) -> PackageHeader {
    let mut package = PackageHeader::new("BENCH", PackageType::VendorSnapshot);
    for level in 0..depth {
        let offset = Decimal::from(level as i64);
        package = package
            .with_entry(
                L2EntryNew::new(Side::Buy, level, Decimal::from(999) - offset, Decimal::from(10))
                    .with_number_of_orders(3)
                    .with_exchange_id(exchange_id),
            )
            .with_entry(
                L2EntryNew::new(Side::Sell, level, Decimal::from(1001) + offset, Decimal::from(10))
                    .with_number_of_orders(3)
                    .with_exchange_id(exchange_id),
            );
    }
    package
}
