//! Aggregated and consolidated books fed by two exchanges

use pricelevel::Side;
use quotebook_rs::messages::{
    BookResetEntry, DataModelType, ExchangeId, L2EntryNew, L2EntryUpdate, MarketEntry,
    PackageHeader, PackageType,
};
use quotebook_rs::{BookType, OrderBook, OrderBookOptions, QuoteLevels};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn create_book(book_type: BookType) -> OrderBook {
    OrderBook::from_options(
        OrderBookOptions::new()
            .with_symbol("IBM")
            .with_quote_levels(QuoteLevels::L2)
            .with_book_type(book_type)
            .with_initial_depth(16)
            .with_initial_exchanges_pool_size(2),
    )
    .unwrap()
}

fn ten_bids(code: &str) -> Vec<MarketEntry> {
    let exchange_id = ExchangeId::from_code(code).unwrap();
    (0..10)
        .map(|level| {
            L2EntryNew::new(Side::Buy, level, Decimal::from(100 - level as i64), dec!(5))
                .with_number_of_orders(1)
                .with_exchange_id(exchange_id)
                .into()
        })
        .collect()
}

fn feed_two_exchanges(book: &mut OrderBook) {
    for code in ["XNAS", "BATS"] {
        let snapshot =
            PackageHeader::new("IBM", PackageType::VendorSnapshot).with_entries(ten_bids(code));
        assert!(book.update(&snapshot.into()).unwrap());
    }
}

#[cfg(test)]
mod multi_exchange_scenario_tests {
    use super::*;

    #[test]
    fn test_aggregated_merges_equal_prices() {
        let mut book = create_book(BookType::Aggregated);
        feed_two_exchanges(&mut book);

        let bids = book.get_market_side(Side::Buy);
        assert_eq!(bids.depth(), 10);
        assert!(bids.iter().all(|quote| quote.size() == dec!(10)));
        assert!(bids.iter().all(|quote| quote.exchange_id().is_null()));
        assert_eq!(book.get_exchanges().len(), 2);
    }

    #[test]
    fn test_consolidated_keeps_every_quote() {
        let mut book = create_book(BookType::Consolidated);
        feed_two_exchanges(&mut book);

        let bids = book.get_market_side(Side::Buy);
        assert_eq!(bids.depth(), 20);
        assert!(bids.is_ordered());
        // Arrival order at equal prices.
        let xnas = ExchangeId::from_code("XNAS").unwrap();
        assert_eq!(bids.get_quote(0).exchange_id(), xnas);
    }

    #[test]
    fn test_exchange_reset_leaves_other_exchange() {
        for book_type in [BookType::Aggregated, BookType::Consolidated] {
            let mut book = create_book(book_type);
            feed_two_exchanges(&mut book);
            let bats = ExchangeId::from_code("BATS").unwrap();

            let reset = PackageHeader::new("IBM", PackageType::IncrementalUpdate)
                .with_entry(BookResetEntry::new(bats, DataModelType::Level2));
            assert!(book.update(&reset.into()).unwrap());

            let bids = book.get_market_side(Side::Buy);
            assert_eq!(bids.depth(), 10, "{}", book_type);
            assert_eq!(bids.total_size(), dec!(50), "{}", book_type);
            assert!(book.get_exchange(bats).unwrap().is_waiting_for_snapshot());
        }
    }

    #[test]
    fn test_aggregated_level_disappears_with_last_contributor() {
        let mut book = create_book(BookType::Aggregated);
        feed_two_exchanges(&mut book);
        for code in ["XNAS", "BATS"] {
            let delete = PackageHeader::new("IBM", PackageType::IncrementalUpdate).with_entry(
                L2EntryUpdate::delete(Side::Buy, 0)
                    .with_exchange_id(ExchangeId::from_code(code).unwrap()),
            );
            assert!(book.update(&delete.into()).unwrap());
        }
        let bids = book.get_market_side(Side::Buy);
        assert_eq!(bids.depth(), 9);
        assert_eq!(bids.best_quote().unwrap().price(), dec!(99));
    }

    #[test]
    fn test_reset_all_clears_book() {
        let mut book = create_book(BookType::Consolidated);
        feed_two_exchanges(&mut book);
        let reset = PackageHeader::new("IBM", PackageType::IncrementalUpdate)
            .with_entry(BookResetEntry::new(ExchangeId::NULL, DataModelType::Max));
        assert!(book.update(&reset.into()).unwrap());
        assert!(book.is_empty());
        assert!(book.get_exchanges().iter().all(|exchange| exchange.is_waiting_for_snapshot()));
    }
}
