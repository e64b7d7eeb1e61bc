//! Single-exchange L2 scenarios driven through the public `OrderBook` API

use pricelevel::Side;
use quotebook_rs::messages::{L2EntryNew, L2EntryUpdate, PackageHeader, PackageType};
use quotebook_rs::{GapMode, OrderBook, OrderBookOptions, QuoteLevels};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn create_book(max_depth: usize) -> OrderBook {
    OrderBook::from_options(
        OrderBookOptions::new()
            .with_symbol("ES")
            .with_quote_levels(QuoteLevels::L2)
            .with_initial_depth(16)
            .with_max_depth(max_depth),
    )
    .unwrap()
}

fn ask_ladder() -> PackageHeader {
    PackageHeader::new("ES", PackageType::VendorSnapshot).with_entries((0..10).map(|level| {
        L2EntryNew::new(Side::Sell, level, Decimal::from(40 + level), dec!(5))
            .with_number_of_orders(25)
    }))
}

#[cfg(test)]
mod l2_scenario_tests {
    use super::*;

    #[test]
    fn test_insert_at_top_of_full_side_keeps_depth() {
        let mut book = create_book(10);
        assert!(book.update(&ask_ladder().into()).unwrap());
        assert_eq!(book.get_market_side(Side::Sell).depth(), 10);

        let insert = PackageHeader::new("ES", PackageType::IncrementalUpdate)
            .with_entry(L2EntryNew::new(Side::Sell, 0, dec!(39), dec!(5)));
        assert!(book.update(&insert.into()).unwrap());
        let asks = book.get_market_side(Side::Sell);
        assert_eq!(asks.depth(), 10);
        assert_eq!(asks.best_quote().unwrap().price(), dec!(39));
        assert_eq!(asks.worst_quote().unwrap().price(), dec!(48));

        let delete = PackageHeader::new("ES", PackageType::IncrementalUpdate)
            .with_entry(L2EntryUpdate::delete(Side::Sell, 0));
        assert!(book.update(&delete.into()).unwrap());
        let asks = book.get_market_side(Side::Sell);
        assert_eq!(asks.depth(), 9);
        assert_eq!(asks.best_quote().unwrap().price(), dec!(40));
    }

    #[test]
    fn test_level_addresses_shift_on_insert() {
        let mut book = create_book(10);
        book.update(&ask_ladder().into()).unwrap();

        let package = PackageHeader::new("ES", PackageType::IncrementalUpdate)
            .with_entry(L2EntryNew::new(Side::Sell, 2, dec!(41.5), dec!(1)))
            .with_entry(L2EntryUpdate::update(Side::Sell, 3, dec!(9), 9));
        assert!(book.update(&package.into()).unwrap());

        let asks = book.get_market_side(Side::Sell);
        assert_eq!(asks.get_quote(2).price(), dec!(41.5));
        assert_eq!(asks.get_quote(3).price(), dec!(42));
        assert_eq!(asks.get_quote(3).size(), dec!(9));
        assert!(asks.is_strictly_ordered());
    }

    #[test]
    fn test_snapshot_recovers_after_drop() {
        let mut book = OrderBook::from_options(
            OrderBookOptions::new()
                .with_symbol("ES")
                .with_quote_levels(QuoteLevels::L2)
                .with_gap_mode(GapMode::SkipAndDrop)
                .with_wait_for_snapshot_after_drop(true)
                .with_initial_depth(16)
                .with_max_depth(10),
        )
        .unwrap();
        book.update(&ask_ladder().into()).unwrap();

        let gap = PackageHeader::new("ES", PackageType::IncrementalUpdate)
            .with_entry(L2EntryNew::new(Side::Buy, 4, dec!(30), dec!(1)));
        assert!(!book.update(&gap.into()).unwrap());
        assert!(book.is_empty());
        assert!(book.is_waiting_for_snapshot());

        assert!(book.update(&ask_ladder().into()).unwrap());
        assert_eq!(book.get_market_side(Side::Sell).depth(), 10);
        assert!(!book.is_waiting_for_snapshot());
    }

    #[test]
    fn test_snapshot_view() {
        let mut book = create_book(10);
        book.update(&ask_ladder().into()).unwrap();
        let bid = PackageHeader::new("ES", PackageType::IncrementalUpdate)
            .with_entry(L2EntryNew::new(Side::Buy, 0, dec!(38), dec!(2)));
        book.update(&bid.into()).unwrap();

        let snapshot = book.snapshot(3);
        assert_eq!(snapshot.asks.len(), 3);
        assert_eq!(snapshot.bids.len(), 1);
        assert_eq!(snapshot.spread(), Some(dec!(2)));
        assert_eq!(snapshot.total_ask_volume(), dec!(15));

        let json = snapshot.to_json().unwrap();
        let restored = quotebook_rs::OrderBookSnapshot::from_json(&json).unwrap();
        assert_eq!(restored.asks, snapshot.asks);
    }
}
