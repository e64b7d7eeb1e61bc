//! Books built from JSON options

use pricelevel::Side;
use quotebook_rs::messages::{L1Entry, PackageHeader, PackageType};
use quotebook_rs::{BookType, OrderBook, OrderBookError, OrderBookOptions, QuoteLevels};
use rust_decimal_macros::dec;

#[cfg(test)]
mod configuration_tests {
    use super::*;

    #[test]
    fn test_book_from_json_options() {
        let options = OrderBookOptions::from_json(
            r#"{
                "symbol": "EURUSD",
                "quote_levels": "L2",
                "book_type": "CONSOLIDATED",
                "update_mode": "NON_WAITING_FOR_SNAPSHOT",
                "initial_depth": 32,
                "max_depth": 64
            }"#,
        )
        .unwrap();
        let book = OrderBook::from_options(options).unwrap();
        assert_eq!(book.get_description(), "L2/Consolidated");
        assert_eq!(book.get_book_type(), BookType::Consolidated);
        assert!(!book.is_waiting_for_snapshot());
        assert_eq!(book.options().max_depth, 64);
    }

    #[test]
    fn test_unsupported_json_configuration() {
        let options =
            OrderBookOptions::from_json(r#"{"quote_levels": "L1", "book_type": "AGGREGATED"}"#)
                .unwrap();
        match OrderBook::from_options(options) {
            Err(err @ OrderBookError::UnsupportedConfiguration { .. }) => {
                assert_eq!(
                    err.to_string(),
                    "Unsupported configuration: L1 quotes with Aggregated book"
                );
            }
            other => panic!("unexpected result {:?}", other.map(|book| book.get_description())),
        }
    }

    #[test]
    fn test_default_options_build_top_of_book() {
        let mut book = OrderBook::from_options(OrderBookOptions::default()).unwrap();
        assert_eq!(book.get_quote_levels(), QuoteLevels::L1);

        let snapshot = PackageHeader::new("ANY", PackageType::VendorSnapshot)
            .with_entry(L1Entry::new(Side::Buy, dec!(1.0841), dec!(1000000)))
            .with_entry(L1Entry::new(Side::Sell, dec!(1.0843), dec!(2000000)));
        assert!(book.update(&snapshot.into()).unwrap());
        assert_eq!(book.best_bid().unwrap().price(), dec!(1.0841));
        assert_eq!(book.snapshot(10).spread(), Some(dec!(0.0002)));
    }
}
