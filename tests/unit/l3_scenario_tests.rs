//! Order-by-order book driven through the public `OrderBook` API

use pricelevel::Side;
use quotebook_rs::messages::{
    InsertType, L3EntryNew, L3EntryUpdate, MarketEntry, PackageHeader, PackageType,
};
use quotebook_rs::orderbook::Processor;
use quotebook_rs::{EntryValidationCode, OrderBook, OrderBookOptions, QuoteLevels};
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

fn create_book() -> (OrderBook, Arc<Mutex<Vec<EntryValidationCode>>>) {
    let codes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&codes);
    let book = OrderBook::from_options(
        OrderBookOptions::new()
            .with_symbol("VOD")
            .with_quote_levels(QuoteLevels::L3)
            .with_initial_depth(16)
            .with_max_depth(100),
    )
    .unwrap()
    .with_error_listener(move |_: &PackageHeader, code: EntryValidationCode| {
        sink.lock().unwrap().push(code)
    });
    (book, codes)
}

fn incremental(entries: Vec<MarketEntry>) -> PackageHeader {
    PackageHeader::new("VOD", PackageType::IncrementalUpdate).with_entries(entries)
}

fn ask_ids(book: &OrderBook) -> Vec<String> {
    book.get_market_side(Side::Sell)
        .iter()
        .filter_map(|quote| quote.quote_id().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod l3_scenario_tests {
    use super::*;

    #[test]
    fn test_queue_life_cycle() {
        let (mut book, codes) = create_book();
        let snapshot = PackageHeader::new("VOD", PackageType::VendorSnapshot).with_entries([
            L3EntryNew::new("s1", Side::Sell, dec!(72.10), dec!(500)),
            L3EntryNew::new("s2", Side::Sell, dec!(72.10), dec!(200)),
            L3EntryNew::new("s3", Side::Sell, dec!(72.20), dec!(100)),
            L3EntryNew::new("b1", Side::Buy, dec!(72.00), dec!(300)),
        ]);
        assert!(book.update(&snapshot.into()).unwrap());
        assert_eq!(ask_ids(&book), ["s1", "s2", "s3"]);

        let changes = incremental(vec![
            L3EntryNew::new("s4", Side::Sell, dec!(72.10), dec!(50))
                .with_insert_type(InsertType::AddFront)
                .into(),
            L3EntryUpdate::modify("s1", Side::Sell, dec!(72.10), dec!(450)).into(),
            L3EntryUpdate::cancel("s2", Side::Sell).into(),
            L3EntryUpdate::replace("s3", Side::Sell, dec!(72.05), dec!(100)).into(),
        ]);
        assert!(book.update(&changes.into()).unwrap());
        assert_eq!(ask_ids(&book), ["s3", "s4", "s1"]);
        assert_eq!(book.get_market_side(Side::Sell).get_quote(2).size(), dec!(450));
        assert!(codes.lock().unwrap().is_empty());

        match book.processor() {
            Processor::L3SingleExchange(processor) => {
                assert_eq!(processor.quote_count(), 4);
                assert_eq!(processor.locate("s3"), Some((Side::Sell, dec!(72.05))));
            }
            other => panic!("unexpected processor {:?}", other),
        }
    }

    #[test]
    fn test_rejections_are_reported_in_order() {
        let (mut book, codes) = create_book();
        let snapshot = PackageHeader::new("VOD", PackageType::VendorSnapshot)
            .with_entry(L3EntryNew::new("s1", Side::Sell, dec!(72.10), dec!(500)));
        book.update(&snapshot.into()).unwrap();

        let changes = incremental(vec![
            L3EntryNew::new("s1", Side::Sell, dec!(72.30), dec!(1)).into(),
            L3EntryUpdate::cancel("zz", Side::Sell).into(),
            L3EntryUpdate::modify("s1", Side::Sell, dec!(72.10), dec!(600)).into(),
            L3EntryNew::new("s2", Side::Sell, dec!(72.30), dec!(-1)).into(),
        ]);
        assert!(!book.update(&changes.into()).unwrap());
        assert_eq!(
            *codes.lock().unwrap(),
            vec![
                EntryValidationCode::DuplicateQuoteId,
                EntryValidationCode::UnknownQuoteId,
                EntryValidationCode::ModifyIncreaseSize,
                EntryValidationCode::BadSize,
            ]
        );
        assert_eq!(ask_ids(&book), ["s1"]);
    }
}
