//! Generated package streams checking that every pooled quote is accounted for, that
//! sides stay ordered and that book levels agree with the exchanges they merge.

use pricelevel::Side;
use proptest::prelude::*;
use quotebook_rs::messages::{
    BookResetEntry, DataModelType, ExchangeId, L2EntryNew, L2EntryUpdate, MarketEntry,
    PackageHeader, PackageType,
};
use quotebook_rs::orderbook::Processor;
use quotebook_rs::{BookType, MarketSide, OrderBook, OrderBookOptions, QuoteLevels};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Deepest ladder a generated snapshot publishes.
const MAX_LADDER_DEPTH: usize = 10;

/// One step of a generated stream. Levels and sizes are raw draws, resolved against
/// the book when the step runs.
#[derive(Debug, Clone)]
enum Step {
    Snapshot {
        exchange: usize,
        depth: usize,
        bid_base: i64,
        spread: i64,
    },
    Reset {
        exchange: usize,
    },
    Delete {
        exchange: usize,
        side: Side,
        level: usize,
    },
    Update {
        exchange: usize,
        side: Side,
        level: usize,
        size: i64,
    },
    Insert {
        exchange: usize,
        side: Side,
        level: usize,
        size: i64,
    },
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn arb_step() -> impl Strategy<Value = Step> {
    let exchange = 0usize..3;
    prop_oneof![
        1 => (exchange.clone(), 0..=MAX_LADDER_DEPTH, 400i64..500, 1i64..6).prop_map(
            |(exchange, depth, bid_base, spread)| Step::Snapshot {
                exchange,
                depth,
                bid_base,
                spread,
            }
        ),
        1 => exchange.clone().prop_map(|exchange| Step::Reset { exchange }),
        6 => (exchange.clone(), arb_side(), 0usize..64)
            .prop_map(|(exchange, side, level)| Step::Delete { exchange, side, level }),
        4 => (exchange.clone(), arb_side(), 0usize..64, 1i64..10).prop_map(
            |(exchange, side, level, size)| Step::Update {
                exchange,
                side,
                level,
                size,
            }
        ),
        8 => (exchange, arb_side(), 0usize..64, 1i64..10).prop_map(
            |(exchange, side, level, size)| Step::Insert {
                exchange,
                side,
                level,
                size,
            }
        ),
    ]
}

fn create_book(book_type: BookType, max_depth: usize) -> OrderBook {
    OrderBook::from_options(
        OrderBookOptions::new()
            .with_symbol("RND")
            .with_quote_levels(QuoteLevels::L2)
            .with_book_type(book_type)
            .with_initial_depth(8)
            .with_max_depth(max_depth),
    )
    .unwrap()
}

fn exchange_ids(book_type: BookType) -> Vec<ExchangeId> {
    match book_type {
        BookType::SingleExchange => vec![ExchangeId::NULL],
        _ => ["XNAS", "BATS", "ARCA"]
            .iter()
            .map(|code| ExchangeId::from_code(code).unwrap())
            .collect(),
    }
}

fn exchange_side(book: &OrderBook, exchange_id: ExchangeId, side: Side) -> Option<&MarketSide> {
    book.get_exchange(exchange_id)
        .map(|exchange| exchange.get_market_side(side))
}

/// A price strictly between the neighbours of `level`, if there is room.
fn price_for(market_side: Option<&MarketSide>, side: Side, level: usize) -> Option<Decimal> {
    let (far, near) = match side {
        Side::Buy => (dec!(1000), Decimal::ZERO),
        Side::Sell => (Decimal::ZERO, dec!(1000)),
    };
    let better = match level {
        0 => far,
        _ => market_side?.get(level - 1)?.price(),
    };
    let worse = market_side
        .and_then(|market_side| market_side.get(level))
        .map_or(near, |quote| quote.price());
    if (better - worse).abs() < dec!(0.02) {
        return None;
    }
    Some(((better + worse) / Decimal::TWO).round_dp(2))
}

fn ladder(exchange_id: ExchangeId, depth: usize, bid_base: i64, spread: i64) -> Vec<MarketEntry> {
    let bid_base = Decimal::from(bid_base);
    let ask_base = bid_base + Decimal::from(spread);
    let mut entries: Vec<MarketEntry> = Vec::new();
    for level in 0..depth {
        let step = Decimal::from(level as i64) / Decimal::TWO;
        entries.push(
            L2EntryNew::new(Side::Buy, level, bid_base - step, dec!(1))
                .with_exchange_id(exchange_id)
                .into(),
        );
        entries.push(
            L2EntryNew::new(Side::Sell, level, ask_base + step, dec!(1))
                .with_exchange_id(exchange_id)
                .into(),
        );
    }
    entries
}

/// Turns a generated step into a package consistent with the current book.
fn package_for(step: &Step, book: &OrderBook, ids: &[ExchangeId]) -> PackageHeader {
    let incremental = PackageHeader::new("RND", PackageType::IncrementalUpdate);
    match *step {
        Step::Snapshot {
            exchange,
            depth,
            bid_base,
            spread,
        } => {
            let exchange_id = ids[exchange % ids.len()];
            PackageHeader::new("RND", PackageType::VendorSnapshot)
                .with_entries(ladder(exchange_id, depth, bid_base, spread))
        }
        Step::Reset { exchange } => incremental.with_entry(BookResetEntry::new(
            ids[exchange % ids.len()],
            DataModelType::Level2,
        )),
        Step::Delete {
            exchange,
            side,
            level,
        } => {
            let exchange_id = ids[exchange % ids.len()];
            let depth = exchange_side(book, exchange_id, side).map_or(0, MarketSide::depth);
            incremental.with_entry(
                L2EntryUpdate::delete(side, level % (depth + 1)).with_exchange_id(exchange_id),
            )
        }
        Step::Update {
            exchange,
            side,
            level,
            size,
        } => {
            let exchange_id = ids[exchange % ids.len()];
            let depth = exchange_side(book, exchange_id, side).map_or(0, MarketSide::depth);
            incremental.with_entry(
                L2EntryUpdate::update(side, level % (depth + 1), Decimal::from(size), 1)
                    .with_exchange_id(exchange_id),
            )
        }
        Step::Insert {
            exchange,
            side,
            level,
            size,
        } => {
            let exchange_id = ids[exchange % ids.len()];
            let market_side = exchange_side(book, exchange_id, side);
            let depth = market_side.map_or(0, MarketSide::depth);
            let level = level % (depth + 2);
            match price_for(market_side, side, level) {
                Some(price) => incremental.with_entry(
                    L2EntryNew::new(side, level, price, Decimal::from(size))
                        .with_exchange_id(exchange_id),
                ),
                None => incremental,
            }
        }
    }
}

fn exchange_depth(book: &OrderBook, side: Side) -> usize {
    book.get_exchanges()
        .iter()
        .map(|exchange| exchange.get_market_side(side).depth())
        .sum()
}

/// Book-level quotes, visible or beyond the maximum depth.
fn book_level_quotes(book: &OrderBook, side: Side) -> usize {
    match book.processor() {
        Processor::L2Aggregated(processor) => processor.get_book_side(side).len(),
        Processor::L2Consolidated(processor) => processor.get_book_side(side).len(),
        _ => 0,
    }
}

fn quotes_held(book: &OrderBook) -> usize {
    [Side::Buy, Side::Sell]
        .into_iter()
        .map(|side| exchange_depth(book, side) + book_level_quotes(book, side))
        .sum()
}

/// Sizes summed over every exchange quote priced `price`.
fn exchange_sum(book: &OrderBook, side: Side, price: Decimal) -> Decimal {
    book.get_exchanges()
        .iter()
        .flat_map(|exchange| exchange.get_market_side(side).iter())
        .filter(|quote| quote.price() == price)
        .map(|quote| quote.size())
        .sum()
}

/// Distinct exchange prices of `side`, best first.
fn exchange_prices(book: &OrderBook, side: Side) -> Vec<Decimal> {
    let mut prices: Vec<Decimal> = book
        .get_exchanges()
        .iter()
        .flat_map(|exchange| exchange.get_market_side(side).iter())
        .map(|quote| quote.price())
        .collect();
    prices.sort_unstable();
    prices.dedup();
    if side == Side::Buy {
        prices.reverse();
    }
    prices
}

fn check_book(book: &OrderBook, max_depth: usize) -> Result<(), TestCaseError> {
    prop_assert_eq!(book.pool().borrowed(), quotes_held(book));
    for exchange in book.get_exchanges() {
        for side in [Side::Buy, Side::Sell] {
            let market_side = exchange.get_market_side(side);
            prop_assert!(market_side.depth() <= max_depth);
            prop_assert!(market_side.is_strictly_ordered(), "{}", market_side);
        }
    }

    for side in [Side::Buy, Side::Sell] {
        let book_side = book.get_market_side(side);
        prop_assert!(book_side.depth() <= max_depth);
        match book.get_book_type() {
            BookType::SingleExchange => {}
            BookType::Aggregated => {
                prop_assert!(book_side.is_strictly_ordered(), "{}", book_side);
                let visible: Vec<Decimal> = book_side.iter().map(|quote| quote.price()).collect();
                let mut expected = exchange_prices(book, side);
                expected.truncate(max_depth);
                prop_assert_eq!(visible, expected);
                for merged in book_side {
                    prop_assert_eq!(merged.size(), exchange_sum(book, side, merged.price()));
                }
            }
            BookType::Consolidated => {
                prop_assert!(book_side.is_ordered(), "{}", book_side);
                prop_assert_eq!(
                    book_side.depth(),
                    exchange_depth(book, side).min(max_depth)
                );
                prop_assert_eq!(book_level_quotes(book, side), exchange_depth(book, side));
            }
        }
    }
    Ok(())
}

fn run_stream(book_type: BookType, max_depth: usize, steps: &[Step]) -> Result<(), TestCaseError> {
    let mut book = create_book(book_type, max_depth);
    let ids = exchange_ids(book_type);
    for step in steps {
        let package = package_for(step, &book, &ids);
        book.update_package(&package).unwrap();
        check_book(&book, max_depth)?;
    }
    Ok(())
}

#[cfg(test)]
mod pool_conservation_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_single_exchange_stream(steps in prop::collection::vec(arb_step(), 1..400)) {
            run_stream(BookType::SingleExchange, 16, &steps)?;
        }

        #[test]
        fn prop_aggregated_stream(steps in prop::collection::vec(arb_step(), 1..400)) {
            run_stream(BookType::Aggregated, 16, &steps)?;
        }

        #[test]
        fn prop_consolidated_stream(steps in prop::collection::vec(arb_step(), 1..400)) {
            run_stream(BookType::Consolidated, 16, &steps)?;
        }

        /// Three exchanges of up to six levels overflow a book level of six.
        #[test]
        fn prop_aggregated_stream_beyond_max_depth(
            steps in prop::collection::vec(arb_step(), 1..400)
        ) {
            run_stream(BookType::Aggregated, 6, &steps)?;
        }

        #[test]
        fn prop_consolidated_stream_beyond_max_depth(
            steps in prop::collection::vec(arb_step(), 1..400)
        ) {
            run_stream(BookType::Consolidated, 6, &steps)?;
        }

        #[test]
        fn prop_clear_returns_everything(
            book_type in prop_oneof![Just(BookType::Aggregated), Just(BookType::Consolidated)],
            steps in prop::collection::vec(arb_step(), 1..200)
        ) {
            let mut book = create_book(book_type, 6);
            let ids = exchange_ids(book_type);
            for step in &steps {
                let package = package_for(step, &book, &ids);
                book.update_package(&package).unwrap();
            }
            book.clear();
            prop_assert_eq!(book.pool().borrowed(), 0);
            prop_assert!(book.is_empty());
        }
    }
}
