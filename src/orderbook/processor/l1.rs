use super::{
    EntryOutcome, EntryResult, QuoteProcessor, SingleExchange, initial_pool_size, reset_applies,
    reset_exchange, settle, stamp_quote,
};
use crate::messages::{BookResetEntry, DataModelType, L1Entry, MarketEntry, PackageHeader};
use crate::orderbook::error::{EntryValidationCode, OrderBookError};
use crate::orderbook::exchange::{Exchange, ExchangeList};
use crate::orderbook::listener::ErrorListener;
use crate::orderbook::market_side::MarketSide;
use crate::orderbook::options::{BookType, OrderBookOptions, QuoteLevels};
use crate::orderbook::pool::ObjectPool;
use crate::orderbook::quote::Quote;
use pricelevel::Side;
use rust_decimal::Decimal;
use tracing::debug;

/// Top of book of a single exchange: at most one quote per side.
#[derive(Debug)]
pub struct L1Processor {
    options: OrderBookOptions,
    venue: SingleExchange,
    pool: ObjectPool<Quote>,
}

impl L1Processor {
    pub fn new(options: OrderBookOptions) -> Self {
        Self {
            venue: SingleExchange::new(&options),
            pool: ObjectPool::new(initial_pool_size(&options, false)),
            options,
        }
    }

    fn validate(entry: &L1Entry) -> Result<(Side, Decimal, Decimal), EntryValidationCode> {
        let side = entry.side.ok_or(EntryValidationCode::UnspecifiedSide)?;
        let price = entry.price.ok_or(EntryValidationCode::MissingPrice)?;
        match entry.size {
            Some(size) if size >= Decimal::ZERO => Ok((side, price, size)),
            _ => Err(EntryValidationCode::BadSize),
        }
    }

    /// Validates `entry` and writes it to the top of its side. Returns the side written.
    fn apply_entry(
        &mut self,
        package: &PackageHeader,
        entry: &L1Entry,
        incremental: bool,
    ) -> Result<Option<Side>, EntryValidationCode> {
        let (side, price, size) = Self::validate(entry)?;
        let exchange = self.venue.bind(entry.exchange_id)?;
        if incremental && self.options.drops_incremental(exchange.is_waiting_for_snapshot()) {
            return Ok(None);
        }
        set_top(
            exchange,
            side,
            (price, size, entry.number_of_orders),
            package,
            &self.options,
            &mut self.pool,
        );
        Ok(Some(side))
    }

    fn process_reset(&mut self, entry: &BookResetEntry) -> EntryResult {
        if !reset_applies(entry.model_type, DataModelType::Level1) {
            return Ok(EntryOutcome::Ignored);
        }
        let exchange = self.venue.bind(entry.exchange_id)?;
        reset_exchange(exchange, &mut self.pool);
        Ok(EntryOutcome::Applied)
    }
}

/// Overwrites the single quote of a side, creating it when the side is empty.
fn set_top(
    exchange: &mut Exchange,
    side: Side,
    (price, size, number_of_orders): (Decimal, Decimal, i64),
    package: &PackageHeader,
    options: &OrderBookOptions,
    pool: &mut ObjectPool<Quote>,
) {
    let exchange_id = exchange.id();
    let market_side = exchange.get_market_side_mut(side);
    if market_side.has_level(0) {
        let quote = market_side.get_quote_mut(0);
        quote.set(price, size, number_of_orders, exchange_id);
        stamp_quote(quote, package, options);
    } else {
        let mut quote = pool.borrow();
        quote.set(price, size, number_of_orders, exchange_id);
        stamp_quote(&mut quote, package, options);
        market_side.add_last(quote);
    }
}

impl QuoteProcessor for L1Processor {
    fn quote_levels(&self) -> QuoteLevels {
        QuoteLevels::L1
    }

    fn book_type(&self) -> BookType {
        BookType::SingleExchange
    }

    /// Sets the top of book from the snapshot. Sides missing from it are emptied.
    fn process_snapshot(
        &mut self,
        package: &PackageHeader,
        listener: &mut dyn ErrorListener,
    ) -> Result<bool, OrderBookError> {
        let waiting = self.venue.exchange().is_waiting_for_snapshot();
        if !self.options.accepts_snapshot(package.package_type, waiting) {
            return Ok(false);
        }

        let mut complete = true;
        let (mut bid_seen, mut ask_seen) = (false, false);
        for entry in &package.entries {
            let result = match entry {
                MarketEntry::L1(entry) => match self.apply_entry(package, entry, false) {
                    Ok(Some(Side::Buy)) => {
                        bid_seen = true;
                        Ok(EntryOutcome::Applied)
                    }
                    Ok(Some(Side::Sell)) => {
                        ask_seen = true;
                        Ok(EntryOutcome::Applied)
                    }
                    Ok(None) => Ok(EntryOutcome::Dropped),
                    Err(code) => Err(code.into()),
                },
                MarketEntry::BookReset(entry) => self.process_reset(entry),
                _ => Ok(EntryOutcome::Ignored),
            };
            complete &= settle(result, package, listener)?;
        }

        let exchange = self.venue.exchange_mut();
        if !bid_seen {
            exchange.get_market_side_mut(Side::Buy).clear(&mut self.pool);
        }
        if !ask_seen {
            exchange.get_market_side_mut(Side::Sell).clear(&mut self.pool);
        }
        exchange.set_waiting_for_snapshot(false);
        debug!("Exchange {} live after snapshot", exchange.id());
        Ok(complete)
    }

    fn process_incremental(
        &mut self,
        package: &PackageHeader,
        listener: &mut dyn ErrorListener,
    ) -> Result<bool, OrderBookError> {
        let mut complete = true;
        for entry in &package.entries {
            let result = match entry {
                MarketEntry::L1(entry) => match self.apply_entry(package, entry, true) {
                    Ok(Some(_)) => Ok(EntryOutcome::Applied),
                    Ok(None) => Ok(EntryOutcome::Dropped),
                    Err(code) => Err(code.into()),
                },
                MarketEntry::BookReset(entry) => self.process_reset(entry),
                _ => Ok(EntryOutcome::Ignored),
            };
            complete &= settle(result, package, listener)?;
        }
        Ok(complete)
    }

    fn get_market_side(&self, side: Side) -> &MarketSide {
        self.venue.exchange().get_market_side(side)
    }

    fn get_exchanges(&self) -> &ExchangeList {
        self.venue.exchanges()
    }

    fn is_waiting_for_snapshot(&self) -> bool {
        self.venue.exchange().is_waiting_for_snapshot()
    }

    fn clear(&mut self) {
        let exchange = self.venue.exchange_mut();
        exchange.clear(&mut self.pool);
        exchange.set_waiting_for_snapshot(self.options.starts_waiting());
    }

    fn pool(&self) -> &ObjectPool<Quote> {
        &self.pool
    }
}
