use super::l2::{self, NoBookLevel};
use super::{
    EntryError, EntryOutcome, EntryResult, QuoteProcessor, SingleExchange, initial_pool_size,
    reset_applies, reset_exchange, settle,
};
use crate::messages::{
    BookResetEntry, DataModelType, L2EntryNew, L2EntryUpdate, MarketEntry, PackageHeader,
};
use crate::orderbook::error::OrderBookError;
use crate::orderbook::exchange::ExchangeList;
use crate::orderbook::listener::ErrorListener;
use crate::orderbook::market_side::MarketSide;
use crate::orderbook::options::{BookType, OrderBookOptions, QuoteLevels};
use crate::orderbook::pool::ObjectPool;
use crate::orderbook::quote::Quote;
use pricelevel::Side;
use std::mem;

/// Price levels of a single exchange.
#[derive(Debug)]
pub struct L2SingleExchangeProcessor {
    options: OrderBookOptions,
    venue: SingleExchange,
    pool: ObjectPool<Quote>,
    /// Positions of accepted snapshot entries, reused across snapshots.
    snapshot_entries: Vec<usize>,
}

impl L2SingleExchangeProcessor {
    pub fn new(options: OrderBookOptions) -> Self {
        Self {
            venue: SingleExchange::new(&options),
            pool: ObjectPool::new(initial_pool_size(&options, false)),
            snapshot_entries: Vec::with_capacity(options.initial_depth * 2),
            options,
        }
    }

    fn process_entry_new(&mut self, package: &PackageHeader, entry: &L2EntryNew) -> EntryResult {
        let new_level = l2::validate_new(entry)?;
        let exchange = self.venue.bind(entry.exchange_id)?;
        if self.options.drops_incremental(exchange.is_waiting_for_snapshot()) {
            return Ok(EntryOutcome::Dropped);
        }
        Ok(l2::insert_level(
            exchange,
            entry,
            new_level,
            package,
            &self.options,
            &mut self.pool,
            &mut NoBookLevel,
        ))
    }

    fn process_entry_update(
        &mut self,
        package: &PackageHeader,
        entry: &L2EntryUpdate,
    ) -> EntryResult {
        let change = l2::validate_update(entry)?;
        let exchange = self.venue.bind(entry.exchange_id)?;
        if self.options.drops_incremental(exchange.is_waiting_for_snapshot()) {
            return Ok(EntryOutcome::Dropped);
        }
        Ok(l2::update_level(
            exchange,
            entry,
            change,
            package,
            &self.options,
            &mut self.pool,
            &mut NoBookLevel,
        ))
    }

    fn process_reset(&mut self, entry: &BookResetEntry) -> EntryResult {
        if !reset_applies(entry.model_type, DataModelType::Level2) {
            return Ok(EntryOutcome::Ignored);
        }
        let exchange = self.venue.bind(entry.exchange_id)?;
        reset_exchange(exchange, &mut self.pool);
        Ok(EntryOutcome::Applied)
    }
}

impl QuoteProcessor for L2SingleExchangeProcessor {
    fn quote_levels(&self) -> QuoteLevels {
        QuoteLevels::L2
    }

    fn book_type(&self) -> BookType {
        BookType::SingleExchange
    }

    fn process_snapshot(
        &mut self,
        package: &PackageHeader,
        listener: &mut dyn ErrorListener,
    ) -> Result<bool, OrderBookError> {
        let waiting = self.venue.exchange().is_waiting_for_snapshot();
        if !self.options.accepts_snapshot(package.package_type, waiting) {
            return Ok(false);
        }

        let mut accepted = mem::take(&mut self.snapshot_entries);
        accepted.clear();
        let mut complete = true;
        for (position, entry) in package.entries.iter().enumerate() {
            let result = match entry {
                MarketEntry::L2New(entry) => l2::validate_new(entry)
                    .and_then(|_| self.venue.bind(entry.exchange_id).map(|_| ()))
                    .map(|()| {
                        accepted.push(position);
                        EntryOutcome::Applied
                    })
                    .map_err(EntryError::from),
                MarketEntry::BookReset(entry) => self.process_reset(entry),
                _ => Ok(EntryOutcome::Ignored),
            };
            complete &= settle(result, package, listener)?;
        }

        let entries = accepted
            .iter()
            .filter_map(|&position| l2::as_l2_new(&package.entries[position]));
        complete &= l2::apply_snapshot(
            self.venue.exchange_mut(),
            entries,
            package,
            &self.options,
            &mut self.pool,
        );
        self.snapshot_entries = accepted;
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
                MarketEntry::L2New(entry) => self.process_entry_new(package, entry),
                MarketEntry::L2Update(entry) => self.process_entry_update(package, entry),
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
