//! Order-by-order book of a single exchange.

use super::{
    EntryOutcome, EntryResult, QuoteProcessor, SingleExchange, initial_pool_size, positive_size,
    reset_applies, reset_exchange, settle, stamp_quote,
};
use crate::messages::{
    BookResetEntry, DataModelType, InsertType, L3EntryNew, L3EntryUpdate, MarketEntry,
    PackageHeader, QuoteUpdateAction,
};
use crate::orderbook::error::{EntryValidationCode, OrderBookError};
use crate::orderbook::exchange::{Exchange, ExchangeList};
use crate::orderbook::listener::ErrorListener;
use crate::orderbook::market_side::MarketSide;
use crate::orderbook::options::{BookType, OrderBookOptions, QuoteLevels, UnreachableDepthMode};
use crate::orderbook::pool::ObjectPool;
use crate::orderbook::quote::Quote;
use crate::rbtree::RBTree;
use pricelevel::Side;
use rust_decimal::Decimal;
use tracing::{debug, trace};

/// Where a live quote sits: its side and price. The level is found by searching the
/// equal-price run.
#[derive(Debug, Clone, Copy, PartialEq)]
struct QuoteLocation {
    side: Side,
    price: Decimal,
}

/// Individual quotes of a single exchange, indexed by quote id.
///
/// Quotes of equal price keep queue order: [`InsertType::AddBack`] joins the back of the
/// price, [`InsertType::AddFront`] its front. Levels are quotes, so the maximum depth
/// bounds the number of quotes per side.
#[derive(Debug)]
pub struct L3SingleExchangeProcessor {
    options: OrderBookOptions,
    venue: SingleExchange,
    pool: ObjectPool<Quote>,
    index: RBTree<String, QuoteLocation>,
}

impl L3SingleExchangeProcessor {
    pub fn new(options: OrderBookOptions) -> Self {
        Self {
            venue: SingleExchange::new(&options),
            pool: ObjectPool::new(initial_pool_size(&options, false)),
            index: RBTree::with_capacity(options.initial_depth * 2),
            options,
        }
    }

    /// Number of indexed quotes.
    pub fn quote_count(&self) -> usize {
        self.index.len()
    }

    /// Side and price of a live quote.
    pub fn locate(&self, quote_id: &str) -> Option<(Side, Decimal)> {
        self.index
            .get(&quote_id.to_string())
            .map(|location| (location.side, location.price))
    }

    fn add_quote(
        &mut self,
        package: &PackageHeader,
        entry: &L3EntryNew,
        incremental: bool,
    ) -> EntryResult {
        let quote_id = require_quote_id(entry.quote_id.as_ref())?;
        let side = entry.side.ok_or(EntryValidationCode::UnspecifiedSide)?;
        let price = entry.price.ok_or(EntryValidationCode::MissingPrice)?;
        let size = positive_size(entry.size)?;
        if entry.insert_type == InsertType::AddBefore {
            return Err(EntryValidationCode::UnsupportedInsertType.into());
        }
        let exchange = self.venue.bind(entry.exchange_id)?;
        if incremental && self.options.drops_incremental(exchange.is_waiting_for_snapshot()) {
            return Ok(EntryOutcome::Dropped);
        }
        if self.index.contains_key(quote_id) {
            return Err(EntryValidationCode::DuplicateQuoteId.into());
        }

        let mut quote = self.pool.borrow();
        quote.set(price, size, 1, exchange.id());
        quote.set_quote_id(Some(quote_id.as_str()));
        quote.set_participant_id(entry.participant_id.as_deref());
        stamp_quote(&mut quote, package, &self.options);
        Ok(place(
            exchange,
            &mut self.index,
            &mut self.pool,
            &self.options,
            quote,
            side,
            entry.insert_type,
        ))
    }

    fn update_quote(&mut self, package: &PackageHeader, entry: &L3EntryUpdate) -> EntryResult {
        let quote_id = require_quote_id(entry.quote_id.as_ref())?;
        let side = entry.side.ok_or(EntryValidationCode::UnspecifiedSide)?;
        let exchange = self.venue.bind(entry.exchange_id)?;
        if self.options.drops_incremental(exchange.is_waiting_for_snapshot()) {
            return Ok(EntryOutcome::Dropped);
        }

        match entry.action {
            QuoteUpdateAction::Cancel => {
                let location = self
                    .index
                    .remove(quote_id)
                    .ok_or(EntryValidationCode::UnknownQuoteId)?;
                let market_side = exchange.get_market_side_mut(location.side);
                let level = find_quote(market_side, quote_id, location.price)?;
                self.pool.release(market_side.remove(level));
            }
            QuoteUpdateAction::Modify => {
                let location = self
                    .index
                    .get(quote_id)
                    .copied()
                    .ok_or(EntryValidationCode::UnknownQuoteId)?;
                if entry.price.is_some_and(|price| price != location.price) {
                    return Err(EntryValidationCode::ModifyChangePrice.into());
                }
                let size = positive_size(entry.size)?;
                let market_side = exchange.get_market_side_mut(location.side);
                let level = find_quote(market_side, quote_id, location.price)?;
                let quote = market_side.get_quote_mut(level);
                if size > quote.size() {
                    return Err(EntryValidationCode::ModifyIncreaseSize.into());
                }
                quote.set_size(size);
                stamp_quote(quote, package, &self.options);
            }
            QuoteUpdateAction::Replace => {
                let price = entry.price.ok_or(EntryValidationCode::MissingPrice)?;
                let size = positive_size(entry.size)?;
                let location = self
                    .index
                    .remove(quote_id)
                    .ok_or(EntryValidationCode::UnknownQuoteId)?;
                let market_side = exchange.get_market_side_mut(location.side);
                let level = find_quote(market_side, quote_id, location.price)?;
                let mut quote = market_side.remove(level);
                quote.set_price(price);
                quote.set_size(size);
                stamp_quote(&mut quote, package, &self.options);
                return Ok(place(
                    exchange,
                    &mut self.index,
                    &mut self.pool,
                    &self.options,
                    quote,
                    side,
                    InsertType::AddBack,
                ));
            }
        }
        Ok(EntryOutcome::Applied)
    }

    fn process_reset(&mut self, entry: &BookResetEntry) -> EntryResult {
        if !reset_applies(entry.model_type, DataModelType::Level3) {
            return Ok(EntryOutcome::Ignored);
        }
        let exchange = self.venue.bind(entry.exchange_id)?;
        reset_exchange(exchange, &mut self.pool);
        self.index.clear();
        Ok(EntryOutcome::Applied)
    }
}

fn require_quote_id(quote_id: Option<&String>) -> Result<&String, EntryValidationCode> {
    quote_id
        .filter(|quote_id| !quote_id.is_empty())
        .ok_or(EntryValidationCode::MissingQuoteId)
}

/// Level of the quote `quote_id` within the run of quotes priced `price`.
fn find_quote(
    market_side: &MarketSide,
    quote_id: &str,
    price: Decimal,
) -> Result<usize, OrderBookError> {
    let first = market_side.binary_search_first_level_by_price(price);
    (first..market_side.depth())
        .take_while(|&level| market_side.get_quote(level).price() == price)
        .find(|&level| market_side.get_quote(level).quote_id() == Some(quote_id))
        .ok_or_else(|| OrderBookError::BrokenInvariant {
            message: format!(
                "quote {} indexed at {} {} is not on the book",
                quote_id,
                market_side.side(),
                price
            ),
        })
}

/// Queues `quote` on `side` and indexes it, applying the depth policies.
fn place(
    exchange: &mut Exchange,
    index: &mut RBTree<String, QuoteLocation>,
    pool: &mut ObjectPool<Quote>,
    options: &OrderBookOptions,
    quote: Quote,
    side: Side,
    insert_type: InsertType,
) -> EntryOutcome {
    let price = quote.price();
    let market_side = exchange.get_market_side_mut(side);
    let level = match insert_type {
        InsertType::AddFront => market_side.binary_search_first_level_by_price(price),
        InsertType::AddBack | InsertType::AddBefore => {
            market_side.binary_search_next_level_by_price(price)
        }
    };

    if level >= market_side.max_depth() {
        trace!("Quote {} unreachable at level {}", quote.quote_key(), level);
        pool.release(quote);
        if options.unreachable_depth_mode == UnreachableDepthMode::SkipAndDrop {
            debug!("Exchange {} dropped", exchange.id());
            exchange.clear(pool);
            index.clear();
            if options.wait_for_snapshot_after_drop {
                exchange.set_waiting_for_snapshot(true);
            }
        }
        return EntryOutcome::Dropped;
    }

    if market_side.is_full() {
        if let Some(worst) = market_side.remove_worst_quote() {
            index.remove(worst.quote_key());
            pool.release(worst);
        }
    }
    index.put(quote.quote_key().clone(), QuoteLocation { side, price });
    market_side.add(level, quote);
    EntryOutcome::Applied
}

impl QuoteProcessor for L3SingleExchangeProcessor {
    fn quote_levels(&self) -> QuoteLevels {
        QuoteLevels::L3
    }

    fn book_type(&self) -> BookType {
        BookType::SingleExchange
    }

    /// Rebuilds the book from the quotes of the snapshot. Book resets in the package
    /// apply before any quote is added.
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
        for entry in &package.entries {
            if let MarketEntry::BookReset(entry) = entry {
                let result = self.process_reset(entry);
                complete &= settle(result, package, listener)?;
            }
        }

        self.venue.exchange_mut().clear(&mut self.pool);
        self.index.clear();
        for entry in &package.entries {
            let result = match entry {
                MarketEntry::L3New(entry) => self.add_quote(package, entry, false),
                _ => Ok(EntryOutcome::Ignored),
            };
            complete &= settle(result, package, listener)?;
        }

        let exchange = self.venue.exchange_mut();
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
                MarketEntry::L3New(entry) => self.add_quote(package, entry, true),
                MarketEntry::L3Update(entry) => self.update_quote(package, entry),
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
        self.index.clear();
    }

    fn pool(&self) -> &ObjectPool<Quote> {
        &self.pool
    }
}
