//! L2 processing over several exchanges with a merged book level.

use super::l2::{self, BookLevelSink};
use super::{
    EntryError, EntryOutcome, EntryResult, QuoteProcessor, initial_pool_size, new_exchange,
    reset_applies, reset_exchange, settle,
};
use crate::messages::{
    BookResetEntry, DataModelType, ExchangeId, L2EntryNew, L2EntryUpdate, MarketEntry,
    PackageHeader,
};
use crate::orderbook::error::{EntryValidationCode, OrderBookError};
use crate::orderbook::exchange::{Exchange, ExchangeList};
use crate::orderbook::listener::ErrorListener;
use crate::orderbook::market_side::MarketSide;
use crate::orderbook::options::{BookType, OrderBookOptions, QuoteLevels};
use crate::orderbook::pool::ObjectPool;
use crate::orderbook::quote::Quote;
use pricelevel::Side;
use rust_decimal::Decimal;
use std::marker::PhantomData;
use std::mem;
use tracing::debug;

/// One book-level side: the visible levels, bounded by the maximum depth, followed by
/// the contributions that do not fit.
///
/// Both parts together form one price-ordered sequence addressed by position. A slot
/// freed in the visible part is refilled from the front of the overflow, so no
/// exchange contribution is lost while the visible part is full.
#[derive(Debug)]
pub struct BookSide {
    levels: MarketSide,
    overflow: MarketSide,
}

impl BookSide {
    fn new(side: Side, options: &OrderBookOptions) -> Self {
        Self {
            levels: MarketSide::new(side, options.initial_depth, options.max_depth),
            overflow: MarketSide::new(side, 0, usize::MAX),
        }
    }

    /// Visible levels.
    #[inline]
    pub fn levels(&self) -> &MarketSide {
        &self.levels
    }

    /// Contributions beyond the maximum depth, best first.
    #[inline]
    pub fn overflow(&self) -> &MarketSide {
        &self.overflow
    }

    /// Positions held, visible or not.
    pub fn len(&self) -> usize {
        self.levels.depth() + self.overflow.depth()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty() && self.overflow.is_empty()
    }

    pub fn get_quote(&self, position: usize) -> &Quote {
        match position.checked_sub(self.levels.depth()) {
            None => self.levels.get_quote(position),
            Some(hidden) => self.overflow.get_quote(hidden),
        }
    }

    pub(crate) fn get_quote_mut(&mut self, position: usize) -> &mut Quote {
        match position.checked_sub(self.levels.depth()) {
            None => self.levels.get_quote_mut(position),
            Some(hidden) => self.overflow.get_quote_mut(hidden),
        }
    }

    /// Position of the first quote not priced better than `price`.
    pub fn first_position_by_price(&self, price: Decimal) -> usize {
        let level = self.levels.binary_search_first_level_by_price(price);
        if level < self.levels.depth() {
            return level;
        }
        level + self.overflow.binary_search_first_level_by_price(price)
    }

    /// Position right after every quote priced at or better than `price`.
    pub fn next_position_by_price(&self, price: Decimal) -> usize {
        let level = self.levels.binary_search_next_level_by_price(price);
        if level < self.levels.depth() {
            return level;
        }
        level + self.overflow.binary_search_next_level_by_price(price)
    }

    /// First position holding `price`, if any.
    pub fn position_by_price(&self, price: Decimal) -> Option<usize> {
        let position = self.first_position_by_price(price);
        (position < self.len() && self.get_quote(position).price() == price).then_some(position)
    }

    /// Inserts `quote` at `position`. A full visible part pushes its worst level into
    /// the overflow.
    pub(crate) fn insert(&mut self, position: usize, quote: Quote) {
        if position >= self.levels.max_depth() {
            self.overflow.add(position - self.levels.depth(), quote);
            return;
        }
        if self.levels.is_full() {
            if let Some(worst) = self.levels.remove_worst_quote() {
                self.overflow.add(0, worst);
            }
        }
        self.levels.add(position, quote);
    }

    /// Removes the quote at `position`, promoting the best hidden contribution.
    pub(crate) fn remove(&mut self, position: usize) -> Quote {
        match position.checked_sub(self.levels.depth()) {
            None => {
                let quote = self.levels.remove(position);
                self.refill();
                quote
            }
            Some(hidden) => self.overflow.remove(hidden),
        }
    }

    /// Removes every quote matching `predicate`, returning them to `pool`.
    pub(crate) fn remove_where<F>(&mut self, pool: &mut ObjectPool<Quote>, mut predicate: F)
    where
        F: FnMut(&Quote) -> bool,
    {
        self.levels.remove_where(pool, &mut predicate);
        self.overflow.remove_where(pool, predicate);
        self.refill();
    }

    fn refill(&mut self) {
        while !self.levels.is_full() && !self.overflow.is_empty() {
            self.levels.add_last(self.overflow.remove(0));
        }
    }

    fn clear(&mut self, pool: &mut ObjectPool<Quote>) {
        self.levels.clear(pool);
        self.overflow.clear(pool);
    }
}

/// How per-exchange quotes are folded into the book level.
///
/// Book-level sides show at most the maximum depth. Contributions that fall beyond it
/// stay in the [`BookSide`] overflow and move up as better levels go away.
pub trait BookLevelPolicy {
    const BOOK_TYPE: BookType;

    /// Adds the contribution of an exchange quote.
    fn insert_quote(book_side: &mut BookSide, quote: &Quote, pool: &mut ObjectPool<Quote>);

    /// Removes the contribution of an exchange quote.
    fn remove_quote(book_side: &mut BookSide, quote: &Quote, pool: &mut ObjectPool<Quote>);

    /// Replaces the contribution of `previous` by one with the new size and order count.
    fn update_quote(
        book_side: &mut BookSide,
        previous: &Quote,
        size: Decimal,
        number_of_orders: i64,
        pool: &mut ObjectPool<Quote>,
    );

    /// Removes the contribution of every quote of one exchange side.
    fn remove_all(
        book_side: &mut BookSide,
        exchange_side: &MarketSide,
        _exchange_id: ExchangeId,
        pool: &mut ObjectPool<Quote>,
    ) {
        for quote in exchange_side {
            Self::remove_quote(book_side, quote, pool);
        }
    }
}

/// Book-level sides of a multi-exchange book.
#[derive(Debug)]
pub(crate) struct BookLevel<P> {
    bids: BookSide,
    asks: BookSide,
    policy: PhantomData<P>,
}

impl<P: BookLevelPolicy> BookLevel<P> {
    fn new(options: &OrderBookOptions) -> Self {
        Self {
            bids: BookSide::new(Side::Buy, options),
            asks: BookSide::new(Side::Sell, options),
            policy: PhantomData,
        }
    }

    fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Folds every quote of `exchange` into the book level.
    fn add_exchange(&mut self, exchange: &Exchange, pool: &mut ObjectPool<Quote>) {
        for side in [Side::Buy, Side::Sell] {
            let book_side = self.side_mut(side);
            for quote in exchange.get_market_side(side) {
                P::insert_quote(book_side, quote, pool);
            }
        }
    }

    fn clear(&mut self, pool: &mut ObjectPool<Quote>) {
        self.bids.clear(pool);
        self.asks.clear(pool);
    }
}

impl<P: BookLevelPolicy> BookLevelSink for BookLevel<P> {
    fn quote_added(&mut self, side: Side, quote: &Quote, pool: &mut ObjectPool<Quote>) {
        P::insert_quote(self.side_mut(side), quote, pool);
    }

    fn quote_removed(&mut self, side: Side, quote: &Quote, pool: &mut ObjectPool<Quote>) {
        P::remove_quote(self.side_mut(side), quote, pool);
    }

    fn quote_updated(
        &mut self,
        side: Side,
        previous: &Quote,
        size: Decimal,
        number_of_orders: i64,
        pool: &mut ObjectPool<Quote>,
    ) {
        P::update_quote(self.side_mut(side), previous, size, number_of_orders, pool);
    }

    fn exchange_cleared(&mut self, exchange: &Exchange, pool: &mut ObjectPool<Quote>) {
        for side in [Side::Buy, Side::Sell] {
            P::remove_all(
                self.side_mut(side),
                exchange.get_market_side(side),
                exchange.id(),
                pool,
            );
        }
    }
}

/// Price levels of several exchanges, merged into a book level by `P`.
///
/// Every exchange keeps its own sides and its own waiting-for-snapshot state; entries
/// must carry a non-NULL exchange id.
#[derive(Debug)]
pub struct L2MultiExchangeProcessor<P: BookLevelPolicy> {
    options: OrderBookOptions,
    exchanges: ExchangeList,
    book: BookLevel<P>,
    pool: ObjectPool<Quote>,
    /// Accepted snapshot entries as (exchange, position), reused across snapshots.
    snapshot_entries: Vec<(ExchangeId, usize)>,
}

impl<P: BookLevelPolicy> L2MultiExchangeProcessor<P> {
    pub fn new(options: OrderBookOptions) -> Self {
        Self {
            exchanges: ExchangeList::new(options.initial_exchanges_pool_size),
            book: BookLevel::new(&options),
            pool: ObjectPool::new(initial_pool_size(&options, true)),
            snapshot_entries: Vec::with_capacity(
                options.initial_depth * 2 * options.initial_exchanges_pool_size,
            ),
            options,
        }
    }

    fn process_entry_new(&mut self, package: &PackageHeader, entry: &L2EntryNew) -> EntryResult {
        let new_level = l2::validate_new(entry)?;
        let id = Self::require_exchange_id(entry.exchange_id)?;
        let options = &self.options;
        let exchange = self
            .exchanges
            .get_or_create(id, |id| new_exchange(id, options));
        if options.drops_incremental(exchange.is_waiting_for_snapshot()) {
            return Ok(EntryOutcome::Dropped);
        }
        Ok(l2::insert_level(
            exchange,
            entry,
            new_level,
            package,
            options,
            &mut self.pool,
            &mut self.book,
        ))
    }

    fn process_entry_update(
        &mut self,
        package: &PackageHeader,
        entry: &L2EntryUpdate,
    ) -> EntryResult {
        let change = l2::validate_update(entry)?;
        let id = Self::require_exchange_id(entry.exchange_id)?;
        let Some(exchange) = self.exchanges.get_mut(id) else {
            return Ok(EntryOutcome::Dropped);
        };
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
            &mut self.book,
        ))
    }

    /// Resets one exchange, or every exchange for a NULL id.
    fn process_reset(&mut self, entry: &BookResetEntry) -> EntryResult {
        if !reset_applies(entry.model_type, DataModelType::Level2) {
            return Ok(EntryOutcome::Ignored);
        }
        if entry.exchange_id.is_null() {
            self.book.clear(&mut self.pool);
            for exchange in self.exchanges.iter_mut() {
                reset_exchange(exchange, &mut self.pool);
            }
            debug!("All exchanges reset");
            return Ok(EntryOutcome::Applied);
        }

        let options = &self.options;
        let exchange = self
            .exchanges
            .get_or_create(entry.exchange_id, |id| new_exchange(id, options));
        self.book.exchange_cleared(exchange, &mut self.pool);
        reset_exchange(exchange, &mut self.pool);
        Ok(EntryOutcome::Applied)
    }

    /// Book-level side including the contributions beyond the maximum depth.
    pub fn get_book_side(&self, side: Side) -> &BookSide {
        self.book.side(side)
    }

    fn require_exchange_id(id: ExchangeId) -> Result<ExchangeId, EntryValidationCode> {
        if id.is_null() {
            Err(EntryValidationCode::MissingExchangeId)
        } else {
            Ok(id)
        }
    }

    /// Swaps the book-level contribution of one exchange for its snapshot content.
    fn apply_exchange_snapshot(
        &mut self,
        id: ExchangeId,
        run: &[(ExchangeId, usize)],
        package: &PackageHeader,
    ) -> bool {
        let options = &self.options;
        let exchange = self
            .exchanges
            .get_or_create(id, |id| new_exchange(id, options));
        if !options.accepts_snapshot(package.package_type, exchange.is_waiting_for_snapshot()) {
            return false;
        }

        self.book.exchange_cleared(exchange, &mut self.pool);
        let entries = run
            .iter()
            .filter_map(|&(_, position)| l2::as_l2_new(&package.entries[position]));
        let complete = l2::apply_snapshot(exchange, entries, package, options, &mut self.pool);
        self.book.add_exchange(exchange, &mut self.pool);
        complete
    }
}

impl<P: BookLevelPolicy> QuoteProcessor for L2MultiExchangeProcessor<P> {
    fn quote_levels(&self) -> QuoteLevels {
        QuoteLevels::L2
    }

    fn book_type(&self) -> BookType {
        P::BOOK_TYPE
    }

    /// Applies the snapshot exchange by exchange. Exchanges absent from the package
    /// keep their state.
    fn process_snapshot(
        &mut self,
        package: &PackageHeader,
        listener: &mut dyn ErrorListener,
    ) -> Result<bool, OrderBookError> {
        let mut accepted = mem::take(&mut self.snapshot_entries);
        accepted.clear();
        let mut complete = true;
        for (position, entry) in package.entries.iter().enumerate() {
            let result = match entry {
                MarketEntry::L2New(entry) => l2::validate_new(entry)
                    .and_then(|_| Self::require_exchange_id(entry.exchange_id))
                    .map(|id| {
                        accepted.push((id, position));
                        EntryOutcome::Applied
                    })
                    .map_err(EntryError::from),
                MarketEntry::BookReset(entry) => self.process_reset(entry),
                _ => Ok(EntryOutcome::Ignored),
            };
            complete &= settle(result, package, listener)?;
        }

        // Stable sort keeps the level order of each exchange.
        accepted.sort_by_key(|&(id, _)| id);
        for run in accepted.chunk_by(|a, b| a.0 == b.0) {
            complete &= self.apply_exchange_snapshot(run[0].0, run, package);
        }
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
        self.book.side(side).levels()
    }

    fn get_exchanges(&self) -> &ExchangeList {
        &self.exchanges
    }

    /// True while any known exchange waits for its snapshot.
    fn is_waiting_for_snapshot(&self) -> bool {
        self.exchanges.iter().any(Exchange::is_waiting_for_snapshot)
    }

    fn clear(&mut self) {
        self.book.clear(&mut self.pool);
        for exchange in self.exchanges.iter_mut() {
            exchange.clear(&mut self.pool);
            exchange.set_waiting_for_snapshot(self.options.starts_waiting());
        }
    }

    fn pool(&self) -> &ObjectPool<Quote> {
        &self.pool
    }
}
