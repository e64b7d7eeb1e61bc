//! Per-exchange level maintenance shared by the L2 processors.

use super::{EntryOutcome, positive_size, stamp_quote};
use crate::messages::{BookUpdateAction, L2EntryNew, L2EntryUpdate, MarketEntry, PackageHeader};
use crate::orderbook::error::EntryValidationCode;
use crate::orderbook::exchange::Exchange;
use crate::orderbook::options::{GapMode, OrderBookOptions, UnreachableDepthMode};
use crate::orderbook::pool::ObjectPool;
use crate::orderbook::quote::Quote;
use pricelevel::Side;
use rust_decimal::Decimal;
use tracing::{debug, trace};

/// Book-level bookkeeping that follows every change of an exchange side.
pub(crate) trait BookLevelSink {
    fn quote_added(&mut self, side: Side, quote: &Quote, pool: &mut ObjectPool<Quote>);

    fn quote_removed(&mut self, side: Side, quote: &Quote, pool: &mut ObjectPool<Quote>);

    /// Called before `previous` takes its new size and order count.
    fn quote_updated(
        &mut self,
        side: Side,
        previous: &Quote,
        size: Decimal,
        number_of_orders: i64,
        pool: &mut ObjectPool<Quote>,
    );

    /// Called before every quote of `exchange` is released.
    fn exchange_cleared(&mut self, exchange: &Exchange, pool: &mut ObjectPool<Quote>);
}

/// Sink of single-exchange books, which have no book level.
pub(crate) struct NoBookLevel;

impl BookLevelSink for NoBookLevel {
    fn quote_added(&mut self, _: Side, _: &Quote, _: &mut ObjectPool<Quote>) {}

    fn quote_removed(&mut self, _: Side, _: &Quote, _: &mut ObjectPool<Quote>) {}

    fn quote_updated(
        &mut self,
        _: Side,
        _: &Quote,
        _: Decimal,
        _: i64,
        _: &mut ObjectPool<Quote>,
    ) {
    }

    fn exchange_cleared(&mut self, _: &Exchange, _: &mut ObjectPool<Quote>) {}
}

/// Fields of a new-level entry after validation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NewLevel {
    pub(crate) side: Side,
    pub(crate) price: Decimal,
    pub(crate) size: Decimal,
}

pub(crate) fn validate_new(entry: &L2EntryNew) -> Result<NewLevel, EntryValidationCode> {
    let side = entry.side.ok_or(EntryValidationCode::UnspecifiedSide)?;
    let price = entry.price.ok_or(EntryValidationCode::MissingPrice)?;
    let size = positive_size(entry.size)?;
    Ok(NewLevel { side, price, size })
}

/// Change requested by an update entry after validation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum LevelChange {
    Update(Decimal),
    Delete,
}

pub(crate) fn validate_update(
    entry: &L2EntryUpdate,
) -> Result<(Side, LevelChange), EntryValidationCode> {
    let side = entry.side.ok_or(EntryValidationCode::UnspecifiedSide)?;
    match entry.action {
        BookUpdateAction::Insert => Err(EntryValidationCode::UnsupportedUpdateAction),
        BookUpdateAction::Delete => Ok((side, LevelChange::Delete)),
        BookUpdateAction::Update => Ok((side, LevelChange::Update(positive_size(entry.size)?))),
    }
}

pub(crate) fn as_l2_new(entry: &MarketEntry) -> Option<&L2EntryNew> {
    match entry {
        MarketEntry::L2New(entry) => Some(entry),
        _ => None,
    }
}

/// Inserts a new level into `exchange`, applying the unreachable depth, gap and
/// eviction policies.
pub(crate) fn insert_level<S: BookLevelSink>(
    exchange: &mut Exchange,
    entry: &L2EntryNew,
    new_level: NewLevel,
    package: &PackageHeader,
    options: &OrderBookOptions,
    pool: &mut ObjectPool<Quote>,
    sink: &mut S,
) -> EntryOutcome {
    let NewLevel { side, price, size } = new_level;
    let level = entry.level;
    let exchange_id = exchange.id();
    let market_side = exchange.get_market_side(side);

    if level >= market_side.max_depth() {
        trace!(
            "Exchange {}: level {} unreachable with max depth {}",
            exchange_id,
            level,
            market_side.max_depth()
        );
        if options.unreachable_depth_mode == UnreachableDepthMode::SkipAndDrop {
            drop_exchange(exchange, options, pool, sink);
        }
        return EntryOutcome::Dropped;
    }

    if market_side.is_gap(level) {
        trace!(
            "Exchange {}: gap inserting level {} at depth {}",
            exchange_id,
            level,
            market_side.depth()
        );
        match options.gap_mode {
            GapMode::Skip => return EntryOutcome::Dropped,
            GapMode::SkipAndDrop => {
                drop_exchange(exchange, options, pool, sink);
                return EntryOutcome::Dropped;
            }
            GapMode::FillGap => {
                // Missing levels repeat the incoming quote until a later update fixes them.
                let market_side = exchange.get_market_side_mut(side);
                while market_side.depth() < level {
                    let mut filler = pool.borrow();
                    filler.set(price, size, entry.number_of_orders, exchange_id);
                    stamp_quote(&mut filler, package, options);
                    sink.quote_added(side, &filler, pool);
                    market_side.add_last(filler);
                }
            }
        }
    }

    let market_side = exchange.get_market_side_mut(side);
    if market_side.is_full() {
        if let Some(worst) = market_side.remove_worst_quote() {
            if options.evict_book_level_with_exchange {
                sink.quote_removed(side, &worst, pool);
            }
            pool.release(worst);
        }
    }

    let mut quote = pool.borrow();
    quote.set(price, size, entry.number_of_orders, exchange_id);
    stamp_quote(&mut quote, package, options);
    sink.quote_added(side, &quote, pool);
    market_side.add(level, quote);
    EntryOutcome::Applied
}

/// Applies an update or delete to an existing level. Unknown levels are dropped.
pub(crate) fn update_level<S: BookLevelSink>(
    exchange: &mut Exchange,
    entry: &L2EntryUpdate,
    (side, change): (Side, LevelChange),
    package: &PackageHeader,
    options: &OrderBookOptions,
    pool: &mut ObjectPool<Quote>,
    sink: &mut S,
) -> EntryOutcome {
    let market_side = exchange.get_market_side_mut(side);
    if !market_side.has_level(entry.level) {
        return EntryOutcome::Dropped;
    }

    match change {
        LevelChange::Delete => {
            let quote = market_side.remove(entry.level);
            sink.quote_removed(side, &quote, pool);
            pool.release(quote);
        }
        LevelChange::Update(size) => {
            let quote = market_side.get_quote_mut(entry.level);
            sink.quote_updated(side, quote, size, entry.number_of_orders, pool);
            quote.set_size(size);
            quote.set_number_of_orders(entry.number_of_orders);
            stamp_quote(quote, package, options);
        }
    }
    EntryOutcome::Applied
}

/// Replaces the levels of `exchange` with validated snapshot entries and marks it live.
///
/// Levels present on the book are overwritten in place. Entries at or beyond the
/// maximum depth are ignored. Returns false if an entry would have left a gap.
pub(crate) fn apply_snapshot<'a, I>(
    exchange: &mut Exchange,
    entries: I,
    package: &PackageHeader,
    options: &OrderBookOptions,
    pool: &mut ObjectPool<Quote>,
) -> bool
where
    I: Iterator<Item = &'a L2EntryNew> + Clone,
{
    let (bids, asks) = entries
        .clone()
        .fold((0, 0), |(bids, asks), entry| match entry.side {
            Some(Side::Buy) => (bids + 1, asks),
            Some(Side::Sell) => (bids, asks + 1),
            None => (bids, asks),
        });
    if bids < exchange.get_market_side(Side::Buy).depth()
        || asks < exchange.get_market_side(Side::Sell).depth()
    {
        exchange.clear(pool);
    }

    let exchange_id = exchange.id();
    let mut complete = true;
    for entry in entries {
        let (Some(side), Some(price), Some(size)) = (entry.side, entry.price, entry.size) else {
            continue;
        };
        let market_side = exchange.get_market_side_mut(side);
        if entry.level >= market_side.max_depth() {
            continue;
        }
        if market_side.has_level(entry.level) {
            let quote = market_side.get_quote_mut(entry.level);
            quote.set(price, size, entry.number_of_orders, exchange_id);
            stamp_quote(quote, package, options);
        } else if entry.level == market_side.depth() {
            let mut quote = pool.borrow();
            quote.set(price, size, entry.number_of_orders, exchange_id);
            stamp_quote(&mut quote, package, options);
            market_side.add_last(quote);
        } else {
            complete = false;
        }
    }

    exchange.trim(pool);
    exchange.set_waiting_for_snapshot(false);
    debug!("Exchange {} live after snapshot", exchange_id);
    complete
}

/// Clears `exchange` after a SKIP_AND_DROP policy decision.
pub(crate) fn drop_exchange<S: BookLevelSink>(
    exchange: &mut Exchange,
    options: &OrderBookOptions,
    pool: &mut ObjectPool<Quote>,
    sink: &mut S,
) {
    debug!("Exchange {} dropped", exchange.id());
    sink.exchange_cleared(exchange, pool);
    exchange.clear(pool);
    if options.wait_for_snapshot_after_drop {
        exchange.set_waiting_for_snapshot(true);
    }
}
