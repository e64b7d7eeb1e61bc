//! Processors applying market data packages to book state.
//!
//! Every processor walks the entries of a package, applies the ones it understands and
//! settles each entry into one of:
//! - applied, or ignored because it belongs to another data model (package stays complete)
//! - dropped by policy: waiting for snapshot, gap, unknown level, unreachable depth
//! - rejected by validation, which is also reported to the [`ErrorListener`]
//!
//! Faults that indicate a broken invariant abort the package with an error.

mod aggregated;
mod consolidated;
mod l1;
mod l2;
mod l2_multi;
mod l2_single;
mod l3;

pub use aggregated::Aggregated;
pub use consolidated::Consolidated;
pub use l1::L1Processor;
pub use l2_multi::{BookLevelPolicy, BookSide, L2MultiExchangeProcessor};
pub use l2_single::L2SingleExchangeProcessor;
pub use l3::L3SingleExchangeProcessor;

use super::error::{EntryValidationCode, OrderBookError};
use super::exchange::{Exchange, ExchangeList};
use super::listener::ErrorListener;
use super::market_side::MarketSide;
use super::options::{BookType, OrderBookOptions, QuoteLevels};
use super::pool::ObjectPool;
use super::quote::Quote;
use crate::messages::{DataModelType, ExchangeId, PackageHeader};
use pricelevel::Side;
use rust_decimal::Decimal;
use tracing::debug;

/// L2 book merging equal prices across exchanges.
pub type L2AggregatedProcessor = L2MultiExchangeProcessor<Aggregated>;

/// L2 book keeping one entry per exchange and price.
pub type L2ConsolidatedProcessor = L2MultiExchangeProcessor<Consolidated>;

/// Common surface of every processor.
pub trait QuoteProcessor {
    fn quote_levels(&self) -> QuoteLevels;

    fn book_type(&self) -> BookType;

    /// Applies a vendor or periodical snapshot package.
    ///
    /// Returns whether every entry was applied.
    fn process_snapshot(
        &mut self,
        package: &PackageHeader,
        listener: &mut dyn ErrorListener,
    ) -> Result<bool, OrderBookError>;

    /// Applies an incremental update package.
    ///
    /// Returns whether every entry was applied.
    fn process_incremental(
        &mut self,
        package: &PackageHeader,
        listener: &mut dyn ErrorListener,
    ) -> Result<bool, OrderBookError>;

    /// Book-level side. For single-exchange processors, the side of that exchange.
    fn get_market_side(&self, side: Side) -> &MarketSide;

    fn get_exchanges(&self) -> &ExchangeList;

    fn is_waiting_for_snapshot(&self) -> bool;

    /// Empties the book and every exchange, restoring the initial snapshot state.
    fn clear(&mut self);

    /// Pool backing every quote of this processor.
    fn pool(&self) -> &ObjectPool<Quote>;

    fn is_empty(&self) -> bool {
        self.get_market_side(Side::Buy).is_empty() && self.get_market_side(Side::Sell).is_empty()
    }
}

/// The processor selected for a book.
#[derive(Debug)]
pub enum Processor {
    L1(L1Processor),
    L2SingleExchange(L2SingleExchangeProcessor),
    L2Aggregated(L2AggregatedProcessor),
    L2Consolidated(L2ConsolidatedProcessor),
    L3SingleExchange(L3SingleExchangeProcessor),
}

impl Processor {
    /// Validates `options` and builds the matching processor.
    pub fn from_options(options: OrderBookOptions) -> Result<Self, OrderBookError> {
        let options = options.validate()?;
        match (options.quote_levels, options.book_type) {
            (QuoteLevels::L1, BookType::SingleExchange) => {
                Ok(Processor::L1(L1Processor::new(options)))
            }
            (QuoteLevels::L2, BookType::SingleExchange) => Ok(Processor::L2SingleExchange(
                L2SingleExchangeProcessor::new(options),
            )),
            (QuoteLevels::L2, BookType::Aggregated) => {
                Ok(Processor::L2Aggregated(L2AggregatedProcessor::new(options)))
            }
            (QuoteLevels::L2, BookType::Consolidated) => {
                Ok(Processor::L2Consolidated(L2ConsolidatedProcessor::new(options)))
            }
            (QuoteLevels::L3, BookType::SingleExchange) => Ok(Processor::L3SingleExchange(
                L3SingleExchangeProcessor::new(options),
            )),
            (quote_levels, book_type) => Err(OrderBookError::UnsupportedConfiguration {
                quote_levels,
                book_type,
            }),
        }
    }

    pub fn as_processor(&self) -> &dyn QuoteProcessor {
        match self {
            Processor::L1(processor) => processor,
            Processor::L2SingleExchange(processor) => processor,
            Processor::L2Aggregated(processor) => processor,
            Processor::L2Consolidated(processor) => processor,
            Processor::L3SingleExchange(processor) => processor,
        }
    }

    pub fn as_processor_mut(&mut self) -> &mut dyn QuoteProcessor {
        match self {
            Processor::L1(processor) => processor,
            Processor::L2SingleExchange(processor) => processor,
            Processor::L2Aggregated(processor) => processor,
            Processor::L2Consolidated(processor) => processor,
            Processor::L3SingleExchange(processor) => processor,
        }
    }
}

/// How an entry that passed validation was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryOutcome {
    Applied,
    /// Not meant for this processor.
    Ignored,
    /// Discarded by policy.
    Dropped,
}

#[derive(Debug)]
pub(crate) enum EntryError {
    Rejected(EntryValidationCode),
    Fault(OrderBookError),
}

impl From<EntryValidationCode> for EntryError {
    fn from(code: EntryValidationCode) -> Self {
        EntryError::Rejected(code)
    }
}

impl From<OrderBookError> for EntryError {
    fn from(err: OrderBookError) -> Self {
        EntryError::Fault(err)
    }
}

pub(crate) type EntryResult = Result<EntryOutcome, EntryError>;

/// Turns an entry result into its contribution to the package result.
pub(crate) fn settle(
    result: EntryResult,
    package: &PackageHeader,
    listener: &mut dyn ErrorListener,
) -> Result<bool, OrderBookError> {
    match result {
        Ok(EntryOutcome::Applied | EntryOutcome::Ignored) => Ok(true),
        Ok(EntryOutcome::Dropped) => Ok(false),
        Err(EntryError::Rejected(code)) => {
            listener.on_error(package, code);
            Ok(false)
        }
        Err(EntryError::Fault(err)) => Err(err),
    }
}

/// Whether a reset for `model_type` concerns a processor of `level`.
#[inline]
pub(crate) fn reset_applies(model_type: DataModelType, level: DataModelType) -> bool {
    model_type == DataModelType::Max || model_type == level
}

/// Size that must be strictly positive.
#[inline]
pub(crate) fn positive_size(size: Option<Decimal>) -> Result<Decimal, EntryValidationCode> {
    match size {
        Some(size) if size > Decimal::ZERO => Ok(size),
        _ => Err(EntryValidationCode::BadSize),
    }
}

#[inline]
pub(crate) fn stamp_quote(quote: &mut Quote, package: &PackageHeader, options: &OrderBookOptions) {
    if options.store_quote_timestamps {
        quote.set_timestamps(package.timestamp, package.original_timestamp);
    }
}

pub(crate) fn new_exchange(id: ExchangeId, options: &OrderBookOptions) -> Exchange {
    Exchange::new(
        id,
        options.initial_depth,
        options.max_depth,
        options.starts_waiting(),
    )
}

/// Quotes preallocated for `exchanges` venues plus a book level when `book_level` is set.
pub(crate) fn initial_pool_size(options: &OrderBookOptions, book_level: bool) -> usize {
    let views = options.initial_exchanges_pool_size + usize::from(book_level);
    options.initial_depth.saturating_mul(2).saturating_mul(views)
}

/// Clears an exchange after a book reset and waits for its next snapshot.
pub(crate) fn reset_exchange(exchange: &mut Exchange, pool: &mut ObjectPool<Quote>) {
    exchange.clear(pool);
    exchange.set_waiting_for_snapshot(true);
    debug!("Exchange {} reset, waiting for snapshot", exchange.id());
}

/// The only venue of a single-exchange processor.
///
/// Starts as [`ExchangeId::NULL`] and binds to the first non-NULL exchange id seen.
/// Entries for any other id are rejected with [`EntryValidationCode::ExchangeIdMismatch`].
#[derive(Debug)]
pub(crate) struct SingleExchange {
    exchanges: ExchangeList,
}

impl SingleExchange {
    pub(crate) fn new(options: &OrderBookOptions) -> Self {
        let mut exchanges = ExchangeList::new(1);
        exchanges.get_or_create(ExchangeId::NULL, |id| new_exchange(id, options));
        Self { exchanges }
    }

    #[inline]
    pub(crate) fn exchange(&self) -> &Exchange {
        self.exchanges.get_at(0)
    }

    #[inline]
    pub(crate) fn exchange_mut(&mut self) -> &mut Exchange {
        self.exchanges.get_at_mut(0)
    }

    pub(crate) fn exchanges(&self) -> &ExchangeList {
        &self.exchanges
    }

    /// Resolves the venue for an entry carrying `id`.
    pub(crate) fn bind(&mut self, id: ExchangeId) -> Result<&mut Exchange, EntryValidationCode> {
        let bound = self.exchange().id();
        if !id.is_null() && id != bound {
            if !bound.is_null() {
                return Err(EntryValidationCode::ExchangeIdMismatch);
            }
            self.exchanges.rebind(bound, id);
            debug!("Single exchange book bound to {}", id);
        }
        Ok(self.exchange_mut())
    }
}
