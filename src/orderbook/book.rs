//! Order book facade: a processor bound to an optional symbol filter

use super::error::OrderBookError;
use super::exchange::{Exchange, ExchangeList};
use super::listener::{ErrorListener, LoggingErrorListener};
use super::market_side::MarketSide;
use super::options::{BookType, OrderBookOptions, QuoteLevels};
use super::pool::ObjectPool;
use super::processor::Processor;
use super::quote::Quote;
use super::snapshot::OrderBookSnapshot;
use crate::messages::{ExchangeId, MarketMessage, PackageHeader, PackageType};
use crate::utils::current_time_millis;
use pricelevel::Side;
use std::fmt;
use tracing::trace;

/// A book reconstructed from decoded market data packages.
///
/// The book is not thread-safe. Feed it from one thread; it may be moved between
/// threads together with its error listener.
///
/// ```
/// use quotebook_rs::messages::{L2EntryNew, PackageHeader, PackageType};
/// use quotebook_rs::{BookType, OrderBook, OrderBookOptions, QuoteLevels};
/// use pricelevel::Side;
/// use rust_decimal::Decimal;
///
/// let options = OrderBookOptions::new()
///     .with_symbol("AAPL")
///     .with_quote_levels(QuoteLevels::L2)
///     .with_book_type(BookType::SingleExchange);
/// let mut book = OrderBook::from_options(options).unwrap();
///
/// let snapshot = PackageHeader::new("AAPL", PackageType::VendorSnapshot)
///     .with_entry(L2EntryNew::new(Side::Sell, 0, Decimal::from(40), Decimal::from(5)));
/// assert!(book.update(&snapshot.into()).unwrap());
/// assert_eq!(book.get_market_side(Side::Sell).depth(), 1);
/// ```
pub struct OrderBook {
    symbol: Option<String>,
    options: OrderBookOptions,
    processor: Processor,
    listener: Box<dyn ErrorListener + Send>,
}

impl OrderBook {
    /// Creates a book from validated options.
    pub fn from_options(options: OrderBookOptions) -> Result<Self, OrderBookError> {
        let options = options.validate()?;
        let processor = Processor::from_options(options.clone())?;
        trace!(
            "Order book {}: created {}/{}",
            options.symbol.as_deref().unwrap_or("*"),
            options.quote_levels,
            options.book_type
        );
        Ok(Self {
            symbol: options.symbol.clone(),
            options,
            processor,
            listener: Box::new(LoggingErrorListener),
        })
    }

    /// Replaces the listener receiving rejected entries.
    pub fn with_error_listener<L>(mut self, listener: L) -> Self
    where
        L: ErrorListener + Send + 'static,
    {
        self.set_error_listener(listener);
        self
    }

    pub fn set_error_listener<L>(&mut self, listener: L)
    where
        L: ErrorListener + Send + 'static,
    {
        self.listener = Box::new(listener);
    }

    /// Applies a market data message.
    ///
    /// Returns `Ok(false)` for trades and for packages of another symbol, otherwise
    /// whether every entry of the package was applied. An error means the book state
    /// is inconsistent; it carries the state of both sides.
    pub fn update(&mut self, message: &MarketMessage) -> Result<bool, OrderBookError> {
        match message {
            MarketMessage::Package(package) => self.update_package(package),
            MarketMessage::Trade(_) => {
                trace!("Order book: ignoring trade for {}", message.symbol());
                Ok(false)
            }
        }
    }

    /// Applies a market data package.
    pub fn update_package(&mut self, package: &PackageHeader) -> Result<bool, OrderBookError> {
        if let Some(symbol) = &self.symbol {
            if *symbol != package.symbol {
                trace!(
                    "Order book {}: ignoring package for {}",
                    symbol, package.symbol
                );
                return Ok(false);
            }
        }
        trace!(
            "Order book {}: {:?} package with {} entries",
            package.symbol,
            package.package_type,
            package.entries.len()
        );

        let processor = self.processor.as_processor_mut();
        let listener: &mut dyn ErrorListener = &mut *self.listener;
        let result = match package.package_type {
            PackageType::VendorSnapshot | PackageType::PeriodicalSnapshot => {
                processor.process_snapshot(package, listener)
            }
            PackageType::IncrementalUpdate => processor.process_incremental(package, listener),
        };
        result.map_err(|source| self.update_failed(package, source))
    }

    fn update_failed(&self, package: &PackageHeader, source: OrderBookError) -> OrderBookError {
        let bids = self.get_market_side(Side::Buy);
        let asks = self.get_market_side(Side::Sell);
        OrderBookError::UpdateFailed {
            symbol: package.symbol.clone(),
            bids_depth: bids.depth(),
            asks_depth: asks.depth(),
            book_state: format!("{}\n{}", bids, asks),
            source: Box::new(source),
        }
    }

    /// Book-level side; for single-exchange books, the side of the exchange.
    pub fn get_market_side(&self, side: Side) -> &MarketSide {
        self.processor.as_processor().get_market_side(side)
    }

    pub fn get_exchanges(&self) -> &ExchangeList {
        self.processor.as_processor().get_exchanges()
    }

    pub fn get_exchange(&self, id: ExchangeId) -> Option<&Exchange> {
        self.get_exchanges().get(id)
    }

    pub fn best_bid(&self) -> Option<&Quote> {
        self.get_market_side(Side::Buy).best_quote()
    }

    pub fn best_ask(&self) -> Option<&Quote> {
        self.get_market_side(Side::Sell).best_quote()
    }

    pub fn is_empty(&self) -> bool {
        self.processor.as_processor().is_empty()
    }

    pub fn is_waiting_for_snapshot(&self) -> bool {
        self.processor.as_processor().is_waiting_for_snapshot()
    }

    /// Empties the book. Exchanges go back to their initial snapshot state.
    pub fn clear(&mut self) {
        trace!("Order book {}: clear", self.get_symbol().unwrap_or("*"));
        self.processor.as_processor_mut().clear();
    }

    /// Quote level and book type, e.g. `L2/Aggregated`.
    pub fn get_description(&self) -> String {
        let processor = self.processor.as_processor();
        format!("{}/{}", processor.quote_levels(), processor.book_type())
    }

    pub fn get_symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn get_quote_levels(&self) -> QuoteLevels {
        self.processor.as_processor().quote_levels()
    }

    pub fn get_book_type(&self) -> BookType {
        self.processor.as_processor().book_type()
    }

    /// Options the book runs with, after validation.
    pub fn options(&self) -> &OrderBookOptions {
        &self.options
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    pub fn pool(&self) -> &ObjectPool<Quote> {
        self.processor.as_processor().pool()
    }

    /// Copies up to `depth` book-level quotes of each side.
    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        OrderBookSnapshot::capture(
            self.get_symbol().unwrap_or_default(),
            current_time_millis(),
            self.get_market_side(Side::Buy),
            self.get_market_side(Side::Sell),
            depth,
        )
    }
}

impl fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderBook")
            .field("symbol", &self.symbol)
            .field("description", &self.get_description())
            .field("bids_depth", &self.get_market_side(Side::Buy).depth())
            .field("asks_depth", &self.get_market_side(Side::Sell).depth())
            .finish()
    }
}

impl fmt::Display for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            self.get_symbol().unwrap_or("*"),
            self.get_description()
        )?;
        writeln!(f, "{}", self.get_market_side(Side::Buy))?;
        write!(f, "{}", self.get_market_side(Side::Sell))
    }
}
