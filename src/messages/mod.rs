//! Already decoded market data messages consumed by the order book.

mod entry;
mod exchange_id;

pub use entry::{
    BookResetEntry, BookUpdateAction, DataModelType, InsertType, L1Entry, L2EntryNew,
    L2EntryUpdate, L3EntryNew, L3EntryUpdate, MarketEntry, QuoteUpdateAction,
};
pub use exchange_id::{ExchangeId, MAX_CODE_LENGTH};

use pricelevel::Side;
use rust_decimal::Decimal;

/// Timestamp sentinel for "not known".
pub const TIMESTAMP_UNKNOWN: i64 = i64::MIN;

/// Kind of a market data package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageType {
    /// Full book state published by the venue, usually after a reset.
    VendorSnapshot,
    /// Full book state repeated on a timer.
    PeriodicalSnapshot,
    /// Level changes since the previous package.
    IncrementalUpdate,
}

impl PackageType {
    pub fn is_snapshot(&self) -> bool {
        matches!(
            self,
            PackageType::VendorSnapshot | PackageType::PeriodicalSnapshot
        )
    }
}

/// A package of book entries for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageHeader {
    pub symbol: String,
    pub package_type: PackageType,
    pub timestamp: i64,
    pub original_timestamp: i64,
    pub entries: Vec<MarketEntry>,
}

impl PackageHeader {
    pub fn new(symbol: &str, package_type: PackageType) -> Self {
        Self {
            symbol: symbol.to_string(),
            package_type,
            timestamp: TIMESTAMP_UNKNOWN,
            original_timestamp: TIMESTAMP_UNKNOWN,
            entries: Vec::new(),
        }
    }

    pub fn with_timestamps(mut self, timestamp: i64, original_timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self.original_timestamp = original_timestamp;
        self
    }

    pub fn with_entry(mut self, entry: impl Into<MarketEntry>) -> Self {
        self.entries.push(entry.into());
        self
    }

    pub fn with_entries<I, E>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<MarketEntry>,
    {
        self.entries.extend(entries.into_iter().map(Into::into));
        self
    }
}

/// A trade print. Books do not consume trades.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeMessage {
    pub symbol: String,
    pub price: Decimal,
    pub size: Decimal,
    pub aggressor_side: Option<Side>,
    pub exchange_id: ExchangeId,
}

/// Top level message handed to [`crate::OrderBook::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum MarketMessage {
    Package(PackageHeader),
    Trade(TradeMessage),
}

impl MarketMessage {
    pub fn symbol(&self) -> &str {
        match self {
            MarketMessage::Package(package) => &package.symbol,
            MarketMessage::Trade(trade) => &trade.symbol,
        }
    }
}

impl From<PackageHeader> for MarketMessage {
    fn from(package: PackageHeader) -> Self {
        MarketMessage::Package(package)
    }
}
