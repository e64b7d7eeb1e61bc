//! Order book reconstruction: market sides, exchanges, processors and the facade.

pub mod book;
mod error;
mod exchange;
mod listener;
mod market_side;
mod options;
mod pool;
pub mod processor;
mod quote;
mod snapshot;

pub use book::OrderBook;
pub use error::{EntryValidationCode, OrderBookError};
pub use exchange::{Exchange, ExchangeList};
pub use listener::{ErrorListener, LoggingErrorListener};
pub use market_side::MarketSide;
pub use options::{
    BookType, GapMode, MAX_SUPPORTED_DEPTH, OrderBookOptions, PeriodicalSnapshotMode,
    QuoteLevels, UnreachableDepthMode, UpdateMode,
};
pub use pool::{ObjectPool, Poolable};
pub use processor::{Processor, QuoteProcessor};
pub use quote::Quote;
pub use snapshot::{OrderBookSnapshot, QuoteSnapshot};
