//! # Market Data Order Book Reconstruction
//!
//! An in-memory limit order book rebuilt from decoded market data: vendor and
//! periodical snapshots, incremental level inserts, updates and deletes, and book
//! resets. Callers feed packages to [`OrderBook::update`] and query best prices, depth
//! and per-exchange views.
//!
//! ## Key Features
//!
//! - **Bounded Market Sides**: each side is an array of quotes ordered best first,
//!   capped at a configured maximum depth. The worst level is evicted when a full side
//!   receives a better quote.
//!
//! - **Multi-Exchange Books**: an aggregated book merges equal prices of all venues
//!   into one level; a consolidated book keeps one level per venue and price. Every
//!   venue also keeps its own sides.
//!
//! - **Snapshot Synchronization**: incremental updates wait for a snapshot after start
//!   and after a book reset, unless configured otherwise.
//!
//! - **Configurable Policies**: gaps between levels can be skipped, dropped with the
//!   venue state, or filled. Levels beyond the maximum depth can be skipped or drop the
//!   venue state.
//!
//! - **Pooled Allocation**: quotes are recycled through an [`ObjectPool`] and the
//!   [`rbtree::RBTree`] index reuses its node slots, so a warmed-up book stops
//!   allocating on the update path.
//!
//! - **L1, L2 and L3 Views**: top of book, price levels and individual quotes indexed
//!   by quote id.
//!
//! ## Supported Configurations
//!
//! | Quote levels | Book types |
//! |--------------|-----------------------------------------------|
//! | L1           | Single exchange                               |
//! | L2           | Single exchange, Aggregated, Consolidated     |
//! | L3           | Single exchange                               |
//!
//! ## Example
//!
//! ```
//! use quotebook_rs::messages::{ExchangeId, L2EntryNew, PackageHeader, PackageType};
//! use quotebook_rs::{BookType, OrderBook, OrderBookOptions, QuoteLevels};
//! use pricelevel::Side;
//! use rust_decimal::Decimal;
//!
//! let options = OrderBookOptions::new()
//!     .with_quote_levels(QuoteLevels::L2)
//!     .with_book_type(BookType::Aggregated)
//!     .with_max_depth(10);
//! let mut book = OrderBook::from_options(options).unwrap();
//!
//! for code in ["XNAS", "BATS"] {
//!     let exchange = ExchangeId::from_code(code).unwrap();
//!     let snapshot = PackageHeader::new("AAPL", PackageType::VendorSnapshot).with_entry(
//!         L2EntryNew::new(Side::Buy, 0, Decimal::from(100), Decimal::from(5))
//!             .with_exchange_id(exchange),
//!     );
//!     assert!(book.update(&snapshot.into()).unwrap());
//! }
//!
//! let best = book.best_bid().unwrap();
//! assert_eq!(best.size(), Decimal::from(10));
//! assert_eq!(book.get_description(), "L2/Aggregated");
//! ```
//!
//! ## Threading
//!
//! Books are single-threaded: every call runs to completion on the caller's thread.
//! Share a book between threads only behind external synchronization, or run one book
//! per thread.
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] and never installs a subscriber. Rejected entries
//! are reported to the book's [`ErrorListener`]; the default one logs them at `warn`.

pub mod messages;
pub mod orderbook;
pub mod rbtree;

mod utils;

pub use orderbook::{
    BookType, EntryValidationCode, ErrorListener, Exchange, ExchangeList, GapMode,
    LoggingErrorListener, MarketSide, ObjectPool, OrderBook, OrderBookError, OrderBookOptions,
    OrderBookSnapshot, PeriodicalSnapshotMode, Quote, QuoteLevels, QuoteSnapshot,
    UnreachableDepthMode, UpdateMode,
};
pub use utils::current_time_millis;
