//! Construction options for an order book

use super::error::OrderBookError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest supported depth per side.
pub const MAX_SUPPORTED_DEPTH: usize = 32767;

/// Market data model the book reconstructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteLevels {
    /// Top of book only.
    #[default]
    L1,
    /// Price levels.
    L2,
    /// Individual quotes.
    L3,
}

/// How quotes of several venues are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookType {
    #[default]
    SingleExchange,
    /// One book-level entry per price, sizes summed across venues.
    Aggregated,
    /// One book-level entry per venue and price.
    Consolidated,
}

/// Whether incremental updates wait for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateMode {
    #[default]
    WaitingForSnapshot,
    NonWaitingForSnapshot,
}

/// What to do with an insertion below the current depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapMode {
    #[default]
    Skip,
    /// Drop the entry and clear the venue.
    SkipAndDrop,
    /// Fill the missing levels with copies of the incoming quote.
    FillGap,
}

/// What to do with an insertion at or beyond the maximum depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnreachableDepthMode {
    #[default]
    Skip,
    /// Drop the entry and clear the venue.
    SkipAndDrop,
}

/// Which periodical snapshots are applied. Vendor snapshots always are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodicalSnapshotMode {
    #[default]
    ProcessAll,
    /// Only while the venue waits for a snapshot.
    OnlyOne,
    SkipAll,
}

impl fmt::Display for QuoteLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteLevels::L1 => write!(f, "L1"),
            QuoteLevels::L2 => write!(f, "L2"),
            QuoteLevels::L3 => write!(f, "L3"),
        }
    }
}

impl fmt::Display for BookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookType::SingleExchange => write!(f, "Single exchange"),
            BookType::Aggregated => write!(f, "Aggregated"),
            BookType::Consolidated => write!(f, "Consolidated"),
        }
    }
}

/// Immutable options snapshot an [`crate::OrderBook`] is created from.
///
/// ```
/// use quotebook_rs::{BookType, GapMode, OrderBookOptions, QuoteLevels};
///
/// let options = OrderBookOptions::new()
///     .with_symbol("AAPL")
///     .with_quote_levels(QuoteLevels::L2)
///     .with_book_type(BookType::Aggregated)
///     .with_gap_mode(GapMode::FillGap)
///     .with_max_depth(10);
/// assert_eq!(options.max_depth, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderBookOptions {
    /// Packages for other symbols are ignored when set.
    pub symbol: Option<String>,
    pub quote_levels: QuoteLevels,
    pub book_type: BookType,
    pub update_mode: UpdateMode,
    pub gap_mode: GapMode,
    pub unreachable_depth_mode: UnreachableDepthMode,
    pub periodical_snapshot_mode: PeriodicalSnapshotMode,
    /// Preallocated levels per side.
    pub initial_depth: usize,
    pub max_depth: usize,
    /// Preallocated venues.
    pub initial_exchanges_pool_size: usize,
    /// Copy package timestamps onto quotes.
    pub store_quote_timestamps: bool,
    /// Put a venue cleared by a SKIP_AND_DROP policy back into waiting for snapshot.
    pub wait_for_snapshot_after_drop: bool,
    /// When a full venue side evicts its worst quote, remove that quote from the
    /// book level of a multi-exchange book as well.
    pub evict_book_level_with_exchange: bool,
}

impl Default for OrderBookOptions {
    fn default() -> Self {
        Self {
            symbol: None,
            quote_levels: QuoteLevels::L1,
            book_type: BookType::SingleExchange,
            update_mode: UpdateMode::WaitingForSnapshot,
            gap_mode: GapMode::Skip,
            unreachable_depth_mode: UnreachableDepthMode::Skip,
            periodical_snapshot_mode: PeriodicalSnapshotMode::ProcessAll,
            initial_depth: 256,
            max_depth: MAX_SUPPORTED_DEPTH,
            initial_exchanges_pool_size: 1,
            store_quote_timestamps: false,
            wait_for_snapshot_after_drop: false,
            evict_book_level_with_exchange: true,
        }
    }
}

impl OrderBookOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, OrderBookError> {
        serde_json::from_str(json).map_err(|err| OrderBookError::InvalidConfiguration {
            message: err.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, OrderBookError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| OrderBookError::Serialization(err.to_string()))
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(symbol.to_string());
        self
    }

    pub fn with_quote_levels(mut self, quote_levels: QuoteLevels) -> Self {
        self.quote_levels = quote_levels;
        self
    }

    pub fn with_book_type(mut self, book_type: BookType) -> Self {
        self.book_type = book_type;
        self
    }

    pub fn with_update_mode(mut self, update_mode: UpdateMode) -> Self {
        self.update_mode = update_mode;
        self
    }

    pub fn with_gap_mode(mut self, gap_mode: GapMode) -> Self {
        self.gap_mode = gap_mode;
        self
    }

    pub fn with_unreachable_depth_mode(mut self, mode: UnreachableDepthMode) -> Self {
        self.unreachable_depth_mode = mode;
        self
    }

    pub fn with_periodical_snapshot_mode(mut self, mode: PeriodicalSnapshotMode) -> Self {
        self.periodical_snapshot_mode = mode;
        self
    }

    pub fn with_initial_depth(mut self, initial_depth: usize) -> Self {
        self.initial_depth = initial_depth;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_initial_exchanges_pool_size(mut self, size: usize) -> Self {
        self.initial_exchanges_pool_size = size;
        self
    }

    pub fn with_quote_timestamps(mut self, store: bool) -> Self {
        self.store_quote_timestamps = store;
        self
    }

    pub fn with_wait_for_snapshot_after_drop(mut self, wait: bool) -> Self {
        self.wait_for_snapshot_after_drop = wait;
        self
    }

    pub fn with_evict_book_level_with_exchange(mut self, evict: bool) -> Self {
        self.evict_book_level_with_exchange = evict;
        self
    }

    /// Checks the depth settings and returns the options the book will run with.
    ///
    /// `initial_depth` is clamped to `max_depth`; an L1 book always has depth one.
    pub fn validate(mut self) -> Result<Self, OrderBookError> {
        if self.max_depth == 0 || self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(OrderBookError::InvalidConfiguration {
                message: format!(
                    "max_depth must be within 1..={}, got {}",
                    MAX_SUPPORTED_DEPTH, self.max_depth
                ),
            });
        }
        if self.initial_exchanges_pool_size == 0 {
            return Err(OrderBookError::InvalidConfiguration {
                message: "initial_exchanges_pool_size must be at least 1".to_string(),
            });
        }
        if self.quote_levels == QuoteLevels::L1 {
            self.max_depth = 1;
        }
        self.initial_depth = self.initial_depth.min(self.max_depth);
        Ok(self)
    }

    /// Whether snapshots of `package_type` are applied to a venue in the given state.
    pub(crate) fn accepts_snapshot(
        &self,
        package_type: crate::messages::PackageType,
        waiting_for_snapshot: bool,
    ) -> bool {
        use crate::messages::PackageType;
        match (package_type, self.periodical_snapshot_mode) {
            (PackageType::PeriodicalSnapshot, PeriodicalSnapshotMode::SkipAll) => false,
            (PackageType::PeriodicalSnapshot, PeriodicalSnapshotMode::OnlyOne) => {
                waiting_for_snapshot
            }
            _ => true,
        }
    }

    /// Whether incremental updates are dropped for a venue in the given state.
    #[inline]
    pub(crate) fn drops_incremental(&self, waiting_for_snapshot: bool) -> bool {
        waiting_for_snapshot && self.update_mode == UpdateMode::WaitingForSnapshot
    }

    #[inline]
    pub(crate) fn starts_waiting(&self) -> bool {
        self.update_mode == UpdateMode::WaitingForSnapshot
    }
}
