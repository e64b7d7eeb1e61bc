//! Order book error types

use super::options::{BookType, QuoteLevels};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur within the OrderBook
#[derive(Debug)]
pub enum OrderBookError {
    /// Options rejected by validation or unreadable options input
    InvalidConfiguration {
        /// Description of the error
        message: String,
    },

    /// No processor exists for this quote level and book type
    UnsupportedConfiguration {
        quote_levels: QuoteLevels,
        book_type: BookType,
    },

    /// Exchange code that cannot be packed into an exchange id
    InvalidExchangeCode(String),

    /// Book state contradicts itself
    BrokenInvariant {
        /// Description of the error
        message: String,
    },

    /// A package could not be applied; carries the book state at the time of failure
    UpdateFailed {
        symbol: String,
        bids_depth: usize,
        asks_depth: usize,
        /// Textual dump of both book-level sides
        book_state: String,
        source: Box<OrderBookError>,
    },

    /// Snapshot or options (de)serialization failed
    Serialization(String),
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::InvalidConfiguration { message } => {
                write!(f, "Invalid configuration: {}", message)
            }
            OrderBookError::UnsupportedConfiguration {
                quote_levels,
                book_type,
            } => {
                write!(
                    f,
                    "Unsupported configuration: {} quotes with {} book",
                    quote_levels, book_type
                )
            }
            OrderBookError::InvalidExchangeCode(code) => {
                write!(f, "Invalid exchange code: {:?}", code)
            }
            OrderBookError::BrokenInvariant { message } => {
                write!(f, "Broken invariant: {}", message)
            }
            OrderBookError::UpdateFailed {
                symbol,
                bids_depth,
                asks_depth,
                book_state,
                source,
            } => {
                write!(
                    f,
                    "Update failed for {} (bids depth {}, asks depth {}): {}\n{}",
                    symbol, bids_depth, asks_depth, source, book_state
                )
            }
            OrderBookError::Serialization(message) => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for OrderBookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrderBookError::UpdateFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Why a single entry of a package was rejected.
///
/// Reported to the book's [`super::ErrorListener`]; the rest of the package is still
/// processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryValidationCode {
    MissingQuoteId,
    DuplicateQuoteId,
    MissingPrice,
    BadSize,
    UnknownQuoteId,
    ModifyChangePrice,
    ModifyIncreaseSize,
    MissingExchangeId,
    ExchangeIdMismatch,
    UnsupportedUpdateAction,
    UnspecifiedSide,
    UnsupportedInsertType,
}

impl EntryValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryValidationCode::MissingQuoteId => "MISSING_QUOTE_ID",
            EntryValidationCode::DuplicateQuoteId => "DUPLICATE_QUOTE_ID",
            EntryValidationCode::MissingPrice => "MISSING_PRICE",
            EntryValidationCode::BadSize => "BAD_SIZE",
            EntryValidationCode::UnknownQuoteId => "UNKNOWN_QUOTE_ID",
            EntryValidationCode::ModifyChangePrice => "MODIFY_CHANGE_PRICE",
            EntryValidationCode::ModifyIncreaseSize => "MODIFY_INCREASE_SIZE",
            EntryValidationCode::MissingExchangeId => "MISSING_EXCHANGE_ID",
            EntryValidationCode::ExchangeIdMismatch => "EXCHANGE_ID_MISMATCH",
            EntryValidationCode::UnsupportedUpdateAction => "UNSUPPORTED_UPDATE_ACTION",
            EntryValidationCode::UnspecifiedSide => "UNSPECIFIED_SIDE",
            EntryValidationCode::UnsupportedInsertType => "UNSUPPORTED_INSERT_TYPE",
        }
    }
}

impl fmt::Display for EntryValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
