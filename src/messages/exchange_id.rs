//! Compact venue identifiers packed into a `u64`.

use crate::orderbook::OrderBookError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of characters an exchange code can carry.
pub const MAX_CODE_LENGTH: usize = 10;

const BITS_PER_CHAR: u32 = 6;
const LENGTH_SHIFT: u32 = 60;
const FIRST_CHAR: u8 = 0x20;
const LAST_CHAR: u8 = 0x5F;

/// Identifier of a trading venue.
///
/// The value is an alphanumeric code of up to ten characters packed into 64 bits:
/// the code length sits in the top four bits followed by six bits per character,
/// first character most significant. `ExchangeId::NULL` marks an absent venue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExchangeId(u64);

impl ExchangeId {
    /// The "no exchange" sentinel.
    pub const NULL: ExchangeId = ExchangeId(0);

    /// Wraps an already encoded value.
    pub const fn from_raw(raw: u64) -> Self {
        ExchangeId(raw)
    }

    /// The encoded value.
    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Encodes a venue code such as `"NYSE"` or `"XNAS"`.
    ///
    /// Lower-case letters are upper-cased. The empty string encodes to [`ExchangeId::NULL`].
    pub fn from_code(code: &str) -> Result<Self, OrderBookError> {
        if code.len() > MAX_CODE_LENGTH {
            return Err(OrderBookError::InvalidExchangeCode(code.to_string()));
        }

        let mut packed: u64 = 0;
        for (index, byte) in code.bytes().enumerate() {
            let byte = byte.to_ascii_uppercase();
            if !(FIRST_CHAR..=LAST_CHAR).contains(&byte) {
                return Err(OrderBookError::InvalidExchangeCode(code.to_string()));
            }
            let shift = LENGTH_SHIFT - BITS_PER_CHAR * (index as u32 + 1);
            packed |= u64::from(byte - FIRST_CHAR) << shift;
        }

        if code.is_empty() {
            Ok(ExchangeId::NULL)
        } else {
            Ok(ExchangeId(((code.len() as u64) << LENGTH_SHIFT) | packed))
        }
    }

    /// Decodes the venue code, `None` for [`ExchangeId::NULL`].
    pub fn code(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        let length = ((self.0 >> LENGTH_SHIFT) as usize).min(MAX_CODE_LENGTH);
        let code = (0..length)
            .map(|index| {
                let shift = LENGTH_SHIFT - BITS_PER_CHAR * (index as u32 + 1);
                (((self.0 >> shift) & 0x3F) as u8 + FIRST_CHAR) as char
            })
            .collect();
        Some(code)
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(code) => write!(f, "{}", code),
            None => write!(f, "NULL"),
        }
    }
}

impl FromStr for ExchangeId {
    type Err = OrderBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExchangeId::from_code(s)
    }
}
