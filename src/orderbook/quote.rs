//! Mutable quote record held by market sides

use super::pool::Poolable;
use crate::messages::{ExchangeId, TIMESTAMP_UNKNOWN};
use rust_decimal::Decimal;
use std::fmt;

/// One price level (L1/L2) or one individual order (L3) of a market side.
///
/// Quotes are recycled through an [`super::ObjectPool`]. A released quote is reset to
/// zero price and size, [`ExchangeId::NULL`], empty identifiers and
/// [`TIMESTAMP_UNKNOWN`] timestamps. Identifier strings keep their buffers across
/// reuse.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    price: Decimal,
    size: Decimal,
    number_of_orders: i64,
    exchange_id: ExchangeId,
    quote_id: String,
    participant_id: String,
    original_timestamp: i64,
    timestamp: i64,
}

impl Default for Quote {
    fn default() -> Self {
        Self {
            price: Decimal::ZERO,
            size: Decimal::ZERO,
            number_of_orders: 0,
            exchange_id: ExchangeId::NULL,
            quote_id: String::new(),
            participant_id: String::new(),
            original_timestamp: TIMESTAMP_UNKNOWN,
            timestamp: TIMESTAMP_UNKNOWN,
        }
    }
}

impl Quote {
    pub fn new(price: Decimal, size: Decimal, number_of_orders: i64) -> Self {
        Self {
            price,
            size,
            number_of_orders,
            ..Default::default()
        }
    }

    #[inline]
    pub fn price(&self) -> Decimal {
        self.price
    }

    #[inline]
    pub fn size(&self) -> Decimal {
        self.size
    }

    #[inline]
    pub fn number_of_orders(&self) -> i64 {
        self.number_of_orders
    }

    #[inline]
    pub fn exchange_id(&self) -> ExchangeId {
        self.exchange_id
    }

    pub fn quote_id(&self) -> Option<&str> {
        (!self.quote_id.is_empty()).then_some(self.quote_id.as_str())
    }

    /// Quote id as stored, used to address the quote id index.
    pub(crate) fn quote_key(&self) -> &String {
        &self.quote_id
    }

    pub fn participant_id(&self) -> Option<&str> {
        (!self.participant_id.is_empty()).then_some(self.participant_id.as_str())
    }

    pub fn original_timestamp(&self) -> i64 {
        self.original_timestamp
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn set_price(&mut self, price: Decimal) {
        self.price = price;
    }

    pub fn set_size(&mut self, size: Decimal) {
        self.size = size;
    }

    pub fn set_number_of_orders(&mut self, number_of_orders: i64) {
        self.number_of_orders = number_of_orders;
    }

    pub fn set_exchange_id(&mut self, exchange_id: ExchangeId) {
        self.exchange_id = exchange_id;
    }

    pub fn set_quote_id(&mut self, quote_id: Option<&str>) {
        self.quote_id.clear();
        if let Some(quote_id) = quote_id {
            self.quote_id.push_str(quote_id);
        }
    }

    pub fn set_participant_id(&mut self, participant_id: Option<&str>) {
        self.participant_id.clear();
        if let Some(participant_id) = participant_id {
            self.participant_id.push_str(participant_id);
        }
    }

    pub fn set_timestamps(&mut self, timestamp: i64, original_timestamp: i64) {
        self.timestamp = timestamp;
        self.original_timestamp = original_timestamp;
    }

    /// Overwrites price, size, order count and exchange in one call.
    pub fn set(
        &mut self,
        price: Decimal,
        size: Decimal,
        number_of_orders: i64,
        exchange_id: ExchangeId,
    ) {
        self.price = price;
        self.size = size;
        self.number_of_orders = number_of_orders;
        self.exchange_id = exchange_id;
    }

    /// Copies every field of `other`, reusing this quote's string buffers.
    pub fn copy_from(&mut self, other: &Quote) {
        self.price = other.price;
        self.size = other.size;
        self.number_of_orders = other.number_of_orders;
        self.exchange_id = other.exchange_id;
        self.quote_id.clone_from(&other.quote_id);
        self.participant_id.clone_from(&other.participant_id);
        self.original_timestamp = other.original_timestamp;
        self.timestamp = other.timestamp;
    }
}

impl Poolable for Quote {
    fn reset(&mut self) {
        self.price = Decimal::ZERO;
        self.size = Decimal::ZERO;
        self.number_of_orders = 0;
        self.exchange_id = ExchangeId::NULL;
        self.quote_id.clear();
        self.participant_id.clear();
        self.original_timestamp = TIMESTAMP_UNKNOWN;
        self.timestamp = TIMESTAMP_UNKNOWN;
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} ({} orders, {})",
            self.price, self.size, self.number_of_orders, self.exchange_id
        )?;
        if let Some(quote_id) = self.quote_id() {
            write!(f, " #{}", quote_id)?;
        }
        Ok(())
    }
}
