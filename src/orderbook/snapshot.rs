//! Order book snapshot for market data

use super::error::OrderBookError;
use super::market_side::MarketSide;
use super::quote::Quote;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One book-level quote in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub price: Decimal,
    pub size: Decimal,
    pub number_of_orders: i64,
    /// Exchange code, absent for merged quotes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    /// Quote id of individual quotes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
}

impl From<&Quote> for QuoteSnapshot {
    fn from(quote: &Quote) -> Self {
        Self {
            price: quote.price(),
            size: quote.size(),
            number_of_orders: quote.number_of_orders(),
            exchange: quote.exchange_id().code(),
            quote_id: quote.quote_id().map(str::to_string),
        }
    }
}

/// A snapshot of the order book state at a specific point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// The symbol or identifier for this order book
    pub symbol: String,

    /// Timestamp when the snapshot was created (milliseconds since epoch)
    pub timestamp: i64,

    /// Bid levels, best first
    pub bids: Vec<QuoteSnapshot>,

    /// Ask levels, best first
    pub asks: Vec<QuoteSnapshot>,
}

impl OrderBookSnapshot {
    /// Copies up to `depth` levels of both sides.
    pub(crate) fn capture(
        symbol: &str,
        timestamp: i64,
        bids: &MarketSide,
        asks: &MarketSide,
        depth: usize,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            timestamp,
            bids: bids.iter().take(depth).map(QuoteSnapshot::from).collect(),
            asks: asks.iter().take(depth).map(QuoteSnapshot::from).collect(),
        }
    }

    /// Get the best bid price and size
    pub fn best_bid(&self) -> Option<(Decimal, Decimal)> {
        let bid = self.bids.first().map(|level| (level.price, level.size));
        trace!("best_bid: {:?}", bid);
        bid
    }

    /// Get the best ask price and size
    pub fn best_ask(&self) -> Option<(Decimal, Decimal)> {
        let ask = self.asks.first().map(|level| (level.price, level.size));
        trace!("best_ask: {:?}", ask);
        ask
    }

    /// Get the mid price (average of best bid and best ask)
    pub fn mid_price(&self) -> Option<Decimal> {
        let mid_price = match (self.best_bid(), self.best_ask()) {
            (Some((bid_price, _)), Some((ask_price, _))) => {
                Some((bid_price + ask_price) / Decimal::TWO)
            }
            _ => None,
        };
        trace!("mid_price: {:?}", mid_price);
        mid_price
    }

    /// Get the spread (best ask - best bid)
    pub fn spread(&self) -> Option<Decimal> {
        let spread = match (self.best_bid(), self.best_ask()) {
            (Some((bid_price, _)), Some((ask_price, _))) => Some(ask_price - bid_price),
            _ => None,
        };
        trace!("spread: {:?}", spread);
        spread
    }

    /// Calculate the total volume on the bid side
    pub fn total_bid_volume(&self) -> Decimal {
        let volume = self.bids.iter().map(|level| level.size).sum();
        trace!("total_bid_volume: {:?}", volume);
        volume
    }

    /// Calculate the total volume on the ask side
    pub fn total_ask_volume(&self) -> Decimal {
        let volume = self.asks.iter().map(|level| level.size).sum();
        trace!("total_ask_volume: {:?}", volume);
        volume
    }

    pub fn to_json(&self) -> Result<String, OrderBookError> {
        serde_json::to_string(self).map_err(|err| OrderBookError::Serialization(err.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, OrderBookError> {
        serde_json::from_str(json).map_err(|err| OrderBookError::Serialization(err.to_string()))
    }
}
