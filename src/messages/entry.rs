//! Decoded book entries carried inside a market data package

use super::exchange_id::ExchangeId;
use pricelevel::Side;
use rust_decimal::Decimal;

/// Action carried by an L2 update entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookUpdateAction {
    /// Insertion through an update entry. Books only accept insertions as [`L2EntryNew`].
    Insert,
    /// Size and order count of an existing level changed.
    Update,
    /// The level disappeared.
    Delete,
}

/// Where an L3 quote joins the queue of its price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertType {
    #[default]
    AddBack,
    AddFront,
    AddBefore,
}

/// Action carried by an L3 update entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteUpdateAction {
    Cancel,
    Modify,
    Replace,
}

/// Data model a book reset applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataModelType {
    Level1,
    Level2,
    Level3,
    /// Every model level.
    #[default]
    Max,
}

/// Top of book for one side of one exchange.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct L1Entry {
    pub side: Option<Side>,
    pub price: Option<Decimal>,
    pub size: Option<Decimal>,
    pub number_of_orders: i64,
    pub exchange_id: ExchangeId,
}

impl L1Entry {
    pub fn new(side: Side, price: Decimal, size: Decimal) -> Self {
        Self {
            side: Some(side),
            price: Some(price),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn with_number_of_orders(mut self, number_of_orders: i64) -> Self {
        self.number_of_orders = number_of_orders;
        self
    }

    pub fn with_exchange_id(mut self, exchange_id: ExchangeId) -> Self {
        self.exchange_id = exchange_id;
        self
    }
}

/// A new price level inserted at `level`, shifting worse levels down.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct L2EntryNew {
    pub level: usize,
    pub side: Option<Side>,
    pub price: Option<Decimal>,
    pub size: Option<Decimal>,
    pub number_of_orders: i64,
    pub exchange_id: ExchangeId,
}

impl L2EntryNew {
    pub fn new(side: Side, level: usize, price: Decimal, size: Decimal) -> Self {
        Self {
            level,
            side: Some(side),
            price: Some(price),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn with_number_of_orders(mut self, number_of_orders: i64) -> Self {
        self.number_of_orders = number_of_orders;
        self
    }

    pub fn with_exchange_id(mut self, exchange_id: ExchangeId) -> Self {
        self.exchange_id = exchange_id;
        self
    }
}

/// Change of an existing price level addressed by `level`.
#[derive(Debug, Clone, PartialEq)]
pub struct L2EntryUpdate {
    pub level: usize,
    pub side: Option<Side>,
    /// Informational only, a level keeps its price for its whole life.
    pub price: Option<Decimal>,
    pub size: Option<Decimal>,
    pub number_of_orders: i64,
    pub exchange_id: ExchangeId,
    pub action: BookUpdateAction,
}

impl L2EntryUpdate {
    pub fn update(side: Side, level: usize, size: Decimal, number_of_orders: i64) -> Self {
        Self {
            level,
            side: Some(side),
            price: None,
            size: Some(size),
            number_of_orders,
            exchange_id: ExchangeId::NULL,
            action: BookUpdateAction::Update,
        }
    }

    pub fn delete(side: Side, level: usize) -> Self {
        Self {
            level,
            side: Some(side),
            price: None,
            size: None,
            number_of_orders: 0,
            exchange_id: ExchangeId::NULL,
            action: BookUpdateAction::Delete,
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_exchange_id(mut self, exchange_id: ExchangeId) -> Self {
        self.exchange_id = exchange_id;
        self
    }
}

/// A new individual quote.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct L3EntryNew {
    pub quote_id: Option<String>,
    pub participant_id: Option<String>,
    pub side: Option<Side>,
    pub price: Option<Decimal>,
    pub size: Option<Decimal>,
    pub exchange_id: ExchangeId,
    pub insert_type: InsertType,
}

impl L3EntryNew {
    pub fn new(quote_id: &str, side: Side, price: Decimal, size: Decimal) -> Self {
        Self {
            quote_id: Some(quote_id.to_string()),
            side: Some(side),
            price: Some(price),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn with_participant_id(mut self, participant_id: &str) -> Self {
        self.participant_id = Some(participant_id.to_string());
        self
    }

    pub fn with_insert_type(mut self, insert_type: InsertType) -> Self {
        self.insert_type = insert_type;
        self
    }

    pub fn with_exchange_id(mut self, exchange_id: ExchangeId) -> Self {
        self.exchange_id = exchange_id;
        self
    }
}

/// Cancel, modify or replace of an individual quote.
#[derive(Debug, Clone, PartialEq)]
pub struct L3EntryUpdate {
    pub quote_id: Option<String>,
    pub side: Option<Side>,
    pub price: Option<Decimal>,
    pub size: Option<Decimal>,
    pub exchange_id: ExchangeId,
    pub action: QuoteUpdateAction,
}

impl L3EntryUpdate {
    pub fn cancel(quote_id: &str, side: Side) -> Self {
        Self {
            quote_id: Some(quote_id.to_string()),
            side: Some(side),
            price: None,
            size: None,
            exchange_id: ExchangeId::NULL,
            action: QuoteUpdateAction::Cancel,
        }
    }

    pub fn modify(quote_id: &str, side: Side, price: Decimal, size: Decimal) -> Self {
        Self {
            quote_id: Some(quote_id.to_string()),
            side: Some(side),
            price: Some(price),
            size: Some(size),
            exchange_id: ExchangeId::NULL,
            action: QuoteUpdateAction::Modify,
        }
    }

    pub fn replace(quote_id: &str, side: Side, price: Decimal, size: Decimal) -> Self {
        Self {
            action: QuoteUpdateAction::Replace,
            ..Self::modify(quote_id, side, price, size)
        }
    }

    pub fn with_exchange_id(mut self, exchange_id: ExchangeId) -> Self {
        self.exchange_id = exchange_id;
        self
    }
}

/// Instructs the book to drop everything it knows about an exchange.
///
/// A NULL `exchange_id` resets every exchange.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookResetEntry {
    pub exchange_id: ExchangeId,
    pub model_type: DataModelType,
}

impl BookResetEntry {
    pub fn new(exchange_id: ExchangeId, model_type: DataModelType) -> Self {
        Self {
            exchange_id,
            model_type,
        }
    }
}

/// Any entry a package can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEntry {
    L1(L1Entry),
    L2New(L2EntryNew),
    L2Update(L2EntryUpdate),
    L3New(L3EntryNew),
    L3Update(L3EntryUpdate),
    BookReset(BookResetEntry),
}

impl From<L1Entry> for MarketEntry {
    fn from(entry: L1Entry) -> Self {
        MarketEntry::L1(entry)
    }
}

impl From<L2EntryNew> for MarketEntry {
    fn from(entry: L2EntryNew) -> Self {
        MarketEntry::L2New(entry)
    }
}

impl From<L2EntryUpdate> for MarketEntry {
    fn from(entry: L2EntryUpdate) -> Self {
        MarketEntry::L2Update(entry)
    }
}

impl From<L3EntryNew> for MarketEntry {
    fn from(entry: L3EntryNew) -> Self {
        MarketEntry::L3New(entry)
    }
}

impl From<L3EntryUpdate> for MarketEntry {
    fn from(entry: L3EntryUpdate) -> Self {
        MarketEntry::L3Update(entry)
    }
}

impl From<BookResetEntry> for MarketEntry {
    fn from(entry: BookResetEntry) -> Self {
        MarketEntry::BookReset(entry)
    }
}
