use super::l2_multi::{BookLevelPolicy, BookSide};
use crate::messages::ExchangeId;
use crate::orderbook::market_side::MarketSide;
use crate::orderbook::options::BookType;
use crate::orderbook::pool::ObjectPool;
use crate::orderbook::quote::Quote;
use rust_decimal::Decimal;

/// One book-level quote per exchange quote. Equal prices keep arrival order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Consolidated;

impl Consolidated {
    /// Position holding the contribution of `quote`.
    ///
    /// Prefers an entry that still matches the quote exactly, so equal-priced quotes
    /// of one exchange stay paired with their own book-level entry.
    fn find_position(book_side: &BookSide, quote: &Quote) -> Option<usize> {
        let first = book_side.first_position_by_price(quote.price());
        let mut fallback = None;
        for position in first..book_side.len() {
            let candidate = book_side.get_quote(position);
            if candidate.price() != quote.price() {
                break;
            }
            if candidate.exchange_id() != quote.exchange_id() {
                continue;
            }
            if candidate.size() == quote.size()
                && candidate.number_of_orders() == quote.number_of_orders()
            {
                return Some(position);
            }
            fallback.get_or_insert(position);
        }
        fallback
    }
}

impl BookLevelPolicy for Consolidated {
    const BOOK_TYPE: BookType = BookType::Consolidated;

    fn insert_quote(book_side: &mut BookSide, quote: &Quote, pool: &mut ObjectPool<Quote>) {
        let position = book_side.next_position_by_price(quote.price());
        let mut entry = pool.borrow();
        entry.copy_from(quote);
        book_side.insert(position, entry);
    }

    fn remove_quote(book_side: &mut BookSide, quote: &Quote, pool: &mut ObjectPool<Quote>) {
        if let Some(position) = Self::find_position(book_side, quote) {
            pool.release(book_side.remove(position));
        }
    }

    fn update_quote(
        book_side: &mut BookSide,
        previous: &Quote,
        size: Decimal,
        number_of_orders: i64,
        _pool: &mut ObjectPool<Quote>,
    ) {
        if let Some(position) = Self::find_position(book_side, previous) {
            let entry = book_side.get_quote_mut(position);
            entry.set_size(size);
            entry.set_number_of_orders(number_of_orders);
        }
    }

    fn remove_all(
        book_side: &mut BookSide,
        _exchange_side: &MarketSide,
        exchange_id: ExchangeId,
        pool: &mut ObjectPool<Quote>,
    ) {
        book_side.remove_where(pool, |quote| quote.exchange_id() == exchange_id);
    }
}
