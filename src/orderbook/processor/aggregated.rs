use super::l2_multi::{BookLevelPolicy, BookSide};
use crate::messages::ExchangeId;
use crate::orderbook::options::BookType;
use crate::orderbook::pool::ObjectPool;
use crate::orderbook::quote::Quote;
use rust_decimal::Decimal;

/// One book-level quote per price, sizes and order counts summed across exchanges.
///
/// Merged quotes carry [`ExchangeId::NULL`] since they no longer belong to one venue.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aggregated;

impl BookLevelPolicy for Aggregated {
    const BOOK_TYPE: BookType = BookType::Aggregated;

    fn insert_quote(book_side: &mut BookSide, quote: &Quote, pool: &mut ObjectPool<Quote>) {
        if let Some(position) = book_side.position_by_price(quote.price()) {
            let merged = book_side.get_quote_mut(position);
            merged.set_size(merged.size() + quote.size());
            merged.set_number_of_orders(merged.number_of_orders() + quote.number_of_orders());
            return;
        }

        let position = book_side.next_position_by_price(quote.price());
        let mut merged = pool.borrow();
        merged.copy_from(quote);
        merged.set_exchange_id(ExchangeId::NULL);
        book_side.insert(position, merged);
    }

    fn remove_quote(book_side: &mut BookSide, quote: &Quote, pool: &mut ObjectPool<Quote>) {
        Self::update_quote(book_side, quote, Decimal::ZERO, 0, pool);
    }

    fn update_quote(
        book_side: &mut BookSide,
        previous: &Quote,
        size: Decimal,
        number_of_orders: i64,
        pool: &mut ObjectPool<Quote>,
    ) {
        let Some(position) = book_side.position_by_price(previous.price()) else {
            return;
        };
        let merged = book_side.get_quote_mut(position);
        merged.set_size(merged.size() - previous.size() + size);
        merged.set_number_of_orders(
            merged.number_of_orders() - previous.number_of_orders() + number_of_orders,
        );
        if merged.size() <= Decimal::ZERO {
            pool.release(book_side.remove(position));
        }
    }
}
