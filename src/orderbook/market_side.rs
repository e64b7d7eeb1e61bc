//! One side of a book: a bounded, price-ordered sequence of quotes

use super::pool::ObjectPool;
use super::quote::Quote;
use pricelevel::Side;
use rust_decimal::Decimal;
use std::fmt;

/// Bid or ask side of a book.
///
/// Level 0 is the best quote: the highest price on the bid side ([`Side::Buy`]), the
/// lowest on the ask side ([`Side::Sell`]). Quotes are owned by the side; removing one
/// hands ownership back to the caller, who returns it to the pool.
///
/// Level arguments are validated by the processors. Addressing a level outside
/// `0..depth()` is a programming error and panics.
#[derive(Debug, Clone)]
pub struct MarketSide {
    side: Side,
    quotes: Vec<Quote>,
    max_depth: usize,
}

impl MarketSide {
    pub fn new(side: Side, initial_depth: usize, max_depth: usize) -> Self {
        Self {
            side,
            quotes: Vec::with_capacity(initial_depth.min(max_depth)),
            max_depth,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.quotes.len()
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Quote at `level`.
    ///
    /// # Panics
    /// If `level >= depth()`.
    #[inline]
    pub fn get_quote(&self, level: usize) -> &Quote {
        &self.quotes[level]
    }

    #[inline]
    pub fn get(&self, level: usize) -> Option<&Quote> {
        self.quotes.get(level)
    }

    #[inline]
    pub(crate) fn get_quote_mut(&mut self, level: usize) -> &mut Quote {
        &mut self.quotes[level]
    }

    pub fn best_quote(&self) -> Option<&Quote> {
        self.quotes.first()
    }

    pub fn worst_quote(&self) -> Option<&Quote> {
        self.quotes.last()
    }

    #[inline]
    pub fn has_level(&self, level: usize) -> bool {
        level < self.quotes.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.quotes.len() >= self.max_depth
    }

    /// Whether inserting at `level` would leave levels in between undefined.
    #[inline]
    pub fn is_gap(&self, level: usize) -> bool {
        level > self.quotes.len()
    }

    /// Whether price `a` ranks strictly before price `b` on this side.
    #[inline]
    pub fn is_better(&self, a: Decimal, b: Decimal) -> bool {
        match self.side {
            Side::Buy => a > b,
            Side::Sell => a < b,
        }
    }

    /// First level holding `price`, if any.
    pub fn binary_search_level_by_price(&self, price: Decimal) -> Option<usize> {
        let level = self.binary_search_first_level_by_price(price);
        self.quotes
            .get(level)
            .filter(|quote| quote.price() == price)
            .map(|_| level)
    }

    /// Level right after every quote priced at or better than `price`.
    ///
    /// Inserting there puts a new quote behind existing quotes of the same price.
    pub fn binary_search_next_level_by_price(&self, price: Decimal) -> usize {
        self.quotes
            .partition_point(|quote| !self.is_better(price, quote.price()))
    }

    /// Level of the first quote not priced better than `price`.
    ///
    /// Inserting there puts a new quote ahead of existing quotes of the same price.
    pub fn binary_search_first_level_by_price(&self, price: Decimal) -> usize {
        self.quotes
            .partition_point(|quote| self.is_better(quote.price(), price))
    }

    /// Inserts `quote` at `level`, shifting worse levels down by one.
    pub fn add(&mut self, level: usize, quote: Quote) {
        self.quotes.insert(level, quote);
    }

    pub fn add_last(&mut self, quote: Quote) {
        self.quotes.push(quote);
    }

    /// Removes the quote at `level`, shifting worse levels up by one.
    pub fn remove(&mut self, level: usize) -> Quote {
        self.quotes.remove(level)
    }

    pub fn remove_worst_quote(&mut self) -> Option<Quote> {
        self.quotes.pop()
    }

    /// Removes every quote matching `predicate`, returning them to `pool`.
    ///
    /// Returns the number of quotes removed.
    pub fn remove_where<F>(&mut self, pool: &mut ObjectPool<Quote>, mut predicate: F) -> usize
    where
        F: FnMut(&Quote) -> bool,
    {
        let before = self.quotes.len();
        let mut level = 0;
        while level < self.quotes.len() {
            if predicate(&self.quotes[level]) {
                pool.release(self.quotes.remove(level));
            } else {
                level += 1;
            }
        }
        before - self.quotes.len()
    }

    /// Drops quotes beyond `max_depth`, returning them to `pool`.
    pub fn trim(&mut self, pool: &mut ObjectPool<Quote>) {
        if self.quotes.len() > self.max_depth {
            pool.release_all(self.quotes.drain(self.max_depth..));
        }
    }

    /// Removes every quote, returning them to `pool`.
    pub fn clear(&mut self, pool: &mut ObjectPool<Quote>) {
        pool.release_all(self.quotes.drain(..));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.quotes.iter()
    }

    /// Sum of sizes over every level.
    pub fn total_size(&self) -> Decimal {
        self.quotes.iter().map(Quote::size).sum()
    }

    /// Whether prices move strictly away from the best level.
    pub fn is_strictly_ordered(&self) -> bool {
        self.quotes
            .windows(2)
            .all(|pair| self.is_better(pair[0].price(), pair[1].price()))
    }

    /// Whether prices never move towards the best level. Equal prices are allowed.
    pub fn is_ordered(&self) -> bool {
        self.quotes
            .windows(2)
            .all(|pair| !self.is_better(pair[1].price(), pair[0].price()))
    }
}

impl<'a> IntoIterator for &'a MarketSide {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for MarketSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.side {
            Side::Buy => "BID",
            Side::Sell => "ASK",
        };
        write!(f, "{} depth={}", name, self.quotes.len())?;
        for (level, quote) in self.quotes.iter().enumerate() {
            write!(f, "\n  [{}] {}", level, quote)?;
        }
        Ok(())
    }
}
