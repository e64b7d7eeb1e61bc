//! Per-venue book state and the venue registry

use super::market_side::MarketSide;
use super::pool::ObjectPool;
use super::quote::Quote;
use crate::messages::ExchangeId;
use crate::rbtree::RBTree;
use pricelevel::Side;

/// The bid and ask sides of one venue.
#[derive(Debug, Clone)]
pub struct Exchange {
    id: ExchangeId,
    bids: MarketSide,
    asks: MarketSide,
    waiting_for_snapshot: bool,
}

impl Exchange {
    pub fn new(
        id: ExchangeId,
        initial_depth: usize,
        max_depth: usize,
        waiting_for_snapshot: bool,
    ) -> Self {
        Self {
            id,
            bids: MarketSide::new(Side::Buy, initial_depth, max_depth),
            asks: MarketSide::new(Side::Sell, initial_depth, max_depth),
            waiting_for_snapshot,
        }
    }

    #[inline]
    pub fn id(&self) -> ExchangeId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ExchangeId) {
        self.id = id;
    }

    #[inline]
    pub fn get_market_side(&self, side: Side) -> &MarketSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    pub(crate) fn get_market_side_mut(&mut self, side: Side) -> &mut MarketSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Whether incremental updates for this venue are held back until a snapshot.
    #[inline]
    pub fn is_waiting_for_snapshot(&self) -> bool {
        self.waiting_for_snapshot
    }

    pub(crate) fn set_waiting_for_snapshot(&mut self, waiting: bool) {
        self.waiting_for_snapshot = waiting;
    }

    /// Empties both sides, returning their quotes to `pool`.
    pub(crate) fn clear(&mut self, pool: &mut ObjectPool<Quote>) {
        self.bids.clear(pool);
        self.asks.clear(pool);
    }

    pub(crate) fn trim(&mut self, pool: &mut ObjectPool<Quote>) {
        self.bids.trim(pool);
        self.asks.trim(pool);
    }
}

/// Registry of venues keyed by [`ExchangeId`].
///
/// Venues live in creation order; a red-black tree maps ids to positions. Entries are
/// never removed while the book lives. Clearing a venue only empties its sides so its
/// storage is reused when the venue comes back.
#[derive(Debug)]
pub struct ExchangeList {
    exchanges: Vec<Exchange>,
    index: RBTree<ExchangeId, usize>,
}

impl ExchangeList {
    pub fn new(initial_size: usize) -> Self {
        Self {
            exchanges: Vec::with_capacity(initial_size),
            index: RBTree::with_capacity(initial_size),
        }
    }

    pub fn get(&self, id: ExchangeId) -> Option<&Exchange> {
        self.index.get(&id).map(|&position| &self.exchanges[position])
    }

    pub(crate) fn get_mut(&mut self, id: ExchangeId) -> Option<&mut Exchange> {
        match self.index.get(&id) {
            Some(&position) => Some(&mut self.exchanges[position]),
            None => None,
        }
    }

    /// Venue created `position`-th.
    ///
    /// # Panics
    /// If `position >= len()`.
    pub fn get_at(&self, position: usize) -> &Exchange {
        &self.exchanges[position]
    }

    pub(crate) fn get_at_mut(&mut self, position: usize) -> &mut Exchange {
        &mut self.exchanges[position]
    }

    /// Returns the venue for `id`, creating it with `create` on first sight.
    pub(crate) fn get_or_create<F>(&mut self, id: ExchangeId, create: F) -> &mut Exchange
    where
        F: FnOnce(ExchangeId) -> Exchange,
    {
        let position = match self.index.get(&id) {
            Some(&position) => position,
            None => {
                let position = self.exchanges.len();
                self.exchanges.push(create(id));
                self.index.put(id, position);
                position
            }
        };
        &mut self.exchanges[position]
    }

    /// Moves the venue known as `from` to id `to`. Returns false if `from` is unknown
    /// or `to` is already taken.
    pub(crate) fn rebind(&mut self, from: ExchangeId, to: ExchangeId) -> bool {
        if self.index.contains_key(&to) {
            return false;
        }
        let Some(position) = self.index.remove(&from) else {
            return false;
        };
        self.exchanges[position].set_id(to);
        self.index.put(to, position);
        true
    }

    pub fn contains(&self, id: ExchangeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of known venues, empty or not.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// True when no venue holds any quote.
    pub fn is_empty(&self) -> bool {
        self.exchanges.iter().all(Exchange::is_empty)
    }

    /// Venues in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Exchange> {
        self.exchanges.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Exchange> {
        self.exchanges.iter_mut()
    }

    /// Known venue ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ExchangeId> + '_ {
        self.index.keys().copied()
    }
}

impl<'a> IntoIterator for &'a ExchangeList {
    type Item = &'a Exchange;
    type IntoIter = std::slice::Iter<'a, Exchange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Default for ExchangeList {
    fn default() -> Self {
        Self::new(1)
    }
}
