//! The continuous limit order book: a price-time-priority matcher.
//!
//! Bids and asks are each kept in a [`BTreeMap`] from price (in ticks) to a
//! FIFO [`VecDeque`] of resting orders at that price. The map gives O(log L)
//! access to the best price on either side with no separate heap to go
//! stale — cancelling the last order at a level simply removes the map
//! entry.

use std::collections::{BTreeMap, HashMap, VecDeque};

use tracing::{debug, info, warn};

use crate::{
    errors::OrderError,
    fill::Fill,
    order::{OrderKind, OrderRequest, Side, Ticks},
    quote::Quote,
};

/// A resting order: everything the book needs once a `LIMIT` stops
/// matching and its remainder is parked at a price level.
#[derive(Debug, Clone, Copy)]
struct RestingOrder {
    id: u64,
    remaining: u64,
}

/// Price-time-priority continuous order book for a single instrument.
#[derive(Default)]
pub struct OrderBook {
    /// Buy orders, keyed by price ascending; the best bid is the *last* key.
    bids: BTreeMap<Ticks, VecDeque<RestingOrder>>,
    /// Sell orders, keyed by price ascending; the best ask is the *first* key.
    asks: BTreeMap<Ticks, VecDeque<RestingOrder>>,
    /// `order_id -> (side, price)` for every currently resting order, used
    /// exclusively by `cancel_order`.
    index: HashMap<u64, (Side, Ticks)>,
    /// Every fill ever produced, in emission order.
    trade_log: Vec<Fill>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fill produced so far, oldest first.
    pub fn trade_log(&self) -> &[Fill] {
        &self.trade_log
    }

    /// Apply an incoming LIMIT, MARKET, or IOC order. CANCEL requests must
    /// go through [`OrderBook::cancel_order`] instead — dispatching on
    /// `req.kind()` is the ingest boundary's job, not the book's.
    ///
    /// Returns the fills produced, in the order they were generated. For a
    /// LIMIT with an unfilled remainder, the remainder is inserted as a
    /// resting order before returning.
    pub fn add_order(&mut self, req: OrderRequest) -> Result<Vec<Fill>, OrderError> {
        let id = req.id();
        let side = req
            .side()
            .expect("add_order called with a Cancel request");
        let qty = req.qty();
        if qty == 0 {
            return Err(OrderError::NonPositiveQty);
        }
        let limit_price = match req.kind() {
            OrderKind::Limit | OrderKind::Ioc => {
                Some(req.price().ok_or(OrderError::MissingPrice)?)
            }
            OrderKind::Market => None,
            OrderKind::Cancel => unreachable!("handled above"),
        };

        debug!(id, ?side, ?limit_price, qty, "matching incoming order");

        let mut remaining = qty;
        let fills = self.match_against_opposite(id, side, limit_price, &mut remaining);

        if remaining > 0 && req.kind() == OrderKind::Limit {
            let price = limit_price.expect("LIMIT always carries a price");
            self.rest(side, price, id, remaining);
        }

        self.trade_log.extend(fills.iter().copied());
        Ok(fills)
    }

    /// Remove a resting order by id. Returns `true` iff it was found —
    /// cancelling an absent id is a normal, non-erroneous outcome.
    pub fn cancel_order(&mut self, order_id: u64) -> bool {
        let Some((side, price)) = self.index.remove(&order_id) else {
            return false;
        };
        let book = self.book_mut(side);
        let Some(level) = book.get_mut(&price) else {
            return false;
        };
        if let Some(pos) = level.iter().position(|o| o.id == order_id) {
            level.remove(pos);
        }
        if level.is_empty() {
            book.remove(&price);
            warn!(order_id, price, "price level emptied by cancel");
        }
        true
    }

    /// Current best bid and best ask.
    pub fn snapshot(&self) -> Quote {
        Quote {
            bid: self.bids.keys().next_back().copied(),
            ask: self.asks.keys().next().copied(),
        }
    }

    fn book_mut(&mut self, side: Side) -> &mut BTreeMap<Ticks, VecDeque<RestingOrder>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Match an aggressor against the opposing side's best prices until it
    /// is filled, the opposing side is exhausted, or (for LIMIT/IOC) the
    /// crossing condition fails. Returns the fills produced and decrements
    /// `remaining` in place.
    fn match_against_opposite(
        &mut self,
        incoming_id: u64,
        incoming_side: Side,
        limit_price: Option<Ticks>,
        remaining: &mut u64,
    ) -> Vec<Fill> {
        let mut fills = Vec::new();
        let opposing_side = incoming_side.opposite();

        while *remaining > 0 {
            let opposing_book = self.book_mut(opposing_side);
            let best_price = match opposing_side {
                // Asks: lowest price first.
                Side::Sell => opposing_book.keys().next().copied(),
                // Bids: highest price first.
                Side::Buy => opposing_book.keys().next_back().copied(),
            };
            let Some(price) = best_price else {
                break;
            };
            if let Some(limit) = limit_price {
                let crosses = match incoming_side {
                    Side::Buy => price <= limit,
                    Side::Sell => price >= limit,
                };
                if !crosses {
                    break;
                }
            }

            let level = self
                .book_mut(opposing_side)
                .get_mut(&price)
                .expect("best_price came from this map");
            let resting = level.front_mut().expect("levels are never empty");

            let traded = (*remaining).min(resting.remaining);
            let (buyer_id, seller_id) = match incoming_side {
                Side::Buy => (incoming_id, resting.id),
                Side::Sell => (resting.id, incoming_id),
            };
            fills.push(Fill {
                buyer_id,
                seller_id,
                price,
                qty: traded,
                taker_side: incoming_side,
            });

            *remaining -= traded;
            resting.remaining -= traded;
            let resting_exhausted = resting.remaining == 0;
            let resting_id = resting.id;

            if resting_exhausted {
                level.pop_front();
                self.index.remove(&resting_id);
            }
            if level.is_empty() {
                self.book_mut(opposing_side).remove(&price);
            }
        }

        if !fills.is_empty() {
            info!(incoming_id, fills = fills.len(), "order matched");
        }
        fills
    }

    /// Park a LIMIT's unfilled remainder at the tail of its price level.
    fn rest(&mut self, side: Side, price: Ticks, id: u64, remaining: u64) {
        self.book_mut(side)
            .entry(price)
            .or_default()
            .push_back(RestingOrder { id, remaining });
        self.index.insert(id, (side, price));
    }
}
