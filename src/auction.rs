//! The periodic uniform-price batch auction clearer.
//!
//! Unlike the continuous book, this is a pure function over a fixed set of
//! orders: aggregate demand/supply at every candidate price, pick the
//! volume-maximising price (tie-breaking deterministically), then allocate
//! fills FIFO at that single price.

use tracing::debug;

use crate::{
    fill::Fill,
    order::{OrderKind, OrderRequest, Side, Ticks, MARKET_BUY_SENTINEL, MARKET_SELL_SENTINEL},
};

/// One side's order, flattened to the fields the clearer needs: its
/// normalised limit price (MARKET already mapped to a sentinel), quantity,
/// and the arrival order used to break FIFO ties.
#[derive(Debug, Clone, Copy)]
struct BatchOrder {
    order_id: u64,
    price: Ticks,
    qty: u64,
    timestamp: u64,
}

/// Find the uniform clearing price for one batch and allocate fills.
///
/// `pre_mid` is an optional external tie-break reference (typically the
/// pre-auction snapshot from [`pre_auction_snapshot`]); `tick` is the grid
/// size used to snap the tie-break midpoint when `pre_mid` is absent.
///
/// Returns `(None, vec![])` when no crossing price exists.
pub fn clear_batch(
    orders: &[OrderRequest],
    pre_mid: Option<Ticks>,
    tick: Ticks,
) -> (Option<Ticks>, Vec<Fill>) {
    let mut bids = Vec::new();
    let mut asks = Vec::new();

    for req in orders {
        // CANCEL only means something in continuous mode.
        if req.kind() == OrderKind::Cancel {
            continue;
        }
        // IOC has no "or cancel" meaning once all orders clear at once; it
        // is promoted to LIMIT explicitly, rather than folded silently into
        // the LIMIT arm below.
        let side = req.side().expect("non-Cancel orders always carry a side");
        let price = match req.kind() {
            OrderKind::Limit | OrderKind::Ioc => req.price().expect("validated at ingest"),
            OrderKind::Market => match side {
                Side::Buy => MARKET_BUY_SENTINEL,
                Side::Sell => MARKET_SELL_SENTINEL,
            },
            OrderKind::Cancel => unreachable!("filtered above"),
        };
        let flat = BatchOrder {
            order_id: req.id(),
            price,
            qty: req.qty(),
            timestamp: req.timestamp(),
        };
        match side {
            Side::Buy => bids.push(flat),
            Side::Sell => asks.push(flat),
        }
    }

    // Price-time priority within each side: best price first, then earliest
    // arrival, then smallest id, mirroring the order fills are allocated in.
    bids.sort_by(|a, b| {
        b.price
            .cmp(&a.price)
            .then(a.timestamp.cmp(&b.timestamp))
            .then(a.order_id.cmp(&b.order_id))
    });
    asks.sort_by(|a, b| {
        a.price
            .cmp(&b.price)
            .then(a.timestamp.cmp(&b.timestamp))
            .then(a.order_id.cmp(&b.order_id))
    });

    let mut bid_levels: Vec<(Ticks, u64)> = Vec::new();
    for b in &bids {
        aggregate(&mut bid_levels, b.price, b.qty);
    }
    let mut ask_levels: Vec<(Ticks, u64)> = Vec::new();
    for a in &asks {
        aggregate(&mut ask_levels, a.price, a.qty);
    }

    // MARKET sentinels participate in the demand/supply aggregates above but
    // must never be offered as a candidate clearing price — a MARKET BUY's
    // "willing to pay anything" is not a price anyone should actually clear
    // at.
    let mut candidates: Vec<Ticks> = bid_levels
        .iter()
        .map(|(p, _)| *p)
        .chain(ask_levels.iter().map(|(p, _)| *p))
        .filter(|p| *p != MARKET_BUY_SENTINEL && *p != MARKET_SELL_SENTINEL)
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    if candidates.is_empty() {
        return (None, Vec::new());
    }

    let mut best_volume = 0u64;
    let mut winners: Vec<Ticks> = Vec::new();

    for &p in &candidates {
        let demand: u64 = bid_levels
            .iter()
            .filter(|(px, _)| *px >= p)
            .map(|(_, q)| q)
            .sum();
        let supply: u64 = ask_levels
            .iter()
            .filter(|(px, _)| *px <= p)
            .map(|(_, q)| q)
            .sum();
        let volume = demand.min(supply);

        match volume.cmp(&best_volume) {
            std::cmp::Ordering::Greater => {
                best_volume = volume;
                winners.clear();
                winners.push(p);
            }
            std::cmp::Ordering::Equal if volume > 0 => winners.push(p),
            _ => {}
        }
    }

    if best_volume == 0 {
        return (None, Vec::new());
    }

    let clearing_price = select_clearing_price(&winners, pre_mid, tick);
    debug!(clearing_price, best_volume, "batch cleared");

    let fills = allocate_fills(&bids, &asks, clearing_price, best_volume);
    (Some(clearing_price), fills)
}

fn aggregate(levels: &mut Vec<(Ticks, u64)>, price: Ticks, qty: u64) {
    match levels.iter_mut().find(|(p, _)| *p == price) {
        Some((_, q)) => *q += qty,
        None => levels.push((price, qty)),
    }
}

/// Pick a single price out of a tied volume-maximising plateau.
fn select_clearing_price(winners: &[Ticks], pre_mid: Option<Ticks>, tick: Ticks) -> Ticks {
    if winners.len() == 1 {
        return winners[0];
    }
    match pre_mid {
        Some(mid) => {
            // Widen to i128: a caller-supplied pre_mid far from the winners
            // band should never overflow the distance calculation.
            let mid = mid as i128;
            let min_dist = winners
                .iter()
                .map(|&p| (p as i128 - mid).abs())
                .min()
                .unwrap();
            winners
                .iter()
                .copied()
                .filter(|&p| (p as i128 - mid).abs() == min_dist)
                .min()
                .unwrap()
        }
        None => {
            let lo = *winners.first().unwrap() as i128;
            let hi = *winners.last().unwrap() as i128;
            let tick = tick as i128;
            // round(midpoint / tick) * tick, matching Python's round() —
            // round-half-to-even on an exact tie — rather than round-half-up.
            // The midpoint need not land back in the winners set; that is
            // the intended (preserved) auction convention.
            let numerator = lo + hi; // 2x the true midpoint, kept exact.
            let denom = 2 * tick;
            let quotient = numerator.div_euclid(denom);
            let remainder = numerator.rem_euclid(denom);
            let twice_remainder = 2 * remainder;
            let rounded = match twice_remainder.cmp(&denom) {
                std::cmp::Ordering::Less => quotient,
                std::cmp::Ordering::Greater => quotient + 1,
                // Exact .5 tie: round to the even neighbour.
                std::cmp::Ordering::Equal => {
                    if quotient % 2 == 0 {
                        quotient
                    } else {
                        quotient + 1
                    }
                }
            };
            (rounded * tick) as Ticks
        }
    }
}

/// Walk both sides with two cursors, emitting fills until `target_vol` is
/// reached. Both slices are assumed already sorted by allocation priority.
fn allocate_fills(
    bids: &[BatchOrder],
    asks: &[BatchOrder],
    price: Ticks,
    target_vol: u64,
) -> Vec<Fill> {
    let valid_bids: Vec<BatchOrder> = bids.iter().copied().filter(|b| b.price >= price).collect();
    let valid_asks: Vec<BatchOrder> = asks.iter().copied().filter(|a| a.price <= price).collect();

    let mut bid_rem: Vec<u64> = valid_bids.iter().map(|b| b.qty).collect();
    let mut ask_rem: Vec<u64> = valid_asks.iter().map(|a| a.qty).collect();

    let mut fills = Vec::new();
    let mut traded = 0u64;
    let mut bi = 0usize;
    let mut ai = 0usize;

    while traded < target_vol && bi < valid_bids.len() && ai < valid_asks.len() {
        if bid_rem[bi] == 0 {
            bi += 1;
            continue;
        }
        if ask_rem[ai] == 0 {
            ai += 1;
            continue;
        }
        let qty = bid_rem[bi].min(ask_rem[ai]).min(target_vol - traded);
        fills.push(Fill {
            buyer_id: valid_bids[bi].order_id,
            seller_id: valid_asks[ai].order_id,
            price,
            qty,
            taker_side: Side::Buy,
        });
        bid_rem[bi] -= qty;
        ask_rem[ai] -= qty;
        traded += qty;
    }

    fills
}

/// The pre-auction snapshot: best bid/ask derived from the batch's
/// LIMIT/IOC orders only, used as `pre_mid` input to [`clear_batch`].
///
/// MARKET orders are excluded — their sentinel prices would otherwise
/// dominate the reference midpoint.
pub fn pre_auction_snapshot(orders: &[OrderRequest]) -> crate::quote::Quote {
    let mut best_bid: Option<Ticks> = None;
    let mut best_ask: Option<Ticks> = None;

    for req in orders {
        if !matches!(req.kind(), OrderKind::Limit | OrderKind::Ioc) {
            continue;
        }
        let Some(side) = req.side() else { continue };
        let Some(price) = req.price() else { continue };
        match side {
            Side::Buy => best_bid = Some(best_bid.map_or(price, |b| b.max(price))),
            Side::Sell => best_ask = Some(best_ask.map_or(price, |a| a.min(price))),
        }
    }

    crate::quote::Quote {
        bid: best_bid,
        ask: best_ask,
    }
}

/// `pre_mid` for [`clear_batch`], derived from a pre-auction snapshot.
/// `None` unless both sides have a resting-style limit price.
pub fn pre_mid(snapshot: crate::quote::Quote) -> Option<Ticks> {
    match (snapshot.bid, snapshot.ask) {
        (Some(b), Some(a)) => Some((b + a).div_euclid(2)),
        _ => None,
    }
}
