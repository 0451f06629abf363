use criterion::{criterion_group, criterion_main, Criterion};
use order_book_engine::order::{OrderRequest, Side};
use order_book_engine::orderbook::OrderBook;

/// Build a book with `orders_per_level` resting orders at each of `depth`
/// price levels on both sides: asks at `[1, depth]`, bids at
/// `[depth + 1, 2 * depth]`. The two ranges never overlap while being
/// populated, so (unlike populating both sides at the same price)
/// `add_order` — which always matches, there is no raw book-insert —
/// never self-crosses them away during setup. The bid range sitting
/// above the ask range also gives the crossing-limit-sell bench below a
/// resting bid side to walk into.
fn setup_order_book(depth: i64, orders_per_level: u64) -> OrderBook {
    let mut ob = OrderBook::new();
    let mut id = 0u64;
    for price in 1..=depth {
        for _ in 0..orders_per_level {
            id += 1;
            ob.add_order(OrderRequest::Limit {
                id,
                side: Side::Sell,
                price,
                qty: 1,
                timestamp: id,
            })
            .unwrap();
        }
    }
    for price in (depth + 1)..=(2 * depth) {
        for _ in 0..orders_per_level {
            id += 1;
            ob.add_order(OrderRequest::Limit {
                id,
                side: Side::Buy,
                price,
                qty: 1,
                timestamp: id,
            })
            .unwrap();
        }
    }
    ob
}

fn bench_match_order(c: &mut Criterion) {
    let depth = 100;
    let orders_per_level = 10;
    let mut ob = setup_order_book(depth, orders_per_level);

    c.bench_function("match 1 market order", |b| {
        b.iter(|| {
            let market_buy = OrderRequest::Market {
                id: 0,
                side: Side::Buy,
                qty: depth as u64 * orders_per_level / 2,
                timestamp: 0,
            };
            ob.add_order(market_buy).unwrap();
        })
    });

    c.bench_function("match 1 limit crossing order", |b| {
        b.iter(|| {
            let limit_sell = OrderRequest::Limit {
                id: 1,
                side: Side::Sell,
                price: depth / 2,
                qty: depth as u64 * orders_per_level,
                timestamp: 1,
            };
            ob.add_order(limit_sell).unwrap();
        })
    });
}

criterion_group!(benches, bench_match_order);
criterion_main!(benches);
