//! End-to-end: a small order CSV through the continuous book, written back
//! out as trades/quotes CSVs, matching the wire format described at the
//! I/O boundary.

use order_book_engine::io::{read_orders, write_fills, write_quotes};
use order_book_engine::order::OrderKind;
use order_book_engine::orderbook::OrderBook;

#[test]
fn continuous_run_over_a_csv_produces_expected_trades() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("orders.csv");
    std::fs::write(
        &input,
        "timestamp,order_id,type,side,price,qty\n\
         1,1,LIMIT,SELL,100.00,10\n\
         2,2,LIMIT,BUY,100.00,5\n\
         3,3,CANCEL,,1,\n",
    )
    .unwrap();

    let orders = read_orders(&input).unwrap();
    assert_eq!(orders.len(), 3);

    let mut book = OrderBook::new();
    let mut quotes = Vec::new();
    for req in orders {
        if req.kind() == OrderKind::Cancel {
            if let order_book_engine::order::OrderRequest::Cancel { target_id, .. } = req {
                book.cancel_order(target_id);
            }
        } else {
            book.add_order(req).unwrap();
        }
        quotes.push(book.snapshot());
    }

    assert_eq!(book.trade_log().len(), 1);
    assert_eq!(book.trade_log()[0].qty, 5);

    let trades_path = dir.path().join("trades.csv");
    let quotes_path = dir.path().join("quotes.csv");
    write_fills(&trades_path, book.trade_log()).unwrap();
    write_quotes(&quotes_path, &quotes).unwrap();

    let trades_csv = std::fs::read_to_string(&trades_path).unwrap();
    assert!(trades_csv.contains("2,1,100.00,5,BUY"));

    let quotes_csv = std::fs::read_to_string(&quotes_path).unwrap();
    // Cancelling the only resting ask leaves both sides empty.
    assert!(quotes_csv.lines().last().unwrap() == ",");
}
