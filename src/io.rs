//! CSV read/write at the process boundary.
//!
//! Everything upstream of here deals in [`OrderRequest`]/[`Fill`]/[`Quote`]
//! and integer [`Ticks`]; this module is the only place a decimal string
//! is parsed or formatted. Row-level parse failures are reported with
//! `anyhow` context (file + row number), matching the library/binary error
//! split described alongside [`crate::errors`].

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    fill::Fill,
    order::{OrderKind, OrderRequest, Side, Ticks},
    quote::Quote,
};

/// Number of decimal places the tick grid is quoted at. `0.01` per unit
/// means a tick is 1/100th of a unit, so ticks = round(decimal * 100).
const DECIMALS: u32 = 2;

fn scale() -> i64 {
    10i64.pow(DECIMALS)
}

/// Parse a decimal price string (e.g. `"100.50"`) into ticks.
pub fn parse_ticks(raw: &str) -> Result<Ticks> {
    let raw = raw.trim();
    let (whole, frac) = match raw.split_once('.') {
        Some((w, f)) => (w, f),
        None => (raw, ""),
    };
    let whole: i64 = whole.parse().with_context(|| format!("bad price: {raw}"))?;
    let frac_digits = format!("{frac:0<width$}", width = DECIMALS as usize);
    let frac_digits = &frac_digits[..DECIMALS as usize];
    let frac_val: i64 = frac_digits
        .parse()
        .with_context(|| format!("bad price: {raw}"))?;
    let sign = if whole < 0 || raw.starts_with('-') { -1 } else { 1 };
    Ok(whole * scale() + sign * frac_val)
}

/// Format ticks back into a decimal price string.
pub fn format_ticks(ticks: Ticks) -> String {
    let scale = scale();
    let whole = ticks / scale;
    let frac = (ticks % scale).abs();
    format!("{whole}.{frac:0width$}", width = DECIMALS as usize)
}

#[derive(Debug, Deserialize)]
struct OrderRow {
    timestamp: u64,
    order_id: u64,
    #[serde(rename = "type")]
    kind: String,
    side: String,
    price: String,
    qty: String,
}

/// Read the order stream CSV described at the wire boundary: header
/// `timestamp, order_id, type, side, price, qty`, with CANCEL overloading
/// `price` as the target order_id.
pub fn read_orders(path: &Path) -> Result<Vec<OrderRequest>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;

    let mut orders = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        let row: OrderRow = record.with_context(|| format!("row {} of {}", i + 2, path.display()))?;
        orders.push(parse_row(row).with_context(|| format!("row {} of {}", i + 2, path.display()))?);
    }
    Ok(orders)
}

fn parse_side(raw: &str) -> Result<Side> {
    match raw {
        "BUY" => Ok(Side::Buy),
        "SELL" => Ok(Side::Sell),
        other => bail!("unknown side: {other}"),
    }
}

fn parse_row(row: OrderRow) -> Result<OrderRequest> {
    let qty: u64 = if row.qty.is_empty() {
        0
    } else {
        row.qty.parse().context("bad qty")?
    };

    let req = match row.kind.as_str() {
        "LIMIT" => OrderRequest::Limit {
            id: row.order_id,
            side: parse_side(&row.side)?,
            price: parse_ticks(&row.price)?,
            qty,
            timestamp: row.timestamp,
        },
        "MARKET" => OrderRequest::Market {
            id: row.order_id,
            side: parse_side(&row.side)?,
            qty,
            timestamp: row.timestamp,
        },
        "IOC" => OrderRequest::Ioc {
            id: row.order_id,
            side: parse_side(&row.side)?,
            price: parse_ticks(&row.price)?,
            qty,
            timestamp: row.timestamp,
        },
        "CANCEL" => OrderRequest::Cancel {
            id: row.order_id,
            target_id: row
                .price
                .trim()
                .parse()
                .context("CANCEL row's price column must carry the target order_id")?,
            timestamp: row.timestamp,
        },
        other => bail!("unknown order type: {other}"),
    };
    Ok(req)
}

/// Order kind label as it appears in the input CSV, retained for callers
/// that re-derive it (e.g. the batch driver logging which rows it dropped).
pub fn kind_label(kind: OrderKind) -> &'static str {
    match kind {
        OrderKind::Limit => "LIMIT",
        OrderKind::Market => "MARKET",
        OrderKind::Ioc => "IOC",
        OrderKind::Cancel => "CANCEL",
    }
}

#[derive(Debug, serde::Serialize)]
struct FillRow {
    buyer_id: u64,
    seller_id: u64,
    price: String,
    qty: u64,
    taker_side: &'static str,
}

/// Write the trades CSV: header `buyer_id, seller_id, price, qty, taker_side`.
pub fn write_fills(path: &Path, fills: &[Fill]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for fill in fills {
        writer.serialize(FillRow {
            buyer_id: fill.buyer_id,
            seller_id: fill.seller_id,
            price: format_ticks(fill.price),
            qty: fill.qty,
            taker_side: match fill.taker_side {
                Side::Buy => "BUY",
                Side::Sell => "SELL",
            },
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, serde::Serialize)]
struct QuoteRow {
    bid: String,
    ask: String,
}

/// Write the quotes CSV: header `bid, ask`, empty string for a null side.
pub fn write_quotes(path: &Path, quotes: &[Quote]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for quote in quotes {
        writer.serialize(QuoteRow {
            bid: quote.bid.map(format_ticks).unwrap_or_default(),
            ask: quote.ask.map(format_ticks).unwrap_or_default(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ticks_roundtrips_two_decimal_places() {
        assert_eq!(parse_ticks("100.00").unwrap(), 10_000);
        assert_eq!(parse_ticks("99.5").unwrap(), 9_950);
        assert_eq!(parse_ticks("0.01").unwrap(), 1);
        assert_eq!(format_ticks(10_000), "100.00");
        assert_eq!(format_ticks(9_950), "99.50");
        assert_eq!(format_ticks(1), "0.01");
    }

    #[test]
    fn parse_ticks_handles_bare_integers() {
        assert_eq!(parse_ticks("100").unwrap(), 10_000);
    }

    #[test]
    fn parse_ticks_handles_negative_values() {
        assert_eq!(parse_ticks("-1.50").unwrap(), -150);
    }

    #[test]
    fn read_orders_round_trips_through_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(
            &path,
            "timestamp,order_id,type,side,price,qty\n\
             1,1,LIMIT,SELL,100.00,10\n\
             2,2,LIMIT,BUY,100.00,5\n\
             3,3,CANCEL,,1,\n",
        )
        .unwrap();

        let orders = read_orders(&path).unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].kind(), OrderKind::Limit);
        assert_eq!(orders[2].kind(), OrderKind::Cancel);
        match orders[2] {
            OrderRequest::Cancel { target_id, .. } => assert_eq!(target_id, 1),
            _ => panic!("expected Cancel"),
        }
    }

    #[test]
    fn write_fills_then_write_quotes_produce_expected_headers() {
        let dir = tempfile::tempdir().unwrap();
        let trades_path = dir.path().join("trades.csv");
        let quotes_path = dir.path().join("quotes.csv");

        write_fills(
            &trades_path,
            &[Fill {
                buyer_id: 1,
                seller_id: 2,
                price: 10_000,
                qty: 5,
                taker_side: Side::Buy,
            }],
        )
        .unwrap();
        write_quotes(
            &quotes_path,
            &[Quote {
                bid: Some(10_000),
                ask: None,
            }],
        )
        .unwrap();

        let trades = std::fs::read_to_string(&trades_path).unwrap();
        assert!(trades.starts_with("buyer_id,seller_id,price,qty,taker_side\n"));
        assert!(trades.contains("1,2,100.00,5,BUY"));

        let quotes = std::fs::read_to_string(&quotes_path).unwrap();
        assert!(quotes.starts_with("bid,ask\n"));
        assert!(quotes.contains("100.00,"));
    }
}
