use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use order_book_engine::auction::{clear_batch, pre_auction_snapshot, pre_mid};
use order_book_engine::fill::Fill;
use order_book_engine::io::{read_orders, write_fills, write_quotes};
use order_book_engine::order::{OrderKind, OrderRequest};
use order_book_engine::orderbook::OrderBook;
use order_book_engine::quote::Quote;

/// Drive the matching core end to end: read an order CSV, run one mode,
/// write the resulting trades and quotes CSVs.
#[derive(Parser)]
#[command(name = "sim")]
#[command(version = "0.1", about = "Continuous book / batch auction simulator")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation over an order CSV.
    Run {
        /// Order stream CSV: timestamp, order_id, type, side, price, qty.
        #[arg(long)]
        input: PathBuf,

        /// Matching mode.
        #[arg(long, value_enum)]
        mode: Mode,

        /// Batch interval in milliseconds (batch mode only).
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,

        /// Tick size, as ticks (1 = smallest unit of the price grid).
        #[arg(long, default_value_t = 1)]
        tick: i64,

        /// Output directory for trades.csv and quotes.csv.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum Mode {
    Clob,
    Batch,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let Commands::Run {
        input,
        mode,
        interval_ms,
        tick,
        out,
    } = cli.command;

    let orders = read_orders(&input)?;
    std::fs::create_dir_all(&out)?;

    let (fills, quotes) = match mode {
        Mode::Clob => run_continuous(orders),
        Mode::Batch => run_batch(orders, interval_ms, tick),
    };

    write_fills(&out.join("trades.csv"), &fills)?;
    write_quotes(&out.join("quotes.csv"), &quotes)?;

    tracing::info!(
        trades = fills.len(),
        quotes = quotes.len(),
        "simulation complete"
    );
    Ok(())
}

fn run_continuous(orders: Vec<OrderRequest>) -> (Vec<Fill>, Vec<Quote>) {
    let mut book = OrderBook::new();
    let mut quotes = Vec::with_capacity(orders.len());

    for req in orders {
        match req.kind() {
            OrderKind::Cancel => {
                let target_id = match req {
                    OrderRequest::Cancel { target_id, .. } => target_id,
                    _ => unreachable!(),
                };
                book.cancel_order(target_id);
            }
            _ => {
                let order_id = req.id();
                if let Err(err) = book.add_order(req) {
                    tracing::error!(order_id, %err, "rejected order, stopping run");
                    break;
                }
            }
        }
        quotes.push(book.snapshot());
    }

    (book.trade_log().to_vec(), quotes)
}

fn run_batch(orders: Vec<OrderRequest>, interval_ms: u64, tick: i64) -> (Vec<Fill>, Vec<Quote>) {
    let bucket_ns = interval_ms.saturating_mul(1_000_000).max(1);

    let mut batches: std::collections::BTreeMap<u64, Vec<OrderRequest>> = Default::default();
    for req in orders {
        let bucket = req.timestamp() / bucket_ns;
        batches.entry(bucket).or_default().push(req);
    }

    let mut all_fills = Vec::new();
    let mut all_quotes = Vec::new();

    for (_bucket, batch_orders) in batches {
        let snapshot = pre_auction_snapshot(&batch_orders);
        let reference_mid = pre_mid(snapshot);
        let (_price, fills) = clear_batch(&batch_orders, reference_mid, tick);

        if snapshot.bid.is_some() && snapshot.ask.is_some() {
            all_quotes.push(snapshot);
        }
        all_fills.extend(fills);
    }

    (all_fills, all_quotes)
}
