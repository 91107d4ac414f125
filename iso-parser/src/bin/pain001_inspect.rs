//! Inspect a pain.001 file: detect its revision, print the group header and
//! summarise the payment instructions without loading the whole file.
//!
//! Usage: `pain001-inspect <file> [--transactions]`

use anyhow::{bail, Context};
use iso_parser::{
    DecoderMetrics, MessageDetector, NamespaceDetector, ParserConfig, VersionRegistry,
};
use prometheus::{Encoder, TextEncoder};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => bail!("usage: pain001-inspect <file> [--transactions]"),
    };
    let list_transactions = args.any(|arg| arg == "--transactions");

    let config = ParserConfig::from_env().context("reading ISO_PARSER_* settings")?;
    let file = File::open(&path).with_context(|| format!("opening {}", path))?;
    let mut source = BufReader::with_capacity(config.buffer_capacity.max(8192), file);

    let id = NamespaceDetector::with_config(config.clone()).detect(&mut source)?;
    info!(message = %id, "message type detected");

    let decoder = VersionRegistry::pain001().decoder_for(&id, &config)?;
    let metrics = Arc::new(DecoderMetrics::new()?);
    let mut reader = decoder.seekable_reader(source)?.with_metrics(metrics.clone());

    let header = reader.read_header()?;
    println!("{}", serde_json::to_string_pretty(&header)?);

    let mut instructions = 0usize;
    let mut transactions = 0usize;
    let mut total = Decimal::ZERO;
    for entry in reader.entries()? {
        let instruction = entry?;
        instructions += 1;
        transactions += instruction.transactions.len();
        total += instruction.instructed_total();

        println!(
            "{}  {} tx  {}  executes {}",
            instruction.payment_information_id,
            instruction.transactions.len(),
            instruction.instructed_total(),
            instruction.requested_execution_date.date()
        );
        if list_transactions {
            for tx in &instruction.transactions {
                println!(
                    "    {}  {}  {}",
                    tx.payment_id.end_to_end_id,
                    tx.amount,
                    tx.creditor.name.as_deref().unwrap_or("-")
                );
            }
        }
    }

    println!(
        "{} payment instructions, {} transactions, total {}",
        instructions, transactions, total
    );
    check_declared_count(header.number_of_transactions, transactions);

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metrics.registry().gather(), &mut buffer)?;
    info!(metrics = %String::from_utf8_lossy(&buffer), "decoder metrics");

    Ok(())
}

/// Warn when the header's NbOfTxs disagrees with the streamed count
fn check_declared_count(declared: u64, counted: usize) -> bool {
    let matches = declared == counted as u64;
    if !matches {
        warn!(declared, counted, "header transaction count does not match the document");
    }
    matches
}
