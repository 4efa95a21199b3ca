//! Booster Pack scanner — decides, for each followed game, whether a Booster Pack can be
//! crafted right now and what it is currently worth on the community market.
//!
//! Usage example (CLI):
//! ```bash
//! booster_scanner --items ./data/items.json
//! booster_scanner --items ./data/items.json --offline
//! ```
//!
//! The items file is a JSON object mapping app ids to listing hashes, e.g.
//! `{"290970": "290970-1849 Booster Pack"}`. Quotes are fetched under the market's rate
//! limits, and the quote cache is saved before every cooldown. Press Ctrl+C to stop; the
//! quotes fetched so far are saved before the run ends.
#![warn(missing_docs)]
mod args;

use crate::args::Args;
use booster_common::rate_limit::RateLimitPolicy;
use booster_common::{BoosterError, BoosterItem, PriceLevel, QuoteCache, Result};
use booster_market::{
    BatchAcquisition, CredentialStore, InterruptibleSleeper, JsonCookieStore, JsonQuoteStore,
    ListingDetailsFile, NextCreationTimes, OrderBookFetcher, QuoteSnapshot, RateLimitSchedule,
};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use log::{error, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

fn main() {
    init_logger();
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), BoosterError> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Saving quotes and stopping...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| BoosterError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let items_path = normalize_path(&args.items);
    if !is_file_exist(&items_path) {
        return Err(BoosterError::Format(format!(
            "items file not found: {}",
            items_path.display()
        )));
    }
    let items = BoosterItem::parse_from_json(BufReader::new(File::open(&items_path)?))?;
    info!("Items: {}", items.len());

    let store = JsonQuoteStore::new(&normalize_path(&args.cache));
    let previous = store.load()?;
    let resolver = ListingDetailsFile::load(&normalize_path(&args.listing_details))?;
    let credentials = JsonCookieStore::load(&normalize_path(&args.cookies))?;
    let policy = RateLimitPolicy::for_session(credentials.is_authenticated());
    info!(
        "Rate limits: {} queries per window, {} seconds cooldown",
        policy.max_queries_per_window,
        policy.cooldown.as_secs()
    );

    let fetcher = OrderBookFetcher::new(credentials, Duration::from_secs(args.timeout_secs))?;
    let schedule = RateLimitSchedule::new(policy, InterruptibleSleeper::new(shutdown));
    let mut batch = BatchAcquisition::new(fetcher, resolver, store, schedule);

    let acquisition = batch.acquire(&items, previous, !args.offline)?;
    for item in &acquisition.missing_offline {
        warn!(
            "[{}] No cached quote for {}; run without --offline to download it.",
            item.item_key, item.listing_hash
        );
    }

    let creation_times = NextCreationTimes::load(&normalize_path(&args.creation_times))?;
    let now = Local::now().naive_local();

    for line in report(&items, &acquisition.cache, &creation_times, now) {
        info!("{}", line);
    }
    Ok(())
}

/// One line per item with its crafting decision and quote.
///
/// An item whose stored timestamp cannot be read is logged and left out.
fn report(
    items: &[BoosterItem],
    cache: &QuoteCache,
    creation_times: &NextCreationTimes,
    now: NaiveDateTime,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let can_craft = match creation_times.can_craft(&item.item_key, now) {
            Ok(can_craft) => can_craft,
            Err(e) => {
                error!("[{}] Skipping {}: {}", item.item_key, item.listing_hash, e);
                continue;
            }
        };
        let line = match cache.get(&item.listing_hash) {
            Some(quote) => format!(
                "[{}] {} ; craftable now: {} ; marketable: {} ; ask: {} ; bid: {}",
                item.item_key,
                item.listing_hash,
                can_craft,
                quote.is_marketable(),
                describe(quote.ask()),
                describe(quote.bid()),
            ),
            None => format!(
                "[{}] {} ; craftable now: {} ; no quote",
                item.item_key, item.listing_hash, can_craft
            ),
        };
        lines.push(line);
    }
    lines
}

fn describe(level: Option<PriceLevel>) -> String {
    match level {
        Some(level) => format!("{:.2}€ ({})", level.price, level.volume),
        None => String::from("n/a"),
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &PathBuf) -> bool {
    path.exists() && path.is_file()
}
