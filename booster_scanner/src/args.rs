//! Command-line arguments for the Booster Pack scanner.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file mapping item keys (app ids) to Booster Pack listing hashes.
    #[clap(long)]
    pub items: String,

    /// Quote cache snapshot, read at start and rewritten at each checkpoint.
    #[clap(long, default_value = "data/market_orders.json")]
    pub cache: String,

    /// Table of listing hashes resolved to market identifiers.
    #[clap(long, default_value = "data/listing_details.json")]
    pub listing_details: String,

    /// Session cookie jar. Missing or empty means anonymous access.
    #[clap(long, default_value = "data/personal_info.json")]
    pub cookies: String,

    /// Next-eligible crafting timestamps per item key.
    #[clap(long, default_value = "data/next_creation_times.json")]
    pub creation_times: String,

    /// Answer from the quote cache only, without querying the market.
    #[clap(long)]
    pub offline: bool,

    /// Timeout of a single order-book request, in seconds.
    #[clap(long, default_value_t = 10)]
    pub timeout_secs: u64,
}
