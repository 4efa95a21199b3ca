//!
//! Common types and utilities shared by the market engine and the scanner binary.
//!
//! This crate aggregates:
//! - `error` — unified error type `BoosterError` used across the workspace.
//! - `result` — handy `Result<T, BoosterError>` alias.
//! - `item` — booster pack items (item key + listing hash).
//! - `quote` — bid/ask quotes and the quote cache mapping.
//! - `net` — market endpoint and fixed locale constants.
//! - `rate_limit` — query budget and cooldown presets.
//! - `time_gate` — crafting cooldown decision for yearless timestamps.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod item;
pub mod quote;
pub mod net;
pub mod rate_limit;
pub mod time_gate;

pub use error::BoosterError;
pub use result::Result;
pub use item::BoosterItem;
pub use quote::{Book, PriceLevel, Quote, QuoteCache};
