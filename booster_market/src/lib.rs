//! Market-data acquisition engine for Booster Packs.
//!
//! This crate wires together the building blocks of a quote acquisition run:
//!
//! - `resolver` — listing hash to market identifier lookup (`IdResolver`).
//! - `credentials` — session cookie jar with write-back of rotated tokens.
//! - `fetcher` — one order-book request per listing (`OrderBookFetcher`).
//! - `cache` — whole-file JSON snapshot of the quote cache and trimming.
//! - `schedule` — query budget counter and the cooldown wait function.
//! - `controller` — `BatchAcquisition`, which drives the fetcher over many items,
//!   checkpointing the cache before each cooldown.
//! - `creation_times` — next-eligible timestamps stored per item.
//!
//! Execution is single-threaded and blocking. The only suspension point is the cooldown
//! wait between two query windows.
#![warn(missing_docs)]
pub mod cache;
pub mod controller;
pub mod creation_times;
pub mod credentials;
pub mod fetcher;
pub mod resolver;
pub mod schedule;

pub use cache::{JsonQuoteStore, QuoteSnapshot};
pub use controller::{Acquisition, BatchAcquisition};
pub use creation_times::NextCreationTimes;
pub use credentials::{CookieJar, CredentialStore, JsonCookieStore};
pub use fetcher::{OrderBookFetcher, OrderBookSource};
pub use resolver::{IdResolver, ListingDetailsFile, Resolution};
pub use schedule::{InterruptibleSleeper, RateLimitSchedule, Sleeper, ThreadSleeper};
