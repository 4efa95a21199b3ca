//! Quote data model and the quote cache mapping.
//!
//! A `Quote` is the best bid/ask snapshot for one listing. On disk every quote is a flat
//! record `{bid, ask, bid_volume, ask_volume, is_marketable}` where a missing side is
//! written as price `-1` and volume `-1`. In memory the missing side is an explicit `None`,
//! and a quote with neither side is `Quote::Unavailable`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel written to disk for a missing price or volume.
pub const SENTINEL: i64 = -1;

/// Best order on one side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price in the fixed market currency.
    pub price: f64,
    /// Number of units at that price.
    pub volume: i64,
}

impl PriceLevel {
    /// Creates a new price level.
    pub fn new(price: f64, volume: i64) -> Self {
        PriceLevel { price, volume }
    }
}

/// Sides of the order book that are known. At least one side is always present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Book {
    /// Only buy orders.
    Bid(PriceLevel),
    /// Only sell orders.
    Ask(PriceLevel),
    /// Both sides.
    Both {
        /// Highest buy order.
        bid: PriceLevel,
        /// Lowest sell order.
        ask: PriceLevel,
    },
}

impl Book {
    /// Book from its two optional sides; `None` when neither is known.
    pub fn from_sides(bid: Option<PriceLevel>, ask: Option<PriceLevel>) -> Option<Self> {
        match (bid, ask) {
            (Some(bid), Some(ask)) => Some(Book::Both { bid, ask }),
            (Some(bid), None) => Some(Book::Bid(bid)),
            (None, Some(ask)) => Some(Book::Ask(ask)),
            (None, None) => None,
        }
    }

    /// Highest buy order.
    pub fn bid(&self) -> Option<PriceLevel> {
        match self {
            Book::Bid(bid) | Book::Both { bid, .. } => Some(*bid),
            Book::Ask(_) => None,
        }
    }

    /// Lowest sell order.
    pub fn ask(&self) -> Option<PriceLevel> {
        match self {
            Book::Ask(ask) | Book::Both { ask, .. } => Some(*ask),
            Book::Bid(_) => None,
        }
    }
}

/// Market quote for a single listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "QuoteRecord", into = "QuoteRecord")]
pub enum Quote {
    /// No order-book data: unresolvable listing, failed request or empty book.
    Unavailable {
        /// Whether the listing can be traded at all.
        is_marketable: bool,
    },
    /// At least one side of the book is known.
    Available {
        /// Known sides of the book.
        book: Book,
        /// Whether the listing can be traded at all.
        is_marketable: bool,
    },
}

impl Quote {
    /// Builds a quote from its two sides, collapsing to `Unavailable` when both are absent.
    pub fn from_sides(bid: Option<PriceLevel>, ask: Option<PriceLevel>, is_marketable: bool) -> Self {
        match Book::from_sides(bid, ask) {
            Some(book) => Quote::Available {
                book,
                is_marketable,
            },
            None => Quote::Unavailable { is_marketable },
        }
    }

    /// Quote for a listing whose order book could not be read.
    pub fn unavailable(is_marketable: bool) -> Self {
        Quote::Unavailable { is_marketable }
    }

    /// Highest buy order.
    pub fn bid(&self) -> Option<PriceLevel> {
        match self {
            Quote::Available { book, .. } => book.bid(),
            Quote::Unavailable { .. } => None,
        }
    }

    /// Lowest sell order.
    pub fn ask(&self) -> Option<PriceLevel> {
        match self {
            Quote::Available { book, .. } => book.ask(),
            Quote::Unavailable { .. } => None,
        }
    }

    /// Whether the listing can be traded.
    pub fn is_marketable(&self) -> bool {
        match self {
            Quote::Available { is_marketable, .. } | Quote::Unavailable { is_marketable } => {
                *is_marketable
            }
        }
    }

    /// Same quote with the marketability flag replaced.
    pub fn with_marketable(self, marketable: bool) -> Self {
        match self {
            Quote::Unavailable { .. } => Quote::Unavailable {
                is_marketable: marketable,
            },
            Quote::Available { book, .. } => Quote::Available {
                book,
                is_marketable: marketable,
            },
        }
    }
}

/// Flat on-disk representation of a `Quote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuoteRecord {
    bid: f64,
    ask: f64,
    bid_volume: i64,
    ask_volume: i64,
    is_marketable: bool,
}

fn side_from_record(price: f64, volume: i64) -> Option<PriceLevel> {
    if price < 0.0 || volume < 0 {
        None
    } else {
        Some(PriceLevel::new(price, volume))
    }
}

fn side_to_record(level: Option<PriceLevel>) -> (f64, i64) {
    match level {
        Some(level) => (level.price, level.volume),
        None => (SENTINEL as f64, SENTINEL),
    }
}

impl From<QuoteRecord> for Quote {
    fn from(record: QuoteRecord) -> Self {
        Quote::from_sides(
            side_from_record(record.bid, record.bid_volume),
            side_from_record(record.ask, record.ask_volume),
            record.is_marketable,
        )
    }
}

impl From<Quote> for QuoteRecord {
    fn from(quote: Quote) -> Self {
        let (bid, bid_volume) = side_to_record(quote.bid());
        let (ask, ask_volume) = side_to_record(quote.ask());
        QuoteRecord {
            bid,
            ask,
            bid_volume,
            ask_volume,
            is_marketable: quote.is_marketable(),
        }
    }
}

/// Mapping from listing hash to its last known quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteCache {
    entries: BTreeMap<String, Quote>,
}

impl QuoteCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote stored for `listing_hash`.
    pub fn get(&self, listing_hash: &str) -> Option<&Quote> {
        self.entries.get(listing_hash)
    }

    /// Inserts or overwrites the quote of `listing_hash`.
    pub fn insert(&mut self, listing_hash: &str, quote: Quote) -> Option<Quote> {
        self.entries.insert(String::from(listing_hash), quote)
    }

    /// Whether a quote is stored for `listing_hash`.
    pub fn contains(&self, listing_hash: &str) -> bool {
        self.entries.contains_key(listing_hash)
    }

    /// Number of cached listings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(listing_hash, quote)` pairs in listing order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Quote)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, Quote)> for QuoteCache {
    fn from_iter<I: IntoIterator<Item = (String, Quote)>>(iter: I) -> Self {
        QuoteCache {
            entries: iter.into_iter().collect(),
        }
    }
}
