//! Batch acquisition of quotes over many items.
//!
//! `BatchAcquisition::acquire` resolves every listing once, then either answers from the
//! previous cache (offline) or queries the order book item by item (online). Online runs
//! write the working cache to disk before every cooldown, so a process killed while
//! sleeping loses at most the entries fetched since the last checkpoint. The final cache
//! is written once more at the end and must cover every requested listing. A stop request
//! seen between two items also writes the working cache before the run ends.
use booster_common::{BoosterError, BoosterItem, Quote, QuoteCache, Result};
use log::{debug, info, warn};

use crate::cache::{QuoteSnapshot, trim};
use crate::fetcher::OrderBookSource;
use crate::resolver::IdResolver;
use crate::schedule::{RateLimitSchedule, Sleeper};

/// Outcome of an acquisition run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Acquisition {
    /// Quotes keyed by listing hash.
    ///
    /// Online, this is the merged cache that was persisted, including listings from
    /// earlier runs. Offline, it holds exactly the requested listings that were cached.
    pub cache: QuoteCache,
    /// Requested items without a cached quote in an offline run. Always empty online.
    pub missing_offline: Vec<BoosterItem>,
}

/// Drives the order-book source over a list of items under a rate-limit schedule.
pub struct BatchAcquisition<F, R, S, W>
where
    F: OrderBookSource,
    R: IdResolver,
    S: QuoteSnapshot,
    W: Sleeper,
{
    source: F,
    resolver: R,
    snapshot: S,
    schedule: RateLimitSchedule<W>,
}

impl<F, R, S, W> BatchAcquisition<F, R, S, W>
where
    F: OrderBookSource,
    R: IdResolver,
    S: QuoteSnapshot,
    W: Sleeper,
{
    /// Creates a controller owning its collaborators for one run.
    pub fn new(source: F, resolver: R, snapshot: S, schedule: RateLimitSchedule<W>) -> Self {
        Self {
            source,
            resolver,
            snapshot,
            schedule,
        }
    }

    /// Order-book source.
    pub fn source(&self) -> &F {
        &self.source
    }

    /// Snapshot store.
    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }

    /// Rate-limit schedule.
    pub fn schedule(&self) -> &RateLimitSchedule<W> {
        &self.schedule
    }

    /// Acquires quotes for `items`, starting from `previous`.
    pub fn acquire(
        &mut self,
        items: &[BoosterItem],
        previous: QuoteCache,
        online: bool,
    ) -> Result<Acquisition> {
        let listing_hashes: Vec<&str> = items.iter().map(|i| i.listing_hash.as_str()).collect();
        let resolutions = self.resolver.resolve_batch(&listing_hashes)?;

        if !online {
            let trimmed = trim(&previous, listing_hashes.iter().copied());
            let missing_offline = items
                .iter()
                .filter(|item| trimmed.missing.contains(&item.listing_hash))
                .cloned()
                .collect();
            return Ok(Acquisition {
                cache: trimmed.cache,
                missing_offline,
            });
        }

        let mut working = previous;
        for item in items {
            if self.schedule.is_interrupted() {
                self.snapshot.save(&working)?;
                info!("Stopped before {}; quotes fetched so far are saved", item.listing_hash);
                return Err(BoosterError::Interrupted);
            }

            let resolution = resolutions
                .get(&item.listing_hash)
                .copied()
                .unwrap_or_default();

            let quote = match resolution.market_identifier {
                None => {
                    warn!(
                        "No query to download market orders for {}, because item name ID is unknown.",
                        item.listing_hash
                    );
                    Quote::unavailable(false)
                }
                Some(market_identifier) => {
                    if self.schedule.window_exhausted() {
                        self.snapshot.save(&working)?;
                        self.schedule.cool_down()?;
                    }
                    let quote = self.source.fetch(&item.listing_hash, market_identifier)?;
                    self.schedule.record_query();
                    quote.with_marketable(resolution.is_marketable)
                }
            };

            debug!("[{}] {} -> {:?}", item.item_key, item.listing_hash, quote);
            working.insert(&item.listing_hash, quote);
        }

        self.snapshot.save(&working)?;

        let coverage = trim(&working, listing_hashes.iter().copied());
        if !coverage.missing.is_empty() {
            return Err(BoosterError::CoverageViolation(coverage.missing));
        }

        info!("Acquired quotes for {} items", items.len());
        Ok(Acquisition {
            cache: working,
            missing_offline: Vec::new(),
        })
    }
}
