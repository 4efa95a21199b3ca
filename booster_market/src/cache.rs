//! Whole-file JSON snapshot of the quote cache.
//!
//! The snapshot is read entirely at the start of a run and overwritten entirely at each
//! checkpoint. The write is a plain file write followed by close; a crash in the middle
//! of it may leave a corrupt snapshot, which the next `load` reports as a JSON error.
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use booster_common::{BoosterError, QuoteCache, Result};
use log::info;

/// Persistence boundary of the quote cache.
pub trait QuoteSnapshot {
    /// Reads the last snapshot. No snapshot yields an empty cache.
    fn load(&self) -> Result<QuoteCache>;

    /// Overwrites the snapshot with `cache`.
    fn save(&self, cache: &QuoteCache) -> Result<()>;
}

/// Quote cache stored as a JSON object keyed by listing hash.
#[derive(Debug, Clone)]
pub struct JsonQuoteStore {
    path: PathBuf,
}

impl JsonQuoteStore {
    /// Store backed by the file at `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuoteSnapshot for JsonQuoteStore {
    fn load(&self) -> Result<QuoteCache> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let cache: QuoteCache = serde_json::from_str(&content)?;
                info!("Loaded {} quotes from {}", cache.len(), self.path.display());
                Ok(cache)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No quote cache found at {}", self.path.display());
                Ok(QuoteCache::new())
            }
            Err(e) => Err(BoosterError::Io(e)),
        }
    }

    fn save(&self, cache: &QuoteCache) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(cache)?;
        fs::write(&self.path, content)?;
        info!("Saved {} quotes to {}", cache.len(), self.path.display());
        Ok(())
    }
}

/// Cache restricted to the requested listings, plus the requested listings it lacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrimmedCache {
    /// Quotes of the requested listings that were present.
    pub cache: QuoteCache,
    /// Requested listings without a quote, in request order.
    pub missing: Vec<String>,
}

/// Projects `cache` down to exactly `listing_hashes`.
///
/// Missing listings are returned, not logged; the caller decides what they mean.
pub fn trim<'a, I>(cache: &QuoteCache, listing_hashes: I) -> TrimmedCache
where
    I: IntoIterator<Item = &'a str>,
{
    let mut trimmed = TrimmedCache::default();
    let mut seen = BTreeSet::new();

    for listing_hash in listing_hashes {
        if !seen.insert(listing_hash) {
            continue;
        }
        match cache.get(listing_hash) {
            Some(quote) => {
                trimmed.cache.insert(listing_hash, quote.clone());
            }
            None => trimmed.missing.push(String::from(listing_hash)),
        }
    }
    trimmed
}
