//! Listing hash to market identifier resolution.
//!
//! The order-book endpoint only accepts the numeric `item_nameid` of a listing. How those
//! identifiers are discovered is outside this crate: `IdResolver` is the seam, and
//! `ListingDetailsFile` reads a table produced beforehand.
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use booster_common::{BoosterError, Result};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

/// Outcome of resolving one listing hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Identifier required by the order-book endpoint; `None` if the listing is unknown.
    pub market_identifier: Option<u64>,
    /// Whether the listing can be traded.
    pub is_marketable: bool,
}

impl Resolution {
    /// Resolution of a listing that could not be mapped to an identifier.
    pub fn unresolved() -> Self {
        Resolution::default()
    }
}

/// Maps listing hashes to market identifiers.
pub trait IdResolver {
    /// Resolves every listing in one call. Every input key is present in the output.
    fn resolve_batch(&self, listing_hashes: &[&str]) -> Result<HashMap<String, Resolution>>;
}

#[derive(Debug, Deserialize)]
struct ListingDetails {
    #[serde(default)]
    item_nameid: Option<Value>,
    #[serde(default)]
    is_marketable: Option<bool>,
}

impl ListingDetails {
    fn market_identifier(&self) -> Option<u64> {
        match self.item_nameid.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Resolver backed by a JSON table `{ "<listing_hash>": { "item_nameid": ..., "is_marketable": ... } }`.
///
/// `item_nameid` may be a number or a numeric string. A missing `is_marketable` defaults to
/// whether an identifier is known.
#[derive(Debug, Default)]
pub struct ListingDetailsFile {
    path: PathBuf,
    details: BTreeMap<String, Resolution>,
}

impl ListingDetailsFile {
    /// Loads the table at `path`. A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        let raw: BTreeMap<String, ListingDetails> = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No listing details found at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(BoosterError::Io(e)),
        };

        let details: BTreeMap<String, Resolution> = raw
            .into_iter()
            .map(|(listing_hash, entry)| {
                let market_identifier = entry.market_identifier();
                let is_marketable = market_identifier.is_some()
                    && entry.is_marketable.unwrap_or(true);
                (
                    listing_hash,
                    Resolution {
                        market_identifier,
                        is_marketable,
                    },
                )
            })
            .collect();

        info!("Loaded {} listing details from {}", details.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            details,
        })
    }

    /// Path the table was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdResolver for ListingDetailsFile {
    fn resolve_batch(&self, listing_hashes: &[&str]) -> Result<HashMap<String, Resolution>> {
        let mut resolved = HashMap::with_capacity(listing_hashes.len());
        for listing_hash in listing_hashes {
            let resolution = match self.details.get(*listing_hash) {
                Some(resolution) => *resolution,
                None => {
                    warn!("Item name ID is unknown for {}", listing_hash);
                    Resolution::unresolved()
                }
            };
            resolved.insert(String::from(*listing_hash), resolution);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolves_numbers_and_numeric_strings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("listing_details.json");
        fs::write(
            &path,
            r#"{
                "290970-1849 Booster Pack": {"item_nameid": 175880240, "is_marketable": true},
                "730-CS Booster Pack": {"item_nameid": "12345"},
                "614910-#monstercakes Booster Pack": {"item_nameid": null}
            }"#,
        )
        .unwrap();

        let resolver = ListingDetailsFile::load(&path).unwrap();
        let resolved = resolver
            .resolve_batch(&[
                "290970-1849 Booster Pack",
                "730-CS Booster Pack",
                "614910-#monstercakes Booster Pack",
                "unknown Booster Pack",
            ])
            .unwrap();

        assert_eq!(resolved.len(), 4);
        assert_eq!(
            resolved["290970-1849 Booster Pack"],
            Resolution {
                market_identifier: Some(175880240),
                is_marketable: true
            }
        );
        assert_eq!(resolved["730-CS Booster Pack"].market_identifier, Some(12345));
        assert!(resolved["730-CS Booster Pack"].is_marketable);
        assert_eq!(resolved["614910-#monstercakes Booster Pack"], Resolution::unresolved());
        assert_eq!(resolved["unknown Booster Pack"], Resolution::unresolved());
    }

    #[test]
    fn missing_table_is_empty() {
        let dir = tempdir().unwrap();
        let resolver = ListingDetailsFile::load(&dir.path().join("absent.json")).unwrap();
        let resolved = resolver.resolve_batch(&["a"]).unwrap();
        assert_eq!(resolved["a"], Resolution::unresolved());
    }
}
