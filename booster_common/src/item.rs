//! Booster pack items requested by the caller.
use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::BoosterError;

/// A craftable unit (one game's Booster Pack) and the market listing it sells under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoosterItem {
    /// Stable identifier of the craftable unit, e.g. the game's app id.
    pub item_key: String,
    /// Market-facing name of the commodity, e.g. `"290970-1849 Booster Pack"`.
    pub listing_hash: String,
}

impl BoosterItem {
    /// Creates a new item.
    pub fn new(item_key: &str, listing_hash: &str) -> Self {
        BoosterItem {
            item_key: String::from(item_key),
            listing_hash: String::from(listing_hash),
        }
    }

    /// Parses a JSON object `{ "<item_key>": "<listing_hash>", ... }`.
    ///
    /// Items come back ordered by item key so that repeated runs query the market in
    /// the same order.
    pub fn parse_from_json<R: Read>(reader: R) -> Result<Vec<Self>, BoosterError> {
        let raw: BTreeMap<String, String> = serde_json::from_reader(reader)?;
        let mut items = Vec::with_capacity(raw.len());
        for (item_key, listing_hash) in raw {
            if listing_hash.trim().is_empty() {
                return Err(BoosterError::Format(format!(
                    "empty listing hash for item {}",
                    item_key
                )));
            }
            items.push(BoosterItem {
                item_key,
                listing_hash,
            });
        }
        Ok(items)
    }
}
