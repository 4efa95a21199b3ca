//! Next-eligible crafting timestamps stored per item.
//!
//! The file is a JSON object `{ "<item_key>": "15 Sep @ 10:48PM" }` written by whatever
//! crafts the packs. An item without an entry was never crafted.
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use booster_common::time_gate::is_cooldown_elapsed;
use booster_common::{BoosterError, Result};
use chrono::NaiveDateTime;
use log::info;

/// Next-eligible timestamps keyed by item key.
#[derive(Debug, Clone)]
pub struct NextCreationTimes {
    entries: BTreeMap<String, String>,
}

impl NextCreationTimes {
    /// Loads the timestamps at `path`. A missing file yields no entries.
    pub fn load(path: &Path) -> Result<Self> {
        let entries: BTreeMap<String, String> = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(BoosterError::Io(e)),
        };
        info!(
            "Loaded {} next creation times from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries })
    }

    /// Stored timestamp of `item_key`.
    pub fn get(&self, item_key: &str) -> Option<&str> {
        self.entries.get(item_key).map(String::as_str)
    }

    /// Whether a pack for `item_key` can be crafted at `now`.
    pub fn can_craft(&self, item_key: &str, now: NaiveDateTime) -> Result<bool> {
        is_cooldown_elapsed(self.get(item_key), now)
    }
}
