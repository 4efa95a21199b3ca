//! Session cookie jar.
//!
//! An empty jar means anonymous access. When the session is authenticated the market may
//! rotate a token on any response; the rotated value must be written back before the next
//! request is issued.
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use booster_common::{BoosterError, Result};
use log::{info, warn};

/// Cookie name to value.
pub type CookieJar = BTreeMap<String, String>;

/// Source and sink of session credentials.
pub trait CredentialStore {
    /// Current credentials.
    fn cookies(&self) -> CookieJar;

    /// Merges `new` over `old`, persists the result if any value changed, and returns it.
    fn persist_if_changed(&mut self, old: &CookieJar, new: &CookieJar) -> Result<CookieJar>;

    /// Whether the credentials describe an authenticated session.
    fn is_authenticated(&self) -> bool {
        !self.cookies().is_empty()
    }
}

/// Merges `new` over `old`. Returns the merged jar and whether anything changed.
pub fn merge_cookies(old: &CookieJar, new: &CookieJar) -> (CookieJar, bool) {
    let mut merged = old.clone();
    let mut changed = false;
    for (name, value) in new {
        if merged.get(name) != Some(value) {
            merged.insert(name.clone(), value.clone());
            changed = true;
        }
    }
    (merged, changed)
}

/// Cookie jar persisted as a JSON object `{ "<name>": "<value>" }`.
#[derive(Debug)]
pub struct JsonCookieStore {
    path: PathBuf,
    jar: CookieJar,
}

impl JsonCookieStore {
    /// Loads the jar at `path`. A missing file yields an anonymous session.
    pub fn load(path: &Path) -> Result<Self> {
        let jar = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No cookie found at {}, using anonymous access", path.display());
                CookieJar::new()
            }
            Err(e) => return Err(BoosterError::Io(e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            jar,
        })
    }
}

impl CredentialStore for JsonCookieStore {
    fn cookies(&self) -> CookieJar {
        self.jar.clone()
    }

    fn persist_if_changed(&mut self, old: &CookieJar, new: &CookieJar) -> Result<CookieJar> {
        let (merged, changed) = merge_cookies(old, new);
        if changed {
            warn!("Session cookie rotated, saving to {}", self.path.display());
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, serde_json::to_string_pretty(&merged)?)?;
            self.jar = merged.clone();
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn jar(pairs: &[(&str, &str)]) -> CookieJar {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn merge_reports_changes_only() {
        let old = jar(&[("sessionid", "a"), ("steamLoginSecure", "b")]);
        let (merged, changed) = merge_cookies(&old, &jar(&[("sessionid", "a")]));
        assert!(!changed);
        assert_eq!(merged, old);

        let (merged, changed) = merge_cookies(&old, &jar(&[("steamLoginSecure", "c")]));
        assert!(changed);
        assert_eq!(merged, jar(&[("sessionid", "a"), ("steamLoginSecure", "c")]));
    }

    #[test]
    fn rotated_token_is_written_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("personal_info.json");
        fs::write(&path, r#"{"sessionid": "a", "steamLoginSecure": "b"}"#).unwrap();

        let mut store = JsonCookieStore::load(&path).unwrap();
        assert!(store.is_authenticated());

        let old = store.cookies();
        let merged = store
            .persist_if_changed(&old, &jar(&[("steamLoginSecure", "rotated")]))
            .unwrap();
        assert_eq!(merged["steamLoginSecure"], "rotated");

        let reloaded = JsonCookieStore::load(&path).unwrap();
        assert_eq!(reloaded.cookies(), merged);
    }

    #[test]
    fn missing_jar_is_anonymous() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("personal_info.json");
        let mut store = JsonCookieStore::load(&path).unwrap();
        assert!(!store.is_authenticated());

        let merged = store
            .persist_if_changed(&CookieJar::new(), &CookieJar::new())
            .unwrap();
        assert!(merged.is_empty());
        assert!(!path.exists());
    }
}
