//! Versioned snapshot encoding on top of a key-value backend.

use crate::state::BrowserState;
use serde::Serialize;
use serde_json::Value;
use tabwave_core::{TabwaveError, TabwaveResult};
use tabwave_storage::KeyValueStore;

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Serialize)]
struct Envelope<'a> {
    version: u64,
    #[serde(flatten)]
    state: &'a BrowserState,
}

/// Reads and writes the whole [`BrowserState`] under a single key
pub struct SnapshotStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl SnapshotStore {
    pub fn new(backend: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Load the stored snapshot, or an empty state rooted at `home`.
    ///
    /// Never fails: anything unreadable is logged and replaced by the
    /// default. Global history is cut down to `history_cap`.
    pub fn load(&self, home: &str, history_cap: usize) -> BrowserState {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("No saved state under {}, starting fresh", self.key);
                return BrowserState::new(home);
            }
            Err(err) => {
                log::warn!("Failed to read saved state: {}", err);
                return BrowserState::new(home);
            }
        };

        match decode(&raw) {
            Ok(mut state) => {
                let dropped = state.truncate_history(history_cap);
                if dropped > 0 {
                    log::info!("Dropped {} history entries over the cap", dropped);
                }
                log::info!(
                    "Restored {} tabs, {} bookmarks, {} history entries",
                    state.tabs.len(),
                    state.bookmarks.len(),
                    state.history.len()
                );
                state
            }
            Err(err) => {
                log::warn!("Discarding saved state: {}", err);
                BrowserState::new(home)
            }
        }
    }

    /// Serialize and write `state`
    pub fn save(&mut self, state: &BrowserState) -> TabwaveResult<()> {
        let encoded = encode(state)?;
        self.backend.set(&self.key, &encoded)
    }
}

/// Encode `state` in the current envelope
pub fn encode(state: &BrowserState) -> TabwaveResult<String> {
    let envelope = Envelope {
        version: SNAPSHOT_VERSION,
        state,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode a stored blob, upgrading unversioned ones, and check invariants
pub fn decode(raw: &str) -> TabwaveResult<BrowserState> {
    let mut value: Value = serde_json::from_str(raw)?;

    let Some(object) = value.as_object_mut() else {
        return Err(TabwaveError::snapshot("snapshot is not a JSON object"));
    };

    match object.remove("version") {
        None => log::info!("Upgrading unversioned snapshot"),
        Some(version) if version.as_u64() == Some(SNAPSHOT_VERSION) => {}
        Some(version) => {
            return Err(TabwaveError::snapshot(format!(
                "unsupported snapshot version {}",
                version
            )));
        }
    }

    let state: BrowserState = serde_json::from_value(value)?;
    state.validate()?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabwave_core::{Label, Tab, TabId};
    use tabwave_storage::MemoryStore;

    const HOME: &str = "https://home.test/";

    fn sample() -> BrowserState {
        let mut state = BrowserState::new(HOME);
        state.open_tab(Tab::new(TabId(3), "https://a.test/".into(), Label::Url), false);
        state.open_tab(
            Tab::new(TabId(9), "https://b.test/".into(), Label::explicit("typed")),
            true,
        );
        state.bookmarks.push("https://a.test/".into());
        state.push_history("https://a.test/", 10, 200);
        state
    }

    fn store_with(raw: Option<&str>) -> SnapshotStore {
        let backend = match raw {
            Some(raw) => MemoryStore::with_entry("state", raw),
            None => MemoryStore::new(),
        };
        SnapshotStore::new(Box::new(backend), "state")
    }

    #[test]
    fn test_envelope_shape() {
        let encoded = encode(&sample()).unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["activeTab"], 3);
        assert_eq!(value["tabs"][1]["display"], "typed");
        assert_eq!(value["tabs"][0]["display"], Value::Null);
        assert_eq!(value["home"], HOME);
    }

    #[test]
    fn test_save_then_load() {
        let shared = MemoryStore::new();
        let mut writer = SnapshotStore::new(Box::new(shared.clone()), "state");
        writer.save(&sample()).unwrap();

        let reader = SnapshotStore::new(Box::new(shared), "state");
        assert_eq!(reader.load("https://other.test/", 200), sample());
    }

    #[test]
    fn test_missing_key_yields_default() {
        let state = store_with(None).load(HOME, 200);
        assert_eq!(state, BrowserState::new(HOME));
    }

    #[test]
    fn test_malformed_blob_yields_default() {
        assert_eq!(store_with(Some("{not json")).load(HOME, 200), BrowserState::new(HOME));
        assert_eq!(store_with(Some("[1,2]")).load(HOME, 200), BrowserState::new(HOME));
    }

    #[test]
    fn test_unversioned_blob_is_upgraded() {
        let legacy = r#"{
            "activeTab": 1,
            "tabs": [{"id": 1, "url": "https://a.test/", "title": "A",
                      "history": ["https://a.test/"], "idx": 0}],
            "bookmarks": [],
            "history": [{"url": "https://a.test/", "timestamp": 5}],
            "home": "https://legacy.test/"
        }"#;
        let state = decode(legacy).unwrap();
        assert_eq!(state.active_tab, Some(TabId(1)));
        assert_eq!(state.tabs[0].display, Label::Url);
        assert_eq!(state.home, "https://legacy.test/");
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut value: Value = serde_json::from_str(&encode(&sample()).unwrap()).unwrap();
        value["version"] = Value::from(SNAPSHOT_VERSION + 1);
        let err = decode(&value.to_string()).unwrap_err();
        assert!(matches!(err, TabwaveError::Snapshot(_)));
    }

    #[test]
    fn test_invalid_snapshot_rejected() {
        let mut broken = sample();
        broken.tabs[0].idx = 5;
        let raw = encode(&broken).unwrap();
        assert_eq!(store_with(Some(&raw)).load(HOME, 200), BrowserState::new(HOME));
    }

    #[test]
    fn test_largest_tab_id_restores() {
        let mut state = BrowserState::new(HOME);
        state.open_tab(Tab::new(TabId(u64::MAX), "https://a.test/".into(), Label::Url), false);
        let raw = encode(&state).unwrap();
        assert!(raw.contains("18446744073709551615"));

        let loaded = store_with(Some(&raw)).load(HOME, 200);
        assert_eq!(loaded, state);
        assert_eq!(loaded.next_tab_id(), None);
    }

    #[test]
    fn test_history_truncated_on_load() {
        let mut state = BrowserState::new(HOME);
        for i in 0..10 {
            state.push_history(&format!("https://{}.test/", i), i, 100);
        }
        let raw = encode(&state).unwrap();

        let loaded = store_with(Some(&raw)).load(HOME, 4);
        assert_eq!(loaded.history.len(), 4);
        assert_eq!(loaded.history[0].url, "https://9.test/");
    }
}
