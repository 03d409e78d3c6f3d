//! The browser state snapshot and its in-memory mutations.
//!
//! Nothing here persists or notifies; [`crate::store::StateStore`] wraps
//! these operations with save-after-mutate semantics.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tabwave_core::{HistoryEntry, Tab, TabId, TabwaveError, TabwaveResult};

/// Everything that is persisted: tabs, bookmarks, global history, home
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserState {
    pub active_tab: Option<TabId>,
    /// Display order
    pub tabs: Vec<Tab>,
    /// Most recently added first
    pub bookmarks: Vec<String>,
    /// Most recent first
    pub history: Vec<HistoryEntry>,
    pub home: String,
}

impl BrowserState {
    /// Empty state with no tabs
    pub fn new(home: impl Into<String>) -> Self {
        Self {
            active_tab: None,
            tabs: Vec::new(),
            bookmarks: Vec::new(),
            history: Vec::new(),
            home: home.into(),
        }
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    pub fn position(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active_tab.and_then(|id| self.tab(id))
    }

    /// Smallest id greater than every id in use; `None` when the largest
    /// possible id is already taken
    pub fn next_tab_id(&self) -> Option<TabId> {
        match self.tabs.iter().map(|tab| tab.id.0).max() {
            Some(max) => max.checked_add(1).map(TabId),
            None => Some(TabId(1)),
        }
    }

    /// Append `tab` to the strip. A foreground open focuses it; a
    /// background open only does when nothing is focused yet.
    pub fn open_tab(&mut self, tab: Tab, background: bool) -> bool {
        if self.tab(tab.id).is_some() {
            return false;
        }

        let id = tab.id;
        self.tabs.push(tab);
        if !background || self.active_tab.is_none() {
            self.active_tab = Some(id);
        }
        true
    }

    /// Remove a tab. Closing the focused tab hands focus to the tab that
    /// slides into its slot, else the one before it, else nothing.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.tabs.remove(index);

        if self.active_tab == Some(id) {
            self.active_tab = self
                .tabs
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|prev| self.tabs.get(prev)))
                .map(|tab| tab.id);
        }
        true
    }

    pub fn focus_tab(&mut self, id: TabId) -> bool {
        if self.tab(id).is_none() {
            return false;
        }
        self.active_tab = Some(id);
        true
    }

    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.bookmarks.iter().any(|bookmark| bookmark == url)
    }

    /// Add `url` to the front of the bookmarks, or remove it if present.
    /// Returns whether it is bookmarked afterwards.
    pub fn toggle_bookmark(&mut self, url: &str) -> Option<bool> {
        if url.is_empty() {
            return None;
        }

        if self.remove_bookmark(url) {
            Some(false)
        } else {
            self.bookmarks.insert(0, url.to_string());
            Some(true)
        }
    }

    pub fn remove_bookmark(&mut self, url: &str) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|bookmark| bookmark != url);
        self.bookmarks.len() != before
    }

    /// Record a visit at the front and drop whatever falls past `cap`
    pub fn push_history(&mut self, url: &str, timestamp: u64, cap: usize) {
        self.history.insert(
            0,
            HistoryEntry {
                url: url.to_string(),
                timestamp,
            },
        );
        self.truncate_history(cap);
    }

    /// Keep the `cap` most recent entries; returns how many were dropped
    pub fn truncate_history(&mut self, cap: usize) -> usize {
        let dropped = self.history.len().saturating_sub(cap);
        self.history.truncate(cap);
        dropped
    }

    pub fn remove_history_item(&mut self, index: usize) -> bool {
        if index >= self.history.len() {
            return false;
        }
        self.history.remove(index);
        true
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Check the data-model invariants a loaded snapshot must satisfy
    pub fn validate(&self) -> TabwaveResult<()> {
        let mut ids = HashSet::new();
        for tab in &self.tabs {
            if !ids.insert(tab.id) {
                return Err(TabwaveError::snapshot(format!("duplicate tab id {}", tab.id)));
            }
            match tab.history.get(tab.idx) {
                None => {
                    return Err(TabwaveError::snapshot(format!(
                        "tab {} index {} outside history of {}",
                        tab.id,
                        tab.idx,
                        tab.history.len()
                    )));
                }
                Some(current) if *current != tab.url => {
                    return Err(TabwaveError::snapshot(format!(
                        "tab {} url does not match its current history entry",
                        tab.id
                    )));
                }
                Some(_) => {}
            }
        }

        if let Some(active) = self.active_tab {
            if !ids.contains(&active) {
                return Err(TabwaveError::snapshot(format!(
                    "active tab {} does not exist",
                    active
                )));
            }
        }

        let mut seen = HashSet::new();
        for url in &self.bookmarks {
            if !seen.insert(url.as_str()) {
                return Err(TabwaveError::snapshot(format!("duplicate bookmark {}", url)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabwave_core::Label;

    fn tab(id: u64) -> Tab {
        Tab::new(TabId(id), format!("https://{}.test/", id), Label::Url)
    }

    fn three_tabs() -> BrowserState {
        let mut state = BrowserState::new("https://home.test/");
        for id in 1..=3 {
            state.open_tab(tab(id), false);
        }
        state
    }

    #[test]
    fn test_open_focuses_unless_background() {
        let mut state = BrowserState::new("https://home.test/");
        assert!(state.open_tab(tab(1), false));
        assert_eq!(state.active_tab, Some(TabId(1)));

        assert!(state.open_tab(tab(2), true));
        assert_eq!(state.active_tab, Some(TabId(1)));
        assert_eq!(state.tabs.len(), 2);

        assert!(!state.open_tab(tab(2), false));
    }

    #[test]
    fn test_background_open_into_empty_strip_focuses() {
        let mut state = BrowserState::new("https://home.test/");
        state.open_tab(tab(5), true);
        assert_eq!(state.active_tab, Some(TabId(5)));
    }

    #[test]
    fn test_close_active_falls_to_same_index_then_previous() {
        let mut state = three_tabs();
        state.focus_tab(TabId(2));

        assert!(state.close_tab(TabId(2)));
        assert_eq!(state.active_tab, Some(TabId(3)));

        assert!(state.close_tab(TabId(3)));
        assert_eq!(state.active_tab, Some(TabId(1)));

        assert!(state.close_tab(TabId(1)));
        assert_eq!(state.active_tab, None);
        assert!(state.tabs.is_empty());
    }

    #[test]
    fn test_close_inactive_keeps_focus() {
        let mut state = three_tabs();
        state.focus_tab(TabId(3));
        state.close_tab(TabId(1));
        assert_eq!(state.active_tab, Some(TabId(3)));
    }

    #[test]
    fn test_close_unknown_is_noop() {
        let mut state = three_tabs();
        let before = state.clone();
        assert!(!state.close_tab(TabId(99)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_next_tab_id() {
        assert_eq!(BrowserState::new("h").next_tab_id(), Some(TabId(1)));
        let mut state = three_tabs();
        state.close_tab(TabId(2));
        assert_eq!(state.next_tab_id(), Some(TabId(4)));
    }

    #[test]
    fn test_next_tab_id_at_largest_id() {
        let mut state = BrowserState::new("h");
        state.open_tab(tab(u64::MAX), false);
        assert_eq!(state.next_tab_id(), None);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_toggle_bookmark_front_insert() {
        let mut state = BrowserState::new("h");
        assert_eq!(state.toggle_bookmark("a"), Some(true));
        assert_eq!(state.toggle_bookmark("b"), Some(true));
        assert_eq!(state.bookmarks, vec!["b".to_string(), "a".to_string()]);

        assert_eq!(state.toggle_bookmark("a"), Some(false));
        assert_eq!(state.bookmarks, vec!["b".to_string()]);
        assert_eq!(state.toggle_bookmark(""), None);
    }

    #[test]
    fn test_history_cap_keeps_most_recent() {
        let mut state = BrowserState::new("h");
        for i in 0..5 {
            state.push_history(&format!("u{}", i), i, 3);
        }
        let urls: Vec<_> = state.history.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["u4", "u3", "u2"]);
    }

    #[test]
    fn test_remove_history_item_bounds() {
        let mut state = BrowserState::new("h");
        state.push_history("a", 1, 10);
        state.push_history("b", 2, 10);

        assert!(!state.remove_history_item(2));
        assert!(state.remove_history_item(0));
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].url, "a");
    }

    #[test]
    fn test_validate_catches_broken_invariants() {
        assert!(three_tabs().validate().is_ok());

        let mut bad_idx = three_tabs();
        bad_idx.tabs[0].idx = 4;
        assert!(bad_idx.validate().is_err());

        let mut bad_url = three_tabs();
        bad_url.tabs[1].url = "https://elsewhere.test/".into();
        assert!(bad_url.validate().is_err());

        let mut dangling = three_tabs();
        dangling.active_tab = Some(TabId(42));
        assert!(dangling.validate().is_err());

        let mut dup = three_tabs();
        dup.tabs[2].id = TabId(1);
        assert!(dup.validate().is_err());

        let mut dup_bookmark = three_tabs();
        dup_bookmark.bookmarks = vec!["a".into(), "a".into()];
        assert!(dup_bookmark.validate().is_err());
    }
}
