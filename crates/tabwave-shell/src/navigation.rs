//! Per-tab session history.
//!
//! A tab's `history` is a stack with a cursor at `idx`. A push navigation
//! drops everything after the cursor before appending, a replace
//! navigation rewrites the entry under the cursor, and an offset jump only
//! moves the cursor.

use crate::store::StateStore;
use tabwave_core::{Label, Tab, TabId, TabwaveResult};

/// Type of navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationMode {
    /// New entry, forward entries are discarded
    #[default]
    Push,
    /// Overwrite the current entry (reload, in-place redirect)
    Replace,
}

/// Point `tab` at `url`, updating its history stack per `mode`
pub fn apply_navigation(tab: &mut Tab, url: &str, mode: NavigationMode, display: Label) {
    match mode {
        NavigationMode::Push => {
            tab.history.truncate(tab.idx + 1);
            tab.history.push(url.to_string());
            tab.idx = tab.history.len() - 1;
        }
        NavigationMode::Replace => match tab.history.get_mut(tab.idx) {
            Some(entry) => *entry = url.to_string(),
            None => {
                tab.history.push(url.to_string());
                tab.idx = tab.history.len() - 1;
            }
        },
    }

    tab.url = url.to_string();
    tab.display = display;
    tab.title = tab.url.clone();
}

/// Move the cursor by `offset`; false when that leaves the stack
pub fn seek(tab: &mut Tab, offset: isize) -> bool {
    let Some(target) = tab.idx.checked_add_signed(offset) else {
        return false;
    };
    let Some(url) = tab.history.get(target) else {
        return false;
    };

    tab.url = url.clone();
    tab.title = url.clone();
    tab.idx = target;
    tab.display = Label::Url;
    true
}

/// Navigation operations layered on the [`StateStore`].
///
/// Typed input goes through the store's own normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationEngine;

impl NavigationEngine {
    /// Navigate tab `id` to `raw` and record the visit in global history.
    ///
    /// Returns the normalized address, or `None` when the tab is unknown
    /// or the input is blank.
    pub fn navigate(
        &self,
        store: &mut StateStore,
        id: TabId,
        raw: &str,
        mode: NavigationMode,
        display: Label,
    ) -> TabwaveResult<Option<String>> {
        if raw.trim().is_empty() {
            log::debug!("Ignoring navigation of tab {} to blank input", id);
            return Ok(None);
        }

        let url = store.normalizer().normalize(raw);
        let now = store.now();
        let cap = store.history_cap();

        let navigated = store.update("navigate", |state| {
            let tab = state.tab_mut(id)?;
            apply_navigation(tab, &url, mode, display);
            state.push_history(&url, now, cap);
            Some(url)
        })?;

        if let Some(url) = &navigated {
            log::debug!("Tab {} navigated to {} ({:?})", id, url, mode);
        }
        Ok(navigated)
    }

    /// Move tab `id` through its history; out-of-range offsets do nothing
    pub fn go_offset(
        &self,
        store: &mut StateStore,
        id: TabId,
        offset: isize,
    ) -> TabwaveResult<bool> {
        Ok(store
            .update("go offset", |state| {
                let tab = state.tab_mut(id)?;
                seek(tab, offset).then_some(())
            })?
            .is_some())
    }
}
