//! Canonical state plus persist-after-every-mutation.
//!
//! Each mutation runs against a copy of the current state. The copy is
//! saved first and only then becomes the current state, so a failed save
//! leaves nothing half-applied. Guard rejections return `Ok(None)` (or
//! `Ok(false)`) and never touch the backend.

use crate::clock::{Clock, SystemClock};
use crate::persistence::SnapshotStore;
use crate::state::BrowserState;
use tabwave_core::{Label, ShellConfig, Tab, TabId, TabwaveResult, UrlNormalizer};
use tabwave_storage::KeyValueStore;

/// Receives the state after every committed mutation
pub trait StateObserver {
    fn state_changed(&mut self, state: &BrowserState, revision: u64);
}

impl<F> StateObserver for F
where
    F: FnMut(&BrowserState, u64),
{
    fn state_changed(&mut self, state: &BrowserState, revision: u64) {
        self(state, revision)
    }
}

/// How a new tab is opened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Leave the current tab focused
    pub background: bool,
    /// Label to show instead of the url
    pub display: Label,
    /// Also record the opening url in global history
    pub record_visit: bool,
}

impl OpenOptions {
    pub fn background() -> Self {
        Self {
            background: true,
            ..Self::default()
        }
    }

    pub fn with_display(mut self, text: impl Into<String>) -> Self {
        self.display = Label::explicit(text);
        self
    }

    /// Treat the open as a navigation: the url lands in global history in
    /// the same commit as the new tab
    pub fn recording_visit(mut self) -> Self {
        self.record_visit = true;
        self
    }
}

pub struct StateStore {
    state: BrowserState,
    persistence: SnapshotStore,
    normalizer: UrlNormalizer,
    history_cap: usize,
    clock: Box<dyn Clock>,
    /// `None` once every id has been handed out
    next_tab_id: Option<TabId>,
    revision: u64,
    observers: Vec<Box<dyn StateObserver>>,
}

impl StateStore {
    /// Load the snapshot from `backend` and take ownership of it
    pub fn open(config: &ShellConfig, backend: Box<dyn KeyValueStore>) -> Self {
        let persistence = SnapshotStore::new(backend, config.storage_key.clone());
        let state = persistence.load(&config.home, config.history_cap);
        let next_tab_id = state.next_tab_id();

        Self {
            state,
            persistence,
            normalizer: UrlNormalizer::from_config(config),
            history_cap: config.history_cap,
            clock: Box::new(SystemClock),
            next_tab_id,
            revision: 0,
            observers: Vec::new(),
        }
    }

    /// Replace the time source used for history timestamps
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    /// Number of committed mutations since open
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    /// Normalizer shared by every operation that takes typed input
    pub fn normalizer(&self) -> &UrlNormalizer {
        &self.normalizer
    }

    pub fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    pub fn subscribe(&mut self, observer: impl StateObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply `mutate` to a working copy and commit it once saved.
    ///
    /// `mutate` returning `None` means the guard rejected the action: the
    /// working copy is dropped and nothing is written.
    pub fn update<T>(
        &mut self,
        action: &str,
        mutate: impl FnOnce(&mut BrowserState) -> Option<T>,
    ) -> TabwaveResult<Option<T>> {
        let mut working = self.state.clone();
        let Some(outcome) = mutate(&mut working) else {
            log::debug!("Ignored {}: nothing to change", action);
            return Ok(None);
        };

        if let Err(err) = self.persistence.save(&working) {
            log::warn!("Failed to save state after {}: {}", action, err);
            return Err(err);
        }

        self.state = working;
        self.revision += 1;
        log::trace!("Committed {} as revision {}", action, self.revision);

        for observer in &mut self.observers {
            observer.state_changed(&self.state, self.revision);
        }
        Ok(Some(outcome))
    }

    /// Id for the next tab: above every id in use and every id handed out
    fn allocate_tab_id(&self) -> Option<TabId> {
        Some(self.state.next_tab_id()?.max(self.next_tab_id?))
    }

    /// Open a tab at `url` (home when `None`); returns the new id.
    ///
    /// Returns `Ok(None)` without saving once the id space is used up.
    pub fn create_tab(
        &mut self,
        url: Option<&str>,
        options: OpenOptions,
    ) -> TabwaveResult<Option<TabId>> {
        let Some(id) = self.allocate_tab_id() else {
            log::warn!("Not opening a tab: no tab ids left");
            return Ok(None);
        };
        let url = match url {
            Some(raw) if !raw.trim().is_empty() => self.normalizer.normalize(raw),
            _ => self.state.home.clone(),
        };
        let OpenOptions {
            background,
            display,
            record_visit,
        } = options;
        let visited_at = record_visit.then(|| self.now());
        let cap = self.history_cap;
        let tab = Tab::new(id, url.clone(), display);

        let opened = self.update("open tab", |state| {
            if !state.open_tab(tab, background) {
                return None;
            }
            if let Some(now) = visited_at {
                state.push_history(&url, now, cap);
            }
            Some(id)
        })?;

        if let Some(id) = opened {
            self.next_tab_id = id.0.checked_add(1).map(TabId);
            log::info!("Opened tab {}{}", id, if background { " in background" } else { "" });
        }
        Ok(opened)
    }

    pub fn close_tab(&mut self, id: TabId) -> TabwaveResult<bool> {
        let closed = self
            .update("close tab", |state| state.close_tab(id).then_some(()))?
            .is_some();
        if closed {
            log::info!("Closed tab {}", id);
        }
        Ok(closed)
    }

    pub fn focus_tab(&mut self, id: TabId) -> TabwaveResult<bool> {
        Ok(self
            .update("focus tab", |state| state.focus_tab(id).then_some(()))?
            .is_some())
    }

    /// Returns whether `url` is bookmarked afterwards
    pub fn toggle_bookmark(&mut self, url: &str) -> TabwaveResult<Option<bool>> {
        self.update("toggle bookmark", |state| state.toggle_bookmark(url))
    }

    pub fn remove_bookmark(&mut self, url: &str) -> TabwaveResult<bool> {
        Ok(self
            .update("remove bookmark", |state| state.remove_bookmark(url).then_some(()))?
            .is_some())
    }

    pub fn push_history(&mut self, url: &str) -> TabwaveResult<bool> {
        if url.is_empty() {
            return Ok(false);
        }
        let now = self.now();
        let cap = self.history_cap;
        Ok(self
            .update("push history", |state| {
                state.push_history(url, now, cap);
                Some(())
            })?
            .is_some())
    }

    pub fn remove_history_item(&mut self, index: usize) -> TabwaveResult<bool> {
        Ok(self
            .update("remove history item", |state| {
                state.remove_history_item(index).then_some(())
            })?
            .is_some())
    }

    pub fn clear_history(&mut self) -> TabwaveResult<()> {
        self.update("clear history", |state| {
            state.clear_history();
            Some(())
        })?;
        log::info!("Cleared history");
        Ok(())
    }

    /// Change the address used for new tabs and the home action
    pub fn set_home(&mut self, raw: &str) -> TabwaveResult<Option<String>> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let home = self.normalizer.normalize(raw);
        self.update("set home", |state| {
            state.home = home.clone();
            Some(home)
        })
    }
}
