//! The browser chrome controller.
//!
//! `BrowserShell` owns the state store and is the only thing UI events
//! talk to. Every call runs to completion, save included, before it
//! returns.

use crate::address::resolve_submission;
use crate::clock::Clock;
use crate::commands::{Command, CommandId, CommandOutcome, CommandPalette};
use crate::navigation::{NavigationEngine, NavigationMode};
use crate::state::BrowserState;
use crate::store::{OpenOptions, StateObserver, StateStore};
use crate::suggest::{suggest, Suggestion};
use crate::view::{toolbar_state, view_model, Generation, ToolbarState, ViewModel};
use std::collections::HashMap;
use tabwave_core::{Label, ShellConfig, TabId, TabwaveResult};
use tabwave_storage::KeyValueStore;

pub struct BrowserShell {
    store: StateStore,
    navigation: NavigationEngine,
    palette: CommandPalette,
    content_endpoint: String,
    /// Current navigation tag per open tab; runtime only
    generations: HashMap<TabId, Generation>,
    next_generation: u64,
}

impl BrowserShell {
    /// Restore the shell from whatever `backend` holds
    pub fn new(config: &ShellConfig, backend: Box<dyn KeyValueStore>) -> Self {
        log::info!("Initializing browser shell");

        let store = StateStore::open(config, backend);
        let mut shell = Self {
            store,
            navigation: NavigationEngine,
            palette: CommandPalette::new(),
            content_endpoint: config.content_endpoint.clone(),
            generations: HashMap::new(),
            next_generation: 1,
        };

        let restored: Vec<TabId> = shell.state().tabs.iter().map(|tab| tab.id).collect();
        for id in restored {
            shell.bump_generation(id);
        }
        shell
    }

    /// Open the backend named in `config` and restore from it
    pub fn open(config: &ShellConfig) -> TabwaveResult<Self> {
        let backend = tabwave_storage::open_backend(config)?;
        Ok(Self::new(config, backend))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.store = self.store.with_clock(clock);
        self
    }

    pub fn state(&self) -> &BrowserState {
        self.store.state()
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.state().active_tab
    }

    pub fn generation(&self, id: TabId) -> Option<Generation> {
        self.generations.get(&id).copied()
    }

    pub fn subscribe(&mut self, observer: impl StateObserver + 'static) {
        self.store.subscribe(observer);
    }

    fn bump_generation(&mut self, id: TabId) -> Generation {
        let generation = Generation(self.next_generation);
        self.next_generation += 1;
        self.generations.insert(id, generation);
        generation
    }

    // Tab management

    /// Open a tab at `url`, or at home when `None`
    pub fn open_tab(
        &mut self,
        url: Option<&str>,
        options: OpenOptions,
    ) -> TabwaveResult<Option<TabId>> {
        let opened = self.store.create_tab(url, options)?;
        if let Some(id) = opened {
            self.bump_generation(id);
        }
        Ok(opened)
    }

    pub fn close_tab(&mut self, id: TabId) -> TabwaveResult<bool> {
        let closed = self.store.close_tab(id)?;
        if closed {
            self.generations.remove(&id);
        }
        Ok(closed)
    }

    pub fn close_active_tab(&mut self) -> TabwaveResult<bool> {
        match self.active_tab() {
            Some(id) => self.close_tab(id),
            None => Ok(false),
        }
    }

    pub fn focus_tab(&mut self, id: TabId) -> TabwaveResult<bool> {
        self.store.focus_tab(id)
    }

    // Navigation

    fn navigate_tab(
        &mut self,
        id: TabId,
        raw: &str,
        mode: NavigationMode,
        display: Label,
    ) -> TabwaveResult<Option<String>> {
        let navigated = self
            .navigation
            .navigate(&mut self.store, id, raw, mode, display)?;
        if navigated.is_some() {
            self.bump_generation(id);
        }
        Ok(navigated)
    }

    /// Push-navigate tab `id`; returns the normalized address
    pub fn navigate(&mut self, id: TabId, raw: &str) -> TabwaveResult<Option<String>> {
        self.navigate_tab(id, raw, NavigationMode::Push, Label::Url)
    }

    pub fn navigate_active(&mut self, raw: &str) -> TabwaveResult<Option<String>> {
        match self.active_tab() {
            Some(id) => self.navigate(id, raw),
            None => Ok(None),
        }
    }

    pub fn go_offset(&mut self, id: TabId, offset: isize) -> TabwaveResult<bool> {
        let moved = self.navigation.go_offset(&mut self.store, id, offset)?;
        if moved {
            self.bump_generation(id);
        }
        Ok(moved)
    }

    pub fn go_back(&mut self) -> TabwaveResult<bool> {
        match self.active_tab() {
            Some(id) => self.go_offset(id, -1),
            None => Ok(false),
        }
    }

    pub fn go_forward(&mut self) -> TabwaveResult<bool> {
        match self.active_tab() {
            Some(id) => self.go_offset(id, 1),
            None => Ok(false),
        }
    }

    /// Load the current address of tab `id` again, keeping its label
    pub fn reload(&mut self, id: TabId) -> TabwaveResult<Option<String>> {
        let Some(tab) = self.state().tab(id) else {
            return Ok(None);
        };
        let url = tab.url.clone();
        let display = tab.display.clone();
        self.navigate_tab(id, &url, NavigationMode::Replace, display)
    }

    /// Send the focused tab home, opening a tab if none is focused.
    ///
    /// Either way the visit lands in global history.
    pub fn go_home(&mut self) -> TabwaveResult<Option<String>> {
        let home = self.state().home.clone();
        match self.active_tab() {
            Some(id) => self.navigate(id, &home),
            None => Ok(self
                .open_tab(None, OpenOptions::default().recording_visit())?
                .map(|_| home)),
        }
    }

    pub fn set_home(&mut self, raw: &str) -> TabwaveResult<Option<String>> {
        self.store.set_home(raw)
    }

    /// Route typed address-bar text through the content endpoint.
    ///
    /// The focused tab navigates to the generated page and shows the typed
    /// text; with no focused tab a new one is opened. Returns the tab used.
    pub fn submit_address(&mut self, typed: &str) -> TabwaveResult<Option<TabId>> {
        let Some(submission) = resolve_submission(&self.content_endpoint, typed) else {
            log::debug!("Ignoring blank address submission");
            return Ok(None);
        };

        if let Some(id) = self.active_tab() {
            let navigated = self.navigate_tab(
                id,
                &submission.target,
                NavigationMode::Push,
                Label::explicit(submission.display),
            )?;
            return Ok(navigated.map(|_| id));
        }

        let options = OpenOptions::default()
            .with_display(submission.display)
            .recording_visit();
        self.open_tab(Some(&submission.target), options)
    }

    /// Apply a page's "content ready" notification.
    ///
    /// Only the notification for the tab's latest navigation counts; one
    /// that arrives after the tab moved on or closed is dropped.
    pub fn content_ready(
        &mut self,
        id: TabId,
        generation: Generation,
        title: Option<&str>,
    ) -> TabwaveResult<bool> {
        if self.generations.get(&id) != Some(&generation) {
            log::debug!("Dropping stale content-ready for tab {} ({})", id, generation);
            return Ok(false);
        }

        let Some(title) = title.map(str::trim).filter(|title| !title.is_empty()) else {
            return Ok(false);
        };
        let title = title.to_string();

        Ok(self
            .store
            .update("content ready", |state| {
                let tab = state.tab_mut(id)?;
                tab.title = title;
                tab.display = Label::Url;
                Some(())
            })?
            .is_some())
    }

    // Bookmarks and history

    pub fn toggle_bookmark(&mut self, url: &str) -> TabwaveResult<Option<bool>> {
        self.store.toggle_bookmark(url)
    }

    pub fn toggle_active_bookmark(&mut self) -> TabwaveResult<Option<bool>> {
        let Some(url) = self.state().active().map(|tab| tab.url.clone()) else {
            return Ok(None);
        };
        self.store.toggle_bookmark(&url)
    }

    pub fn remove_bookmark(&mut self, url: &str) -> TabwaveResult<bool> {
        self.store.remove_bookmark(url)
    }

    pub fn remove_history_item(&mut self, index: usize) -> TabwaveResult<bool> {
        self.store.remove_history_item(index)
    }

    pub fn clear_history(&mut self) -> TabwaveResult<()> {
        self.store.clear_history()
    }

    // Derived views

    pub fn toolbar(&self) -> ToolbarState {
        toolbar_state(self.state())
    }

    pub fn view(&self) -> ViewModel {
        view_model(self.state(), |id| {
            self.generations.get(&id).copied().unwrap_or(Generation(0))
        })
    }

    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        suggest(self.state(), query, limit)
    }

    // Commands

    pub fn search_commands(&self, query: &str) -> Vec<Command> {
        self.palette.search(query)
    }

    pub fn execute(&mut self, command: CommandId) -> TabwaveResult<CommandOutcome> {
        log::debug!("Executing command {}", command);

        let changed = match command {
            CommandId::FocusAddress => return Ok(CommandOutcome::FocusAddressBar),
            CommandId::DismissOverlay => return Ok(CommandOutcome::DismissOverlay),
            CommandId::NewTab => self.open_tab(None, OpenOptions::default())?.is_some(),
            CommandId::CloseTab => self.close_active_tab()?,
            CommandId::GoBack => self.go_back()?,
            CommandId::GoForward => self.go_forward()?,
            CommandId::Reload => match self.active_tab() {
                Some(id) => self.reload(id)?.is_some(),
                None => false,
            },
            CommandId::GoHome => self.go_home()?.is_some(),
            CommandId::ToggleBookmark => self.toggle_active_bookmark()?.is_some(),
            CommandId::ClearHistory => {
                self.clear_history()?;
                true
            }
        };
        Ok(CommandOutcome::Changed(changed))
    }
}
