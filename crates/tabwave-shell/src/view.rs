//! What a renderer needs to draw the chrome, derived fresh from state.

use crate::state::BrowserState;
use serde::Serialize;
use std::fmt;
use tabwave_core::{Tab, TabId};

/// Monotonic tag assigned to each navigation of a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Enabled state of the toolbar buttons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarState {
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub is_bookmarked: bool,
}

/// Toolbar state for the focused tab; all false with no tab
pub fn toolbar_state(state: &BrowserState) -> ToolbarState {
    match state.active() {
        Some(tab) => ToolbarState {
            can_go_back: tab.can_go_back(),
            can_go_forward: tab.can_go_forward(),
            is_bookmarked: state.is_bookmarked(&tab.url),
        },
        None => ToolbarState::default(),
    }
}

/// Capabilities granted to embedded content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxPolicy {
    pub scripts: bool,
    pub forms: bool,
    pub same_origin: bool,
    pub popups: bool,
    pub modals: bool,
}

impl SandboxPolicy {
    /// Space-separated token list for an iframe-style `sandbox` attribute
    pub fn attribute(&self) -> String {
        [
            (self.scripts, "allow-scripts"),
            (self.forms, "allow-forms"),
            (self.same_origin, "allow-same-origin"),
            (self.popups, "allow-popups"),
            (self.modals, "allow-modals"),
        ]
        .iter()
        .filter(|(granted, _)| *granted)
        .map(|(_, token)| *token)
        .collect::<Vec<_>>()
        .join(" ")
    }
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            scripts: true,
            forms: true,
            same_origin: true,
            popups: true,
            modals: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabStripEntry {
    pub id: TabId,
    pub label: String,
    pub active: bool,
    pub closable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentView {
    /// The focused tab's page
    Embed {
        tab: TabId,
        url: String,
        generation: Generation,
        sandbox: String,
    },
    /// Nothing is focused
    Placeholder,
}

/// Everything the renderer redraws on a state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub tabs: Vec<TabStripEntry>,
    pub content: ContentView,
    pub toolbar: ToolbarState,
    pub address: String,
}

/// Build the view model; `generation` reports each tab's current navigation tag
pub fn view_model(
    state: &BrowserState,
    generation: impl Fn(TabId) -> Generation,
) -> ViewModel {
    let tabs = state
        .tabs
        .iter()
        .map(|tab| TabStripEntry {
            id: tab.id,
            label: tab.label().to_string(),
            active: state.active_tab == Some(tab.id),
            closable: true,
        })
        .collect();

    let content = match state.active() {
        Some(tab) => embed(tab, generation(tab.id)),
        None => ContentView::Placeholder,
    };

    ViewModel {
        tabs,
        content,
        toolbar: toolbar_state(state),
        address: state.active().map(|tab| tab.address().to_string()).unwrap_or_default(),
    }
}

fn embed(tab: &Tab, generation: Generation) -> ContentView {
    ContentView::Embed {
        tab: tab.id,
        url: tab.url.clone(),
        generation,
        sandbox: SandboxPolicy::default().attribute(),
    }
}
