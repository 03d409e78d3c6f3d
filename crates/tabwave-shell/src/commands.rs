//! Keyboard commands and the fuzzy command palette.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tabwave_core::TabwaveError;

/// Every action reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandId {
    NewTab,
    CloseTab,
    FocusAddress,
    DismissOverlay,
    GoBack,
    GoForward,
    Reload,
    GoHome,
    ToggleBookmark,
    ClearHistory,
}

impl CommandId {
    pub const ALL: [CommandId; 10] = [
        Self::NewTab,
        Self::CloseTab,
        Self::FocusAddress,
        Self::DismissOverlay,
        Self::GoBack,
        Self::GoForward,
        Self::Reload,
        Self::GoHome,
        Self::ToggleBookmark,
        Self::ClearHistory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewTab => "new_tab",
            Self::CloseTab => "close_tab",
            Self::FocusAddress => "focus_address",
            Self::DismissOverlay => "dismiss_overlay",
            Self::GoBack => "go_back",
            Self::GoForward => "go_forward",
            Self::Reload => "reload",
            Self::GoHome => "go_home",
            Self::ToggleBookmark => "toggle_bookmark",
            Self::ClearHistory => "clear_history",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandId {
    type Err = TabwaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| TabwaveError::not_found(format!("command `{}`", s.trim())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub id: CommandId,
    pub name: String,
    pub description: String,
    pub shortcut: Option<String>,
}

impl Command {
    fn new(id: CommandId, name: &str, description: &str, shortcut: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            shortcut: Some(shortcut.to_string()),
        }
    }
}

/// What the caller has to do after a command ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "changed", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// State was (or was not) modified
    Changed(bool),
    /// Move keyboard focus into the address bar
    FocusAddressBar,
    /// Close whatever overlay is open
    DismissOverlay,
}

pub struct CommandPalette {
    commands: Vec<Command>,
    matcher: SkimMatcherV2,
}

impl CommandPalette {
    pub fn new() -> Self {
        let mut palette = Self {
            commands: Vec::new(),
            matcher: SkimMatcherV2::default(),
        };

        palette.register_defaults();
        palette
    }

    fn register_defaults(&mut self) {
        let defaults = vec![
            Command::new(CommandId::NewTab, "New Tab", "Open a new tab at the home page", "Ctrl+T"),
            Command::new(CommandId::CloseTab, "Close Tab", "Close the current tab", "Ctrl+W"),
            Command::new(
                CommandId::FocusAddress,
                "Focus Address Bar",
                "Put the cursor in the address bar",
                "Ctrl+L",
            ),
            Command::new(
                CommandId::DismissOverlay,
                "Dismiss",
                "Close the open panel or menu",
                "Escape",
            ),
            Command::new(CommandId::GoBack, "Back", "Go back one page", "Alt+Left"),
            Command::new(CommandId::GoForward, "Forward", "Go forward one page", "Alt+Right"),
            Command::new(CommandId::Reload, "Reload", "Reload the current page", "Ctrl+R"),
            Command::new(CommandId::GoHome, "Home", "Go to the home page", "Alt+Home"),
            Command::new(
                CommandId::ToggleBookmark,
                "Toggle Bookmark",
                "Bookmark or unbookmark the current page",
                "Ctrl+D",
            ),
            Command::new(
                CommandId::ClearHistory,
                "Clear History",
                "Forget every visited page",
                "Ctrl+Shift+Delete",
            ),
        ];

        for command in defaults {
            self.register(command);
        }
    }

    pub fn register(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn get(&self, id: CommandId) -> Option<&Command> {
        self.commands.iter().find(|command| command.id == id)
    }

    /// Command bound to `shortcut`, compared case-insensitively
    pub fn by_shortcut(&self, shortcut: &str) -> Option<&Command> {
        self.commands.iter().find(|command| {
            command
                .shortcut
                .as_deref()
                .is_some_and(|bound| bound.eq_ignore_ascii_case(shortcut.trim()))
        })
    }

    /// Best ten matches by name; an empty query lists everything
    pub fn search(&self, query: &str) -> Vec<Command> {
        let mut results: Vec<(i64, Command)> = self
            .commands
            .iter()
            .filter_map(|cmd| {
                self.matcher
                    .fuzzy_match(&cmd.name, query)
                    .map(|score| (score, cmd.clone()))
            })
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.0.cmp(&a.0));

        results.into_iter().map(|(_, cmd)| cmd).take(10).collect()
    }
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new()
    }
}
