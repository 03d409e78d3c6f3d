//! Tabwave browser shell
//!
//! Tabs, per-tab navigation history, bookmarks and global history, kept
//! in one snapshot that is saved after every change. [`BrowserShell`] is
//! the entry point; everything else is exposed for renderers and tests.

pub mod address;
pub mod clock;
pub mod commands;
pub mod navigation;
pub mod persistence;
pub mod shell;
pub mod state;
pub mod store;
pub mod suggest;
pub mod view;

pub use address::{resolve_submission, AddressSubmission};
pub use clock::{Clock, SteppingClock, SystemClock};
pub use commands::{Command, CommandId, CommandOutcome, CommandPalette};
pub use navigation::{NavigationEngine, NavigationMode};
pub use persistence::{SnapshotStore, SNAPSHOT_VERSION};
pub use shell::BrowserShell;
pub use state::BrowserState;
pub use store::{OpenOptions, StateObserver, StateStore};
pub use suggest::{Suggestion, SuggestionSource};
pub use view::{
    toolbar_state, view_model, ContentView, Generation, SandboxPolicy, TabStripEntry,
    ToolbarState, ViewModel,
};
