//! Tabwave Core Library
//!
//! This crate provides shared types, errors, configuration and URL
//! normalization for Tabwave.

pub mod config;
pub mod error;
pub mod types;
pub mod normalize;

pub use config::{ShellConfig, StorageBackend};
pub use error::{TabwaveError, TabwaveResult};
pub use types::{HistoryEntry, Label, Tab, TabId};
pub use normalize::UrlNormalizer;
