//! # Tabwave Common
//!
//! Logging configuration shared by the Tabwave binaries. Library crates
//! log through `log` or `tracing`; [`init_logging`] routes both into a
//! single `tracing-subscriber` pipeline.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LoggingError};
