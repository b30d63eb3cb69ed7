//! Error types shared across the crate.
//!
//! None of these ever reach the end user as a crash: generation errors are
//! turned into a single error result by the dispatcher, host errors are
//! reduced to a boolean, and config errors fall back to defaults.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while producing a value for a command.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Fake data provider failed: {0}")]
    Provider(String),

    #[error("Generator for '{command}' panicked: {message}")]
    Panicked { command: String, message: String },
}

/// Failure of a host side effect (clipboard, query change).
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Failed to change query: {0}")]
    QueryChange(String),

    #[error("Host I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Failure while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config from {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown locale '{0}' (expected one of: en, fr_fr, de_de, pt_br)")]
    UnknownLocale(String),
}
