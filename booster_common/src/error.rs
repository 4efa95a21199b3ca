//! Error types shared between the market engine and the scanner.
//!
//! The `BoosterError` enum unifies the fatal failure cases of a run: I/O on the
//! snapshot files, JSON (de)serialization, malformed timestamps, HTTP client setup,
//! cache coverage violations and interrupted cooldowns. Per-item network failures are
//! not errors; they degrade to `Quote::Unavailable`.
use std::io;

use thiserror::Error;

/// Unified error type shared across the workspace.
#[derive(Error, Debug)]
pub enum BoosterError {
    /// I/O error originating from snapshot, credential or input files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A next-eligible timestamp did not match the `"%d %b @ %I:%M%p"` format.
    #[error("Invalid next-eligible timestamp: {0}")]
    TimeFormat(#[from] chrono::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An online run finished without a cache entry for some requested listings.
    #[error("Internal Logic Error: quotes missing after online run: {0:?}")]
    CoverageViolation(Vec<String>),

    /// The cooldown wait was cancelled; the checkpoint had already been written.
    #[error("Interrupted during cooldown")]
    Interrupted,
}
