//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `BoosterError`, so functions can simply return `Result<T>`.
use crate::error::BoosterError;

/// Workspace-wide `Result` alias with `BoosterError` as the default error.
pub type Result<T, E = BoosterError> = std::result::Result<T, E>;
