//! Error types for the entire library.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//!
//! None of these ever escape a profiled call: rendering and resolution
//! failures are turned into text where they happen.

use thiserror::Error;

/// Errors raised while building a `ProfilingConfig`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown profiling mode: {0} (expected PLAIN, TREE or VERBOSE)")]
    UnknownMode(String),
}

/// A value's textual form could not be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The real type behind a proxied call target could not be determined
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Target lookup failed: {0}")]
    LookupFailed(String),
}
