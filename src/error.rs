//! Error types for environment file loading and parsing
//!
//! This module defines the error taxonomy: load-boundary failures that are
//! returned to the caller, parse-aborting conditions, and isolated plugin
//! hook failures that never abort a pass.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::loader::Encoding;

/// Top-level error returned by the load boundary
///
/// A failed load leaves the long-lived store untouched: the file is read and
/// parsed completely before any merge happens.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The environment file is missing or unreadable
    #[error("failed to read environment file '{path}': {source}")]
    Load {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The raw bytes cannot be decoded with the configured encoding
    #[error("environment file '{path}' is not valid {encoding:?}")]
    Encoding {
        /// Path that was read
        path: PathBuf,
        /// Encoding that rejected the bytes
        encoding: Encoding,
    },

    /// The source text was read but could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors that abort a parse pass
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// A placeholder chain references itself, directly or transitively
    ///
    /// The chain lists the keys in resolution order; the last element is the
    /// key that was revisited.
    #[error("cyclic interpolation: {}", chain.join(" -> "))]
    CyclicInterpolation {
        /// Keys visited while resolving, ending with the repeated key
        chain: Vec<String>,
    },
}

impl ParseError {
    /// Returns true if this error is a cyclic interpolation
    pub fn is_cyclic(&self) -> bool {
        matches!(self, ParseError::CyclicInterpolation { .. })
    }
}

/// A failure raised inside a plugin hook
///
/// Hook failures are isolated to the offending hook invocation: the registry
/// logs them and continues with the remaining hooks and lines.
#[derive(Debug, Clone, Error)]
#[error("plugin '{plugin}' failed: {message}")]
pub struct PluginError {
    /// Name of the plugin whose hook failed
    pub plugin: String,
    /// Human-readable failure description
    pub message: String,
}

impl PluginError {
    /// Creates a new plugin error
    pub fn new(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}
