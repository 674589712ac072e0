//! Error types for Infragram operations.
//!
//! This module provides the main error type [`InfragramError`] which wraps
//! the error conditions that can occur while turning declaration files into
//! diagrams.

use std::io;

use thiserror::Error;

use infragram_parser::{ParseError, Source};

use crate::export;

/// The main error type for Infragram operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the structured diagnostics together with the
/// sources they point into, so that labels can be rendered against the
/// original text.
#[derive(Debug, Error)]
pub enum InfragramError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, sources: Vec<Source> },

    #[error("Configuration error: {0}")]
    Config(String),

    /// A required external program is missing.
    #[error("`{capability}` is not available")]
    EnvironmentNotReady { capability: String, hint: String },

    #[error("Render error: {0}")]
    Render(String),
}

impl From<export::Error> for InfragramError {
    fn from(error: export::Error) -> Self {
        match error {
            export::Error::Unavailable { program, hint } => Self::EnvironmentNotReady {
                capability: program,
                hint,
            },
            export::Error::Failed(message) => Self::Render(message),
            export::Error::Io(err) => Self::Io(err),
        }
    }
}

impl InfragramError {
    /// Create a new `Parse` error with the sources it was raised against.
    pub fn new_parse_error(err: ParseError, sources: &[Source]) -> Self {
        Self::Parse {
            err,
            sources: sources.to_vec(),
        }
    }
}
