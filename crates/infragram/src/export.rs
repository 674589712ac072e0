//! Export functionality for Infragram diagrams.
//!
//! This module turns a [`DiagramModel`] into files on disk. It is the final
//! stage in the Infragram processing pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Declaration files
//!     ↓ extract
//! Inventory (entities + references)
//!     ↓ structure
//! Grouping (container tree)
//!     ↓ model
//! DiagramModel
//!     ↓ export (this module)
//! <base>.png, <base>.dot, <base>.drawio
//! ```
//!
//! # Backends
//!
//! - [`dot`] translates the model into a Graphviz graph.
//! - [`RenderBackend`] lays the graph out and writes images; the default
//!   implementation is [`GraphvizRenderer`].
//! - [`FormatConverter`] turns the laid-out graph into an editable document;
//!   the default implementation is [`ExternalConverter`].
//!
//! Both traits exist so that tests and embedders can substitute their own
//! implementations.
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. [`Error`] converts into
//! [`InfragramError`] at the crate boundary.
//!
//! [`DiagramModel`]: crate::model::DiagramModel
//! [`InfragramError`]: crate::InfragramError

mod convert;
pub mod dot;
mod graphviz;

pub use convert::{ExternalConverter, FormatConverter};
pub use graphviz::{GraphvizRenderer, RenderBackend, RenderedFiles};

pub(crate) use graphviz::output_path;

/// Errors that can occur during diagram export.
#[derive(Debug)]
pub enum Error {
    /// An external program could not be started.
    Unavailable { program: String, hint: String },
    /// An external program ran and reported failure.
    Failed(String),
    /// An I/O error encountered while preparing or writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { program, .. } => write!(f, "`{program}` is not available"),
            Self::Failed(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unavailable { .. } | Self::Failed(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
