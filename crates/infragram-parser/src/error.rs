//! Error and diagnostic system for the Infragram extractor.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors and warnings
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, the index of
//! the source it points into, multiple source locations, and help text.
//! Multiple error diagnostics are wrapped in [`ParseError`] for returning
//! from extraction; warnings travel with the extracted inventory.
//!
//! # Example
//!
//! ```
//! # use infragram_parser::error::{Diagnostic, ErrorCode};
//! # use infragram_parser::Span;
//!
//! let span = Span::new(100..120);
//! let original_span = Span::new(50..70);
//!
//! let diag = Diagnostic::warning("`azurerm_subnet.fe` is declared more than once")
//!     .with_code(ErrorCode::E301)
//!     .with_source(0)
//!     .with_label(span, "duplicate declaration")
//!     .with_secondary_label(original_span, "first declared here")
//!     .with_help("the last declaration wins");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
