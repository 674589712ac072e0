//! Error codes for the Infragram diagnostic system.
//!
//! Codes follow the `E3xx` numbering of extraction-phase diagnostics.

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Duplicate declaration.
    ///
    /// A resource with this type and name has already been declared. The
    /// later declaration replaces the earlier one unless duplicates are
    /// configured as errors.
    E301,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E301").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E301 => "E301",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E301 => "duplicate declaration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
