//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in source code.
///
/// - **Primary labels** mark the main location of the problem.
/// - **Secondary labels** add context, such as "first declared here".
///
/// ```text
/// warning[E301]: `azurerm_subnet.fe` is declared more than once
///   --> network.tf:22:1
///    |
/// 22 | resource "azurerm_subnet" "fe" {
///    | ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ duplicate declaration
///    |
///   --> network.tf:8:1
///    |
///  8 | resource "azurerm_subnet" "fe" {
///    | ------------------------------ first declared here
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
