//! Infragram Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Infragram
//! extraction and diagram crates. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: CSS color parsing and Graphviz-friendly output ([`color::Color`])
//! - **Semantic**: Extracted entities and references ([`semantic`] module)
//! - **Catalog**: Static resource type, icon, and tier tables ([`catalog`] module)

pub mod catalog;
pub mod color;
pub mod identifier;
pub mod semantic;
