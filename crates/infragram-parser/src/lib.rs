//! # Infragram Parser
//!
//! Reads Terraform (`.tf`) and Azure Bicep (`.bicep`) declaration files and
//! extracts the declared resources as entities, together with the references
//! between them.
//!
//! ## Usage
//!
//! ```
//! # use infragram_parser::{extract, ExtractConfig, ParseError, Source};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = Source::new(
//!         "main.bicep",
//!         r#"
//! resource vnet 'Microsoft.Network/virtualNetworks@2023-05-01' = {
//!   name: 'vnet'
//!   resource web 'subnets' = {
//!     name: 'snet-web'
//!   }
//! }
//! "#,
//!     );
//!
//!     let inventory = extract(&[source], &ExtractConfig::default())?;
//!     assert_eq!(inventory.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! Declarations that cannot be read are skipped; extraction only fails when
//! duplicate declarations are configured as errors.

mod bicep;
pub mod error;
mod extract;
mod hcl;
mod references;
mod span;
mod syntax;

pub use error::ParseError;
pub use extract::{DuplicatePolicy, ExtractConfig, Inventory, Source, extract};
pub use span::Span;
