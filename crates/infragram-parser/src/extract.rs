//! Entity extraction across one or more declaration sources.

use std::{collections::HashMap, path::Path};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Deserialize;

use infragram_core::semantic::{Dialect, Entity, EntityId, Reference};

use crate::{
    bicep,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    hcl, references,
    span::Span,
};

/// A declaration as read from source, before it becomes an [`Entity`].
#[derive(Debug)]
pub(crate) struct Declaration {
    pub kind: String,
    pub name: String,
    pub attributes: IndexMap<String, String>,
    /// Header of the declaration (`resource "type" "name"`).
    pub span: Span,
}

/// One declaration file.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    text: String,
    dialect: Dialect,
}

impl Source {
    /// Creates a source, choosing the dialect from the file extension of
    /// `name` or, failing that, from the content.
    ///
    /// # Examples
    ///
    /// ```
    /// use infragram_core::semantic::Dialect;
    /// use infragram_parser::Source;
    ///
    /// let tf = Source::new("main.tf", "resource \"aws_vpc\" \"main\" {}");
    /// assert_eq!(tf.dialect(), Dialect::Terraform);
    ///
    /// let bicep = Source::new("stdin", "resource vnet 'Microsoft.Network/virtualNetworks@2023-05-01' = {}");
    /// assert_eq!(bicep.dialect(), Dialect::Bicep);
    /// ```
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        let text = text.into();
        let dialect = detect_dialect(&name, &text);
        Self {
            name,
            text,
            dialect,
        }
    }

    /// Overrides the detected dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

fn detect_dialect(name: &str, text: &str) -> Dialect {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("bicep") => Dialect::Bicep,
        Some("tf") | Some("hcl") => Dialect::Terraform,
        _ => {
            let looks_like_bicep = text.lines().any(|line| {
                let mut words = line.split_whitespace();
                matches!(words.next(), Some("resource" | "module"))
                    && words.next().is_some_and(|symbol| !symbol.starts_with('"'))
                    && words.next().is_some_and(|ty| ty.starts_with('\''))
            });
            if looks_like_bicep {
                Dialect::Bicep
            } else {
                Dialect::Terraform
            }
        }
    }
}

/// How a second declaration of the same `(type, name)` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The later declaration replaces the earlier one; a warning is recorded.
    #[default]
    LastWins,
    /// Extraction fails.
    Error,
}

/// Extraction settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    duplicates: DuplicatePolicy,
}

impl ExtractConfig {
    pub fn new(duplicates: DuplicatePolicy) -> Self {
        Self { duplicates }
    }

    pub fn duplicates(&self) -> DuplicatePolicy {
        self.duplicates
    }
}

/// Everything extracted from a set of sources.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    entities: IndexMap<EntityId, Entity>,
    references: Vec<Reference>,
    warnings: Vec<Diagnostic>,
}

impl Inventory {
    /// Entities in first-appearance order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// References in discovery order.
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Non-fatal diagnostics raised during extraction.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

/// Extract entities and references from `sources`.
///
/// # Errors
///
/// Returns a [`ParseError`] with every diagnostic when a duplicate
/// declaration is found and `config` treats duplicates as errors.
/// Unreadable declarations are never errors; they are skipped.
///
/// # Examples
///
/// ```
/// use infragram_parser::{ExtractConfig, Source, extract};
///
/// let source = Source::new(
///     "network.tf",
///     r#"
/// resource "azurerm_virtual_network" "vnet" {
///   name = "vnet"
/// }
///
/// resource "azurerm_subnet" "web" {
///   virtual_network_name = azurerm_virtual_network.vnet.name
/// }
/// "#,
/// );
///
/// let inventory = extract(&[source], &ExtractConfig::default()).unwrap();
/// assert_eq!(inventory.len(), 2);
/// assert_eq!(inventory.references().len(), 1);
/// ```
pub fn extract(sources: &[Source], config: &ExtractConfig) -> Result<Inventory, ParseError> {
    let mut collector = DiagnosticCollector::new();
    let mut entities: IndexMap<EntityId, Entity> = IndexMap::new();
    let mut first_seen: HashMap<EntityId, (usize, Span)> = HashMap::new();

    for (index, source) in sources.iter().enumerate() {
        let dialect = source.dialect();
        let declarations = match dialect {
            Dialect::Terraform => hcl::read(source.text()),
            Dialect::Bicep => bicep::read(source.text()),
        };
        debug!(
            source = source.name(),
            dialect:? = dialect,
            declarations = declarations.len();
            "Read source"
        );

        for declaration in declarations {
            let id = EntityId::new(&declaration.kind, &declaration.name);
            match first_seen.get(&id) {
                Some(&(first_index, first_span)) => {
                    warn!(entity:% = id, source = source.name(); "Duplicate declaration");
                    collector.emit(duplicate_diagnostic(
                        id,
                        config.duplicates(),
                        (index, declaration.span),
                        (first_index, first_span),
                        sources,
                    ));
                }
                None => {
                    first_seen.insert(id, (index, declaration.span));
                }
            }
            entities.insert(id, Entity::new(id, dialect, declaration.attributes));
        }
    }

    let warnings = collector.finish()?;
    let references = references::resolve(&entities);

    info!(
        entities = entities.len(),
        references = references.len(),
        warnings = warnings.len();
        "Extraction complete"
    );

    Ok(Inventory {
        entities,
        references,
        warnings,
    })
}

fn duplicate_diagnostic(
    id: EntityId,
    policy: DuplicatePolicy,
    (index, span): (usize, Span),
    (first_index, first_span): (usize, Span),
    sources: &[Source],
) -> Diagnostic {
    let message = format!("`{id}` is declared more than once");
    let help = match policy {
        DuplicatePolicy::LastWins => "the last declaration replaces the earlier ones",
        DuplicatePolicy::Error => "remove the duplicate or rename it",
    };
    let diagnostic = match policy {
        DuplicatePolicy::LastWins => Diagnostic::warning(message),
        DuplicatePolicy::Error => Diagnostic::error(message),
    }
    .with_code(ErrorCode::E301)
    .with_source(index)
    .with_label(span, "duplicate declaration");

    if first_index == index {
        diagnostic
            .with_secondary_label(first_span, "first declared here")
            .with_help(help)
    } else {
        let first_name = sources
            .get(first_index)
            .map_or("another source", Source::name);
        diagnostic.with_help(format!("first declared in `{first_name}`; {help}"))
    }
}
