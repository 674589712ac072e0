//! Semantic model produced by extraction.
//!
//! An [`Entity`] is one declared infrastructure resource; a [`Reference`] is a
//! directed usage link between two entities. Both are immutable once the
//! extractor hands them over.

use std::fmt;

use indexmap::IndexMap;

use crate::identifier::Id;

/// Source language of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Terraform / HCL (`resource "type" "name" { ... }`).
    Terraform,
    /// Azure Bicep (`resource name 'Type@version' = { ... }`).
    Bicep,
}

impl Dialect {
    /// Attribute naming the explicit dependency list in this dialect.
    pub fn depends_on_key(self) -> &'static str {
        match self {
            Dialect::Terraform => "depends_on",
            Dialect::Bicep => "dependsOn",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Terraform => write!(f, "terraform"),
            Dialect::Bicep => write!(f, "bicep"),
        }
    }
}

/// Unique identity of an entity: its declared type and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    kind: Id,
    name: Id,
}

impl EntityId {
    /// Creates an entity id from a resource type and name.
    pub fn new(kind: &str, name: &str) -> Self {
        Self {
            kind: Id::new(kind),
            name: Id::new(name),
        }
    }

    /// The declared resource type, e.g. `azurerm_subnet`.
    pub fn kind(&self) -> Id {
        self.kind
    }

    /// The declared resource name (Terraform label or Bicep symbol).
    pub fn name(&self) -> Id {
        self.name
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.name)
    }
}

/// One declared infrastructure resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    dialect: Dialect,
    attributes: IndexMap<String, String>,
}

impl Entity {
    /// Creates a new entity.
    ///
    /// # Arguments
    ///
    /// * `id` - Type and name of the declaration.
    /// * `dialect` - Language the declaration was written in.
    /// * `attributes` - Flattened attribute paths mapped to their raw expression text.
    pub fn new(id: EntityId, dialect: Dialect, attributes: IndexMap<String, String>) -> Self {
        Self {
            id,
            dialect,
            attributes,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The declared resource type as an owned string.
    pub fn kind_name(&self) -> String {
        self.id.kind.as_string()
    }

    /// The declared name as an owned string.
    pub fn name(&self) -> String {
        self.id.name.as_string()
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Raw expression text of the attribute at `path`.
    pub fn attribute(&self, path: &str) -> Option<&str> {
        self.attributes.get(path).map(String::as_str)
    }

    /// Literal value of the attribute at `path`, if it is a plain string,
    /// number, or boolean rather than an expression.
    pub fn literal(&self, path: &str) -> Option<&str> {
        self.attribute(path).and_then(literal_value)
    }

    /// How other declarations of the same dialect refer to this entity.
    ///
    /// Terraform addresses resources as `type.name` (data sources as
    /// `data.type.name`); Bicep uses the bare symbolic name.
    pub fn address(&self) -> String {
        match self.dialect {
            Dialect::Terraform => self.id.to_string(),
            Dialect::Bicep => self.name(),
        }
    }
}

/// Returns the literal text of a raw attribute value.
///
/// Quoted strings without interpolation are unquoted; bare numbers and
/// booleans are returned as-is. Anything else is an expression and yields
/// `None`.
///
/// # Examples
///
/// ```
/// use infragram_core::semantic::literal_value;
///
/// assert_eq!(literal_value("\"cust1Vnet\""), Some("cust1Vnet"));
/// assert_eq!(literal_value("'Tcp'"), Some("Tcp"));
/// assert_eq!(literal_value("80"), Some("80"));
/// assert_eq!(literal_value("azurerm_subnet.fe.id"), None);
/// assert_eq!(literal_value("\"${var.prefix}-vnet\""), None);
/// ```
pub fn literal_value(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            let inner = &raw[1..raw.len() - 1];
            if inner.contains("${") || inner.contains(quote) {
                return None;
            }
            return Some(inner);
        }
    }

    let is_number = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
        && raw.chars().any(|c| c.is_ascii_digit());
    if is_number || raw == "true" || raw == "false" {
        Some(raw)
    } else {
        None
    }
}

/// How a reference was expressed in the declaring entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Listed in the explicit dependency attribute.
    DependsOn,
    /// Mentioned inside an ordinary attribute value.
    AttributeReference,
    /// Named by a `parent` attribute or by lexical nesting (Bicep child resources).
    Parent,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::DependsOn => write!(f, "depends_on"),
            ReferenceKind::AttributeReference => write!(f, "attribute_reference"),
            ReferenceKind::Parent => write!(f, "parent"),
        }
    }
}

/// A directed link from the declaring entity to the entity it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    from: EntityId,
    to: EntityId,
    kind: ReferenceKind,
    origins: Vec<String>,
}

impl Reference {
    /// Creates a reference found in the attribute at `origin`.
    pub fn new(from: EntityId, to: EntityId, kind: ReferenceKind, origin: impl Into<String>) -> Self {
        Self {
            from,
            to,
            kind,
            origins: vec![origin.into()],
        }
    }

    pub fn from(&self) -> EntityId {
        self.from
    }

    pub fn to(&self) -> EntityId {
        self.to
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Attribute paths the reference was found in, in discovery order.
    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Records another attribute the same link was found in.
    pub fn add_origin(&mut self, origin: &str) {
        if !self.origins.iter().any(|existing| existing == origin) {
            self.origins.push(origin.to_string());
        }
    }
}
