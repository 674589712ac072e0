//! Renderer-agnostic diagram model.
//!
//! [`DiagramModel`] joins the extracted [`Inventory`] with its [`Grouping`]
//! and resolves everything a renderer needs: one node per entity, one edge
//! per reference, and a style for every cluster. No positions are computed
//! here.

use log::{debug, info};

use infragram_core::{
    catalog::{IconCategory, ResourceKind, Tier},
    color::Color,
    semantic::{EntityId, Reference, ReferenceKind, literal_value},
};
use infragram_parser::Inventory;

use crate::{
    InfragramError,
    config::StyleConfig,
    structure::{Container, ContainerId, Grouping, display_name, leaf_key, normalize_key},
};

/// Normalized attribute names naming a protocol.
const PROTOCOL_KEYS: &[&str] = &["protocol"];

/// Normalized attribute names naming a port, in preference order.
const PORT_KEYS: &[&str] = &[
    "port",
    "frontendport",
    "backendport",
    "listenerport",
    "destinationportrange",
    "toport",
];

/// A drawable resource.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNode {
    entity: EntityId,
    icon: IconCategory,
    label: String,
    container: ContainerId,
}

impl DiagramNode {
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn icon(&self) -> IconCategory {
        self.icon
    }

    /// Display name on the first line, resource type on the second.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Innermost container the node is drawn in.
    pub fn container(&self) -> ContainerId {
        self.container
    }
}

/// A drawable reference between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramEdge {
    from: EntityId,
    to: EntityId,
    label: Option<String>,
    kind: ReferenceKind,
}

impl DiagramEdge {
    pub fn from(&self) -> EntityId {
        self.from
    }

    pub fn to(&self) -> EntityId {
        self.to
    }

    /// Protocol/port hint, when the declaring entity carries one.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }
}

/// Border drawn around a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Dashed,
    Rounded,
}

impl BorderStyle {
    /// Graphviz `style` value.
    pub fn as_str(self) -> &'static str {
        match self {
            BorderStyle::Dashed => "dashed",
            BorderStyle::Rounded => "rounded",
        }
    }
}

/// Resolved visual style of one cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterStyle {
    fill: Color,
    border: BorderStyle,
    font_size: f32,
    margin: f32,
}

impl ClusterStyle {
    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn border(&self) -> BorderStyle {
        self.border
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }
}

/// A container together with its resolved style.
#[derive(Debug, Clone, Copy)]
pub struct Cluster<'a> {
    container: &'a Container,
    style: ClusterStyle,
}

impl<'a> Cluster<'a> {
    pub fn container(&self) -> &'a Container {
        self.container
    }

    pub fn style(&self) -> ClusterStyle {
        self.style
    }
}

/// Everything needed to render one diagram.
#[derive(Debug, Clone)]
pub struct DiagramModel {
    title: Option<String>,
    background: Color,
    inventory: Inventory,
    grouping: Grouping,
    styles: Vec<Option<ClusterStyle>>,
    nodes: Vec<DiagramNode>,
    edges: Vec<DiagramEdge>,
}

impl DiagramModel {
    /// Groups the inventory and resolves nodes, edges, and cluster styles.
    ///
    /// # Errors
    ///
    /// Returns [`InfragramError::Config`] when a configured color cannot be
    /// parsed.
    pub fn build(inventory: Inventory, style: &StyleConfig) -> Result<Self, InfragramError> {
        let grouping = Grouping::resolve(&inventory);
        let background = style.background_color().map_err(InfragramError::Config)?;

        let styles = grouping
            .containers()
            .map(|container| cluster_style(container, style).transpose())
            .collect::<Result<Vec<_>, _>>()
            .map_err(InfragramError::Config)?;

        let nodes: Vec<DiagramNode> = inventory
            .entities()
            .filter_map(|entity| {
                let container = grouping.container_of(entity.id())?;
                Some(DiagramNode {
                    entity: entity.id(),
                    icon: ResourceKind::of(&entity.kind_name()).icon(),
                    label: format!("{}\n{}", display_name(entity), entity.kind_name()),
                    container,
                })
            })
            .collect();

        let edges: Vec<DiagramEdge> = inventory
            .references()
            .iter()
            .map(|reference| DiagramEdge {
                from: reference.from(),
                to: reference.to(),
                label: edge_label(&inventory, reference),
                kind: reference.kind(),
            })
            .collect();

        debug!(
            labelled_edges = edges.iter().filter(|edge| edge.label.is_some()).count();
            "Resolved edge labels"
        );
        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            clusters = grouping.containers().count() - 1;
            "Diagram model built"
        );

        Ok(Self {
            title: style.title().map(str::to_string),
            background,
            inventory,
            grouping,
            styles,
            nodes,
            edges,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    /// Nodes in entity order.
    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    /// Edges in reference order.
    pub fn edges(&self) -> &[DiagramEdge] {
        &self.edges
    }

    /// The node drawn for `entity`.
    pub fn node(&self, entity: EntityId) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.entity == entity)
    }

    /// Every container except the root, in creation order.
    pub fn clusters(&self) -> impl Iterator<Item = Cluster<'_>> {
        self.grouping
            .containers()
            .zip(&self.styles)
            .filter_map(|(container, style)| {
                style.map(|style| Cluster { container, style })
            })
    }

    /// The cluster for `id`, or `None` for the root.
    pub fn cluster(&self, id: ContainerId) -> Option<Cluster<'_>> {
        let container = self.grouping.container(id)?;
        let style = (*self.styles.get(id.index())?)?;
        Some(Cluster { container, style })
    }
}

fn cluster_style(container: &Container, style: &StyleConfig) -> Option<Result<ClusterStyle, String>> {
    let tier = container.tier()?;
    let fill = match style.fill(tier) {
        Ok(fill) => fill,
        Err(err) => return Some(Err(err)),
    };
    let resolved = match (tier, container.anchor()) {
        (Tier::Network, _) => ClusterStyle {
            fill,
            border: BorderStyle::Dashed,
            font_size: 14.0,
            margin: 25.0,
        },
        (_, Some(_)) => ClusterStyle {
            fill,
            border: BorderStyle::Rounded,
            font_size: 13.0,
            margin: 20.0,
        },
        (_, None) => ClusterStyle {
            fill,
            border: BorderStyle::Rounded,
            font_size: 13.0,
            margin: 15.0,
        },
    };
    Some(Ok(resolved))
}

/// Protocol/port label for `reference`, taken from the attribute scope the
/// reference was found in or the nearest enclosing scope with a hint.
fn edge_label(inventory: &Inventory, reference: &Reference) -> Option<String> {
    let entity = inventory.entity(reference.from())?;

    reference.origins().iter().find_map(|origin| {
        scopes(origin).find_map(|scope| {
            let in_scope = entity
                .attributes()
                .iter()
                .filter(|(path, _)| parent_scope(path) == scope);

            let mut protocol = None;
            let mut port: Option<(usize, &str)> = None;
            for (path, raw) in in_scope {
                let key = normalize_key(leaf_key(path));
                let Some(value) = literal_value(raw).filter(|v| !v.is_empty() && *v != "*") else {
                    continue;
                };
                if PROTOCOL_KEYS.contains(&key.as_str()) {
                    protocol.get_or_insert(value);
                } else if let Some(rank) = PORT_KEYS.iter().position(|k| *k == key) {
                    if port.is_none_or(|(best, _)| rank < best) {
                        port = Some((rank, value));
                    }
                }
            }

            match (protocol, port) {
                (Some(protocol), Some((_, port))) => {
                    Some(format!("{}:{port}", protocol.to_ascii_uppercase()))
                }
                (None, Some((_, port))) => Some(format!("Port {port}")),
                (Some(protocol), None) => Some(protocol.to_ascii_uppercase()),
                (None, None) => None,
            }
        })
    })
}

/// Scopes enclosing the attribute at `path`, innermost first, ending with
/// the entity's top level (`""`).
fn scopes(path: &str) -> impl Iterator<Item = &str> {
    let mut current = Some(parent_scope(path));
    std::iter::from_fn(move || {
        let scope = current?;
        current = (!scope.is_empty()).then(|| parent_scope(scope));
        Some(scope)
    })
}

fn parent_scope(path: &str) -> &str {
    path.rsplit_once('.').map_or("", |(parent, _)| parent)
}
