//! Translation of a [`DiagramModel`] into a Graphviz graph.
//!
//! Containers become nested `cluster_<n>` subgraphs, entities become nodes
//! keyed by their address (`type.name`), and references become edges.
//! Output is fully determined by the model and layout configuration.

use std::fmt::Display;

use graphviz_rust::{
    dot_structures::{
        Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId, Stmt, Subgraph, Vertex,
    },
    printer::{DotPrinter, PrinterContext},
};

use infragram_core::{
    catalog::IconCategory,
    semantic::{EntityId, ReferenceKind},
};

use crate::{
    config::LayoutConfig,
    model::{DiagramEdge, DiagramModel, DiagramNode},
    structure::ContainerId,
};

const FONT: &str = "Sans-Serif";
/// Smallest font size handed to Graphviz, in points.
const MIN_FONT_SIZE: f32 = 1.0;

/// Builds the Graphviz graph for `model`.
pub fn to_graph(model: &DiagramModel, layout: &LayoutConfig) -> Graph {
    let mut graph_attributes = vec![
        attr("rankdir", plain(layout.direction())),
        attr("nodesep", plain(layout.node_spacing())),
        attr("ranksep", plain(layout.rank_spacing())),
        attr("fontsize", plain(font_size(layout.font_size()))),
        attr("fontname", quoted(FONT)),
        attr("bgcolor", quoted(&model.background().to_hex_string())),
        attr("splines", quoted(layout.splines())),
        attr("pad", plain(layout.pad())),
        attr("compound", plain("true")),
    ];
    if let Some(title) = model.title() {
        graph_attributes.push(attr("label", quoted(title)));
        graph_attributes.push(attr("labelloc", plain("t")));
    }

    let mut stmts = vec![
        Stmt::GAttribute(GraphAttributes::Graph(graph_attributes)),
        Stmt::GAttribute(GraphAttributes::Node(vec![
            attr("fontname", quoted(FONT)),
            attr("fontsize", plain(font_size(layout.font_size() - 1.0))),
            attr("style", quoted("rounded,filled")),
            attr("fillcolor", quoted("#ffffff")),
        ])),
        Stmt::GAttribute(GraphAttributes::Edge(vec![
            attr("fontname", quoted(FONT)),
            attr("fontsize", plain(font_size(layout.font_size() - 2.0))),
        ])),
    ];

    stmts.extend(container_stmts(model, ContainerId::ROOT));
    stmts.extend(model.edges().iter().map(edge_stmt));

    Graph::DiGraph {
        id: plain("infragram"),
        strict: false,
        stmts,
    }
}

/// Prints `graph` in the DOT language.
pub fn to_source(graph: &Graph) -> String {
    graph.print(&mut PrinterContext::default())
}

/// Member nodes followed by nested clusters of the container `id`.
fn container_stmts(model: &DiagramModel, id: ContainerId) -> Vec<Stmt> {
    let Some(container) = model.grouping().container(id) else {
        return Vec::new();
    };

    let mut stmts: Vec<Stmt> = container
        .members()
        .iter()
        .filter_map(|&entity| model.node(entity))
        .map(node_stmt)
        .collect();

    for &child in container.children() {
        let Some(cluster) = model.cluster(child) else {
            continue;
        };
        let style = cluster.style();
        let mut cluster_stmts = vec![
            Stmt::Attribute(attr("label", quoted(cluster.container().label()))),
            Stmt::Attribute(attr("bgcolor", quoted(&style.fill().to_hex_string()))),
            Stmt::Attribute(attr("style", quoted(style.border().as_str()))),
            Stmt::Attribute(attr("fontsize", plain(style.font_size()))),
            Stmt::Attribute(attr("margin", plain(style.margin()))),
        ];
        cluster_stmts.extend(container_stmts(model, child));

        stmts.push(Stmt::Subgraph(Subgraph {
            id: plain(format!("cluster_{}", child.index())),
            stmts: cluster_stmts,
        }));
    }

    stmts
}

fn node_stmt(node: &DiagramNode) -> Stmt {
    Stmt::Node(Node {
        id: node_id(node.entity()),
        attributes: vec![
            attr("label", quoted(node.label())),
            attr("shape", plain(shape(node.icon()))),
            attr("class", quoted(&format!("icon-{}", node.icon()))),
            attr("tooltip", quoted(&node.entity().to_string())),
        ],
    })
}

fn edge_stmt(edge: &DiagramEdge) -> Stmt {
    let mut attributes = Vec::new();
    if let Some(label) = edge.label() {
        attributes.push(attr("label", quoted(label)));
    }
    match edge.kind() {
        ReferenceKind::AttributeReference => {}
        ReferenceKind::DependsOn => {
            attributes.push(attr("style", plain("dashed")));
            attributes.push(attr("color", quoted("#757575")));
        }
        ReferenceKind::Parent => {
            attributes.push(attr("style", plain("dotted")));
            attributes.push(attr("arrowhead", plain("none")));
        }
    }

    Stmt::Edge(Edge {
        ty: EdgeTy::Pair(
            Vertex::N(node_id(edge.from())),
            Vertex::N(node_id(edge.to())),
        ),
        attributes,
    })
}

/// Graphviz node shape standing in for the icon family.
fn shape(icon: IconCategory) -> &'static str {
    match icon {
        IconCategory::Database => "cylinder",
        IconCategory::Storage => "folder",
        IconCategory::Firewall | IconCategory::SecurityGroup => "octagon",
        IconCategory::LoadBalancer | IconCategory::Gateway => "trapezium",
        IconCategory::Edge => "hexagon",
        IconCategory::Messaging => "cds",
        IconCategory::Monitoring => "note",
        IconCategory::Secrets => "component",
        IconCategory::PublicIp | IconCategory::NetworkInterface => "ellipse",
        IconCategory::Module | IconCategory::ResourceGroup => "tab",
        _ => "box",
    }
}

fn font_size(size: f32) -> f32 {
    size.max(MIN_FONT_SIZE)
}

fn node_id(entity: EntityId) -> NodeId {
    NodeId(quoted(&entity.to_string()), None)
}

fn attr(name: &str, value: Id) -> Attribute {
    Attribute(plain(name), value)
}

fn plain(value: impl Display) -> Id {
    Id::Plain(value.to_string())
}

/// A double-quoted DOT string; newlines become `\n` line breaks.
fn quoted(text: &str) -> Id {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('"');
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped.push('"');
    Id::Escaped(escaped)
}
