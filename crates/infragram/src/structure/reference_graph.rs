//! Directed adjacency over extracted references.
//!
//! Grouping only ever walks references forwards (declaring entity to the
//! entity it uses), so only outgoing edges are tracked. Edge order is the
//! order in which references were added, which keeps every walk
//! deterministic.

use std::collections::HashMap;

use infragram_core::semantic::{EntityId, Reference};

/// Outgoing references per entity.
#[derive(Debug, Default)]
pub(super) struct ReferenceGraph {
    outgoing: HashMap<EntityId, Vec<EntityId>>,
}

impl ReferenceGraph {
    /// Builds the graph from references in discovery order.
    pub(super) fn new<'a>(references: impl IntoIterator<Item = &'a Reference>) -> Self {
        let mut graph = Self::default();
        for reference in references {
            graph.add_edge(reference.from(), reference.to());
        }
        graph
    }

    /// Entities referenced by `source`, in reference order.
    pub(super) fn outgoing(&self, source: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.outgoing.get(&source).into_iter().flatten().copied()
    }

    /// Entities reachable from `source` in exactly two hops, ordered by the
    /// first hop and then the second.
    pub(super) fn second_hop(&self, source: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.outgoing(source)
            .flat_map(move |via| self.outgoing(via).filter(move |&to| to != source))
    }

    fn add_edge(&mut self, source: EntityId, target: EntityId) {
        self.outgoing.entry(source).or_default().push(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use infragram_core::semantic::ReferenceKind;

    fn reference(from: &str, to: &str) -> Reference {
        Reference::new(
            EntityId::new("t", from),
            EntityId::new("t", to),
            ReferenceKind::AttributeReference,
            "attr",
        )
    }

    #[test]
    fn test_outgoing_preserves_order() {
        let references = [reference("a", "c"), reference("a", "b"), reference("b", "c")];
        let graph = ReferenceGraph::new(&references);

        let targets: Vec<EntityId> = graph.outgoing(EntityId::new("t", "a")).collect();
        assert_eq!(targets, [EntityId::new("t", "c"), EntityId::new("t", "b")]);
        assert_eq!(graph.outgoing(EntityId::new("t", "c")).count(), 0);
    }

    #[test]
    fn test_second_hop_skips_source() {
        let references = [
            reference("vm", "nic"),
            reference("nic", "vm"),
            reference("nic", "subnet"),
        ];
        let graph = ReferenceGraph::new(&references);

        let reached: Vec<EntityId> = graph.second_hop(EntityId::new("t", "vm")).collect();
        assert_eq!(reached, [EntityId::new("t", "subnet")]);
    }
}
