//! Container structure for Infragram diagrams.
//!
//! This module groups extracted entities into a tree of nested containers
//! rooted at the diagram scope. Placement follows three rules, tried in
//! order:
//!
//! 1. **Boundaries**: every network and subnetwork gets a container of its
//!    own. A subnetwork referencing a network nests inside that network's
//!    container.
//! 2. **Subnet membership**: an entity referencing a subnetwork, directly or
//!    through one intermediate entity, joins that subnetwork's container.
//! 3. **Tiers**: everything else joins a tier container (`Web Tier`,
//!    `Data Tier`, ...) created on demand under the root.
//!
//! The result is total and exclusive: each entity has exactly one innermost
//! container.

mod reference_graph;

use std::{collections::HashMap, sync::LazyLock};

use indexmap::IndexMap;
use log::{debug, trace};
use regex::Regex;

use infragram_core::{
    catalog::{ResourceKind, Tier},
    semantic::{Entity, EntityId},
};
use infragram_parser::Inventory;

use reference_graph::ReferenceGraph;

static CIDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,3}(?:\.\d{1,3}){3}/\d{1,2}\b").expect("CIDR pattern is valid")
});

/// Normalized attribute names that carry a network address range.
const ADDRESS_KEYS: &[&str] = &[
    "addressspace",
    "addressprefix",
    "addressprefixes",
    "cidrblock",
    "ipcidrrange",
];

/// Index of a container within its [`Grouping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(usize);

impl ContainerId {
    /// The diagram scope every other container descends from.
    pub const ROOT: ContainerId = ContainerId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A nested box in the diagram.
#[derive(Debug, Clone)]
pub struct Container {
    id: ContainerId,
    label: String,
    tier: Option<Tier>,
    parent: Option<ContainerId>,
    children: Vec<ContainerId>,
    members: Vec<EntityId>,
    anchor: Option<EntityId>,
}

impl Container {
    fn new(id: ContainerId, label: String, tier: Option<Tier>, parent: Option<ContainerId>) -> Self {
        Self {
            id,
            label,
            tier,
            parent,
            children: Vec::new(),
            members: Vec::new(),
            anchor: None,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The style tier; `None` only for the root.
    pub fn tier(&self) -> Option<Tier> {
        self.tier
    }

    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    /// Nested containers in creation order.
    pub fn children(&self) -> &[ContainerId] {
        &self.children
    }

    /// Entities whose innermost container is this one.
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// The network or subnetwork entity this container was created for.
    pub fn anchor(&self) -> Option<EntityId> {
        self.anchor
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// The container tree and the placement of every entity in it.
#[derive(Debug, Clone)]
pub struct Grouping {
    containers: Vec<Container>,
    placement: IndexMap<EntityId, ContainerId>,
}

impl Grouping {
    /// Places every entity of `inventory` in exactly one container.
    pub fn resolve(inventory: &Inventory) -> Self {
        let kinds: HashMap<EntityId, ResourceKind> = inventory
            .entities()
            .map(|entity| (entity.id(), ResourceKind::of(&entity.kind_name())))
            .collect();
        let kind_of = |id: EntityId| kinds.get(&id).copied().unwrap_or(ResourceKind::Unknown);
        let graph = ReferenceGraph::new(inventory.references());

        let mut grouping = Self {
            containers: vec![Container::new(
                ContainerId::ROOT,
                String::new(),
                None,
                None,
            )],
            placement: IndexMap::new(),
        };
        let mut tiers: HashMap<Tier, ContainerId> = HashMap::new();

        for entity in inventory.entities() {
            if kind_of(entity.id()) == ResourceKind::VirtualNetwork {
                grouping.add_boundary(entity, Tier::Network, ContainerId::ROOT);
            }
        }

        for entity in inventory.entities() {
            if kind_of(entity.id()) != ResourceKind::Subnet {
                continue;
            }
            let parent = graph
                .outgoing(entity.id())
                .filter(|&to| kind_of(to) == ResourceKind::VirtualNetwork)
                .find_map(|to| grouping.container_of(to))
                .unwrap_or(ContainerId::ROOT);
            let tier = Tier::for_subnet_name(&display_name(entity));
            grouping.add_boundary(entity, tier, parent);
        }

        for entity in inventory.entities() {
            let id = entity.id();
            let kind = kind_of(id);
            if kind.is_network_boundary() {
                continue;
            }

            let subnet_container = |to: EntityId| {
                (kind_of(to) == ResourceKind::Subnet)
                    .then(|| grouping.container_of(to))
                    .flatten()
            };
            let subnet = graph
                .outgoing(id)
                .find_map(subnet_container)
                .or_else(|| graph.second_hop(id).find_map(subnet_container));

            let container = match subnet {
                Some(container) => container,
                None => {
                    let tier = kind.tier();
                    *tiers
                        .entry(tier)
                        .or_insert_with(|| grouping.add_container(tier.label().to_string(), tier, ContainerId::ROOT))
                }
            };

            trace!(entity:% = id, container = grouping.containers[container.0].label.as_str(); "Placed entity");
            grouping.place(id, container);
        }

        debug!(
            containers = grouping.containers.len(),
            entities = grouping.placement.len();
            "Grouping resolved"
        );
        grouping
    }

    /// The diagram scope.
    pub fn root(&self) -> &Container {
        &self.containers[ContainerId::ROOT.0]
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    /// All containers in creation order, root first.
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    /// Innermost container of `entity`.
    pub fn container_of(&self, entity: EntityId) -> Option<ContainerId> {
        self.placement.get(&entity).copied()
    }

    fn add_container(&mut self, label: String, tier: Tier, parent: ContainerId) -> ContainerId {
        let id = ContainerId(self.containers.len());
        self.containers
            .push(Container::new(id, label, Some(tier), Some(parent)));
        self.containers[parent.0].children.push(id);
        id
    }

    fn add_boundary(&mut self, entity: &Entity, tier: Tier, parent: ContainerId) {
        let id = self.add_container(boundary_label(entity), tier, parent);
        self.containers[id.0].anchor = Some(entity.id());
        debug!(entity:% = entity.id(), tier:% = tier, label = self.containers[id.0].label.as_str(); "Added boundary container");
        self.place(entity.id(), id);
    }

    fn place(&mut self, entity: EntityId, container: ContainerId) {
        self.containers[container.0].members.push(entity);
        self.placement.insert(entity, container);
    }
}

/// The literal `name` attribute, or the declared name when the attribute is
/// missing or computed.
pub(crate) fn display_name(entity: &Entity) -> String {
    entity
        .literal("name")
        .map(str::to_string)
        .unwrap_or_else(|| entity.name())
}

/// Lowercased attribute key with `_` and `-` removed, so that
/// `address_prefix` and `addressPrefix` compare equal.
pub(crate) fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Last segment of a flattened attribute path.
pub(crate) fn leaf_key(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

fn boundary_label(entity: &Entity) -> String {
    let name = display_name(entity);
    match address_range(entity) {
        Some(range) => format!("{name}\n({range})"),
        None => name,
    }
}

/// First CIDR range in the shallowest address attribute.
fn address_range(entity: &Entity) -> Option<&str> {
    entity
        .attributes()
        .iter()
        .filter(|(path, _)| ADDRESS_KEYS.contains(&normalize_key(leaf_key(path)).as_str()))
        .filter_map(|(path, raw)| CIDR.find(raw).map(|found| (path, found.as_str())))
        .min_by_key(|(path, _)| path.matches('.').count())
        .map(|(_, range)| range)
}

#[cfg(test)]
mod tests {
    use super::*;

    use infragram_parser::{ExtractConfig, Source, extract};
    use proptest::prelude::*;

    fn inventory(name: &str, text: &str) -> Inventory {
        extract(&[Source::new(name, text)], &ExtractConfig::default()).unwrap()
    }

    fn container_named<'a>(grouping: &'a Grouping, label: &str) -> &'a Container {
        grouping
            .containers()
            .find(|c| c.label() == label)
            .unwrap_or_else(|| panic!("no container labelled {label:?}"))
    }

    fn placed_in(grouping: &Grouping, kind: &str, name: &str) -> String {
        let id = grouping
            .container_of(EntityId::new(kind, name))
            .unwrap_or_else(|| panic!("{kind}.{name} not placed"));
        grouping.container(id).unwrap().label().to_string()
    }

    const NETWORK: &str = r#"
resource "azurerm_virtual_network" "vnet" {
  name          = "vnet-contoso"
  address_space = ["10.10.0.0/16"]
}

resource "azurerm_subnet" "frontend" {
  name                 = "snet-frontend"
  virtual_network_name = azurerm_virtual_network.vnet.name
  address_prefixes     = ["10.10.1.0/24"]
}

resource "azurerm_network_interface" "web" {
  ip_configuration {
    subnet_id = azurerm_subnet.frontend.id
  }
}

resource "azurerm_linux_virtual_machine" "web" {
  network_interface_ids = [azurerm_network_interface.web.id]
}

resource "azurerm_key_vault" "kv" {
  name = "kv-contoso"
}

resource "random_pet" "suffix" {}
"#;

    #[test]
    fn test_network_subnet_vm_nesting() {
        let grouping = Grouping::resolve(&inventory("main.tf", NETWORK));

        let vnet = container_named(&grouping, "vnet-contoso\n(10.10.0.0/16)");
        assert_eq!(vnet.parent(), Some(ContainerId::ROOT));
        assert_eq!(vnet.tier(), Some(Tier::Network));
        assert_eq!(
            vnet.anchor(),
            Some(EntityId::new("azurerm_virtual_network", "vnet"))
        );

        let subnet = container_named(&grouping, "snet-frontend\n(10.10.1.0/24)");
        assert_eq!(subnet.parent(), Some(vnet.id()));
        assert_eq!(subnet.tier(), Some(Tier::Web));
        assert_eq!(vnet.children(), [subnet.id()]);

        // Direct reference, then one hop through the NIC.
        assert_eq!(
            placed_in(&grouping, "azurerm_network_interface", "web"),
            subnet.label()
        );
        assert_eq!(
            placed_in(&grouping, "azurerm_linux_virtual_machine", "web"),
            subnet.label()
        );
    }

    #[test]
    fn test_tier_fallback_and_unknown_types() {
        let grouping = Grouping::resolve(&inventory("main.tf", NETWORK));

        assert_eq!(placed_in(&grouping, "azurerm_key_vault", "kv"), "Security");
        assert_eq!(placed_in(&grouping, "random_pet", "suffix"), "Other Resources");

        let other = container_named(&grouping, "Other Resources");
        assert_eq!(other.parent(), Some(ContainerId::ROOT));
        assert_eq!(other.tier(), Some(Tier::Other));

        // Tier containers exist only when used.
        assert!(grouping.containers().all(|c| c.label() != "Data Tier"));
    }

    #[test]
    fn test_subnet_without_network_sits_at_root() {
        let grouping = Grouping::resolve(&inventory(
            "main.tf",
            "resource \"aws_subnet\" \"db\" {\n  cidr_block = \"10.0.3.0/24\"\n}\n",
        ));

        let subnet = container_named(&grouping, "db\n(10.0.3.0/24)");
        assert_eq!(subnet.parent(), Some(ContainerId::ROOT));
        assert_eq!(subnet.tier(), Some(Tier::Data));
        assert_eq!(subnet.members(), [EntityId::new("aws_subnet", "db")]);
    }

    #[test]
    fn test_network_declared_after_subnet() {
        let grouping = Grouping::resolve(&inventory(
            "main.tf",
            r#"
resource "aws_subnet" "app" {
  vpc_id = aws_vpc.main.id
}

resource "aws_vpc" "main" {
  cidr_block = "10.0.0.0/16"
}
"#,
        ));

        let vpc = container_named(&grouping, "main\n(10.0.0.0/16)");
        let subnet = container_named(&grouping, "app");
        assert_eq!(subnet.parent(), Some(vpc.id()));
        assert_eq!(subnet.tier(), Some(Tier::App));
    }

    #[test]
    fn test_bicep_nested_subnet() {
        let grouping = Grouping::resolve(&inventory(
            "main.bicep",
            r#"
resource vnet 'Microsoft.Network/virtualNetworks@2023-05-01' = {
  name: 'cust1Vnet'
  properties: {
    addressSpace: {
      addressPrefixes: [
        '10.0.0.0/16'
      ]
    }
    subnets: [
      {
        name: 'inline'
        properties: {
          addressPrefix: '10.0.9.0/24'
        }
      }
    ]
  }

  resource db 'subnets' = {
    name: 'DBSubnetName'
    properties: {
      addressPrefix: '10.0.2.0/24'
    }
  }
}

resource sql 'Microsoft.Network/networkInterfaces@2023-05-01' = {
  name: 'sql-nic'
  properties: {
    subnetId: vnet::db.id
  }
}
"#,
        ));

        let vnet = container_named(&grouping, "cust1Vnet\n(10.0.0.0/16)");
        let subnet = container_named(&grouping, "DBSubnetName\n(10.0.2.0/24)");
        assert_eq!(subnet.parent(), Some(vnet.id()));
        assert_eq!(subnet.tier(), Some(Tier::Data));
        assert_eq!(
            placed_in(&grouping, "Microsoft.Network/networkInterfaces", "sql"),
            subnet.label()
        );
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("address_prefix"), "addressprefix");
        assert_eq!(normalize_key("addressPrefix"), "addressprefix");
        assert_eq!(normalize_key("frontend-port"), "frontendport");
        assert_eq!(leaf_key("properties.addressSpace.addressPrefixes"), "addressPrefixes");
        assert_eq!(leaf_key("name"), "name");
    }

    // =====================================================================
    // Property-based tests
    // =====================================================================

    /// Strategy for resource types, mixing boundaries, mapped, and unknown types
    fn type_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("azurerm_virtual_network"),
            Just("azurerm_subnet"),
            Just("azurerm_network_interface"),
            Just("azurerm_linux_virtual_machine"),
            Just("azurerm_mssql_server"),
            Just("random_pet"),
        ]
    }

    /// Strategy for declarations, each optionally referencing an earlier or
    /// later declaration by position
    fn declarations_strategy() -> impl Strategy<Value = Vec<(&'static str, Option<usize>)>> {
        prop::collection::vec((type_strategy(), prop::option::of(0usize..10)), 0..10)
    }

    fn render(declarations: &[(&'static str, Option<usize>)]) -> String {
        let mut text = String::new();
        for (i, (kind, target)) in declarations.iter().enumerate() {
            text.push_str(&format!("resource \"{kind}\" \"r{i}\" {{\n"));
            let target = target.and_then(|t| declarations.get(t).map(|(kind, _)| (*kind, t)));
            if let Some((target_kind, t)) = target {
                text.push_str(&format!("  link = {target_kind}.r{t}.id\n"));
            }
            text.push_str("}\n");
        }
        text
    }

    fn check_grouping_is_total_and_exclusive(
        declarations: &[(&'static str, Option<usize>)],
    ) -> Result<(), TestCaseError> {
        let inventory = inventory("gen.tf", &render(declarations));
        let grouping = Grouping::resolve(&inventory);

        let members: usize = grouping.containers().map(|c| c.members().len()).sum();
        prop_assert_eq!(members, inventory.len());

        for entity in inventory.entities() {
            let container = grouping.container_of(entity.id());
            prop_assert!(container.is_some(), "{} not placed", entity.id());
            let container = grouping.container(container.unwrap()).unwrap();
            prop_assert!(container.members().contains(&entity.id()));
            prop_assert!(!container.is_root());
        }

        let count = grouping.containers().count();
        for container in grouping.containers().skip(1) {
            let mut depth = 0;
            let mut current = container.parent();
            while let Some(parent) = current {
                depth += 1;
                prop_assert!(depth <= count, "cycle above {}", container.label());
                current = grouping.container(parent).unwrap().parent();
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn grouping_is_total_and_exclusive(declarations in declarations_strategy()) {
            check_grouping_is_total_and_exclusive(&declarations)?;
        }
    }
}
