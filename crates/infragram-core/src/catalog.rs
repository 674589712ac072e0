//! Static resource catalog.
//!
//! Maps declared resource types (Terraform, ARM/Bicep, and the common AWS and
//! GCP equivalents) onto a provider-neutral [`ResourceKind`], and each kind
//! onto the [`IconCategory`] it is drawn with and the [`Tier`] it falls back
//! to when no network placement is known.
//!
//! The type table is built once on first use and never mutated.

use std::{collections::HashMap, fmt, sync::LazyLock};

use serde::Deserialize;

/// Provider-neutral classification of a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    VirtualNetwork,
    Subnet,
    NetworkInterface,
    NetworkSecurityGroup,
    PublicIp,
    LoadBalancer,
    ApplicationGateway,
    FrontDoor,
    Firewall,
    RouteTable,
    VirtualMachine,
    ScaleSet,
    AvailabilitySet,
    AppService,
    AppServicePlan,
    FunctionApp,
    SqlServer,
    Database,
    StorageAccount,
    KeyVault,
    Messaging,
    LogAnalytics,
    AppInsights,
    ResourceGroup,
    Module,
    Unknown,
}

/// Resource type names, lowercased, mapped to their kind.
const TYPE_TABLE: &[(&str, ResourceKind)] = &[
    // Networks
    ("azurerm_virtual_network", ResourceKind::VirtualNetwork),
    ("microsoft.network/virtualnetworks", ResourceKind::VirtualNetwork),
    ("aws_vpc", ResourceKind::VirtualNetwork),
    ("google_compute_network", ResourceKind::VirtualNetwork),
    // Subnetworks
    ("azurerm_subnet", ResourceKind::Subnet),
    ("microsoft.network/virtualnetworks/subnets", ResourceKind::Subnet),
    ("aws_subnet", ResourceKind::Subnet),
    ("google_compute_subnetwork", ResourceKind::Subnet),
    // Network plumbing
    ("azurerm_network_interface", ResourceKind::NetworkInterface),
    ("microsoft.network/networkinterfaces", ResourceKind::NetworkInterface),
    ("aws_network_interface", ResourceKind::NetworkInterface),
    ("azurerm_network_security_group", ResourceKind::NetworkSecurityGroup),
    ("microsoft.network/networksecuritygroups", ResourceKind::NetworkSecurityGroup),
    ("aws_security_group", ResourceKind::NetworkSecurityGroup),
    ("google_compute_firewall", ResourceKind::NetworkSecurityGroup),
    ("azurerm_public_ip", ResourceKind::PublicIp),
    ("microsoft.network/publicipaddresses", ResourceKind::PublicIp),
    ("aws_eip", ResourceKind::PublicIp),
    ("google_compute_address", ResourceKind::PublicIp),
    ("azurerm_route_table", ResourceKind::RouteTable),
    ("microsoft.network/routetables", ResourceKind::RouteTable),
    ("aws_route_table", ResourceKind::RouteTable),
    ("google_compute_route", ResourceKind::RouteTable),
    // Load balancing and edge
    ("azurerm_lb", ResourceKind::LoadBalancer),
    ("azurerm_lb_backend_address_pool", ResourceKind::LoadBalancer),
    ("azurerm_lb_probe", ResourceKind::LoadBalancer),
    ("azurerm_lb_rule", ResourceKind::LoadBalancer),
    ("microsoft.network/loadbalancers", ResourceKind::LoadBalancer),
    ("aws_lb", ResourceKind::LoadBalancer),
    ("aws_lb_listener", ResourceKind::LoadBalancer),
    ("aws_lb_target_group", ResourceKind::LoadBalancer),
    ("google_compute_forwarding_rule", ResourceKind::LoadBalancer),
    ("azurerm_application_gateway", ResourceKind::ApplicationGateway),
    ("microsoft.network/applicationgateways", ResourceKind::ApplicationGateway),
    ("azurerm_cdn_frontdoor_profile", ResourceKind::FrontDoor),
    ("azurerm_frontdoor", ResourceKind::FrontDoor),
    ("microsoft.cdn/profiles", ResourceKind::FrontDoor),
    ("microsoft.network/frontdoors", ResourceKind::FrontDoor),
    ("aws_cloudfront_distribution", ResourceKind::FrontDoor),
    ("azurerm_firewall", ResourceKind::Firewall),
    ("microsoft.network/azurefirewalls", ResourceKind::Firewall),
    ("aws_networkfirewall_firewall", ResourceKind::Firewall),
    // Compute
    ("azurerm_virtual_machine", ResourceKind::VirtualMachine),
    ("azurerm_windows_virtual_machine", ResourceKind::VirtualMachine),
    ("azurerm_linux_virtual_machine", ResourceKind::VirtualMachine),
    ("microsoft.compute/virtualmachines", ResourceKind::VirtualMachine),
    ("aws_instance", ResourceKind::VirtualMachine),
    ("google_compute_instance", ResourceKind::VirtualMachine),
    ("azurerm_linux_virtual_machine_scale_set", ResourceKind::ScaleSet),
    ("azurerm_windows_virtual_machine_scale_set", ResourceKind::ScaleSet),
    ("microsoft.compute/virtualmachinescalesets", ResourceKind::ScaleSet),
    ("aws_autoscaling_group", ResourceKind::ScaleSet),
    ("azurerm_availability_set", ResourceKind::AvailabilitySet),
    ("microsoft.compute/availabilitysets", ResourceKind::AvailabilitySet),
    ("aws_placement_group", ResourceKind::AvailabilitySet),
    ("azurerm_app_service", ResourceKind::AppService),
    ("azurerm_linux_web_app", ResourceKind::AppService),
    ("azurerm_windows_web_app", ResourceKind::AppService),
    ("microsoft.web/sites", ResourceKind::AppService),
    ("azurerm_service_plan", ResourceKind::AppServicePlan),
    ("azurerm_app_service_plan", ResourceKind::AppServicePlan),
    ("microsoft.web/serverfarms", ResourceKind::AppServicePlan),
    ("azurerm_function_app", ResourceKind::FunctionApp),
    ("azurerm_linux_function_app", ResourceKind::FunctionApp),
    ("azurerm_windows_function_app", ResourceKind::FunctionApp),
    ("aws_lambda_function", ResourceKind::FunctionApp),
    ("google_cloudfunctions_function", ResourceKind::FunctionApp),
    // Data
    ("azurerm_mssql_server", ResourceKind::SqlServer),
    ("azurerm_sql_server", ResourceKind::SqlServer),
    ("microsoft.sql/servers", ResourceKind::SqlServer),
    ("azurerm_mssql_database", ResourceKind::Database),
    ("azurerm_sql_database", ResourceKind::Database),
    ("microsoft.sql/servers/databases", ResourceKind::Database),
    ("azurerm_cosmosdb_account", ResourceKind::Database),
    ("microsoft.documentdb/databaseaccounts", ResourceKind::Database),
    ("azurerm_postgresql_flexible_server", ResourceKind::Database),
    ("azurerm_mysql_flexible_server", ResourceKind::Database),
    ("aws_db_instance", ResourceKind::Database),
    ("aws_rds_cluster", ResourceKind::Database),
    ("aws_dynamodb_table", ResourceKind::Database),
    ("google_sql_database_instance", ResourceKind::Database),
    ("azurerm_storage_account", ResourceKind::StorageAccount),
    ("azurerm_storage_container", ResourceKind::StorageAccount),
    ("microsoft.storage/storageaccounts", ResourceKind::StorageAccount),
    ("aws_s3_bucket", ResourceKind::StorageAccount),
    ("google_storage_bucket", ResourceKind::StorageAccount),
    // Security
    ("azurerm_key_vault", ResourceKind::KeyVault),
    ("azurerm_key_vault_secret", ResourceKind::KeyVault),
    ("microsoft.keyvault/vaults", ResourceKind::KeyVault),
    ("aws_kms_key", ResourceKind::KeyVault),
    ("aws_secretsmanager_secret", ResourceKind::KeyVault),
    // Integration
    ("azurerm_servicebus_namespace", ResourceKind::Messaging),
    ("azurerm_servicebus_queue", ResourceKind::Messaging),
    ("azurerm_servicebus_topic", ResourceKind::Messaging),
    ("azurerm_eventhub_namespace", ResourceKind::Messaging),
    ("microsoft.servicebus/namespaces", ResourceKind::Messaging),
    ("aws_sqs_queue", ResourceKind::Messaging),
    ("aws_sns_topic", ResourceKind::Messaging),
    ("google_pubsub_topic", ResourceKind::Messaging),
    // Monitoring
    ("azurerm_log_analytics_workspace", ResourceKind::LogAnalytics),
    ("azurerm_monitor_diagnostic_setting", ResourceKind::LogAnalytics),
    ("microsoft.operationalinsights/workspaces", ResourceKind::LogAnalytics),
    ("aws_cloudwatch_log_group", ResourceKind::LogAnalytics),
    ("aws_cloudwatch_metric_alarm", ResourceKind::LogAnalytics),
    ("azurerm_application_insights", ResourceKind::AppInsights),
    ("microsoft.insights/components", ResourceKind::AppInsights),
    // Management
    ("azurerm_resource_group", ResourceKind::ResourceGroup),
    ("microsoft.resources/resourcegroups", ResourceKind::ResourceGroup),
    ("module", ResourceKind::Module),
];

static KIND_BY_TYPE: LazyLock<HashMap<&'static str, ResourceKind>> =
    LazyLock::new(|| TYPE_TABLE.iter().copied().collect());

impl ResourceKind {
    /// Classifies a declared resource type.
    ///
    /// Lookup is case-insensitive (ARM types are), ignores a Terraform
    /// `data.` prefix, and falls back to [`ResourceKind::Unknown`].
    ///
    /// # Examples
    ///
    /// ```
    /// use infragram_core::catalog::ResourceKind;
    ///
    /// assert_eq!(ResourceKind::of("azurerm_subnet"), ResourceKind::Subnet);
    /// assert_eq!(
    ///     ResourceKind::of("Microsoft.Network/virtualNetworks"),
    ///     ResourceKind::VirtualNetwork
    /// );
    /// assert_eq!(ResourceKind::of("random_pet"), ResourceKind::Unknown);
    /// ```
    pub fn of(type_name: &str) -> Self {
        let lowered = type_name.to_ascii_lowercase();
        let key = lowered.strip_prefix("data.").unwrap_or(&lowered);
        KIND_BY_TYPE
            .get(key)
            .copied()
            .unwrap_or(ResourceKind::Unknown)
    }

    /// Networks and subnetworks seed the container tree.
    pub fn is_network_boundary(self) -> bool {
        matches!(self, ResourceKind::VirtualNetwork | ResourceKind::Subnet)
    }

    pub fn icon(self) -> IconCategory {
        match self {
            ResourceKind::VirtualNetwork => IconCategory::Network,
            ResourceKind::Subnet => IconCategory::Subnet,
            ResourceKind::NetworkInterface => IconCategory::NetworkInterface,
            ResourceKind::NetworkSecurityGroup => IconCategory::SecurityGroup,
            ResourceKind::PublicIp => IconCategory::PublicIp,
            ResourceKind::LoadBalancer => IconCategory::LoadBalancer,
            ResourceKind::ApplicationGateway => IconCategory::Gateway,
            ResourceKind::FrontDoor => IconCategory::Edge,
            ResourceKind::Firewall => IconCategory::Firewall,
            ResourceKind::RouteTable => IconCategory::Routing,
            ResourceKind::VirtualMachine => IconCategory::Compute,
            ResourceKind::ScaleSet => IconCategory::ScaleSet,
            ResourceKind::AvailabilitySet => IconCategory::AvailabilitySet,
            ResourceKind::AppService | ResourceKind::AppServicePlan => IconCategory::Web,
            ResourceKind::FunctionApp => IconCategory::Function,
            ResourceKind::SqlServer | ResourceKind::Database => IconCategory::Database,
            ResourceKind::StorageAccount => IconCategory::Storage,
            ResourceKind::KeyVault => IconCategory::Secrets,
            ResourceKind::Messaging => IconCategory::Messaging,
            ResourceKind::LogAnalytics | ResourceKind::AppInsights => IconCategory::Monitoring,
            ResourceKind::ResourceGroup => IconCategory::ResourceGroup,
            ResourceKind::Module => IconCategory::Module,
            ResourceKind::Unknown => IconCategory::Resource,
        }
    }

    /// Logical tier used when the entity has no subnet placement.
    pub fn tier(self) -> Tier {
        match self {
            ResourceKind::VirtualNetwork => Tier::Network,
            ResourceKind::Subnet => Tier::Subnet,
            ResourceKind::NetworkInterface | ResourceKind::PublicIp | ResourceKind::RouteTable => {
                Tier::Networking
            }
            ResourceKind::NetworkSecurityGroup | ResourceKind::Firewall | ResourceKind::KeyVault => {
                Tier::Security
            }
            ResourceKind::LoadBalancer | ResourceKind::ApplicationGateway => Tier::LoadBalancing,
            ResourceKind::FrontDoor | ResourceKind::AppService | ResourceKind::AppServicePlan => {
                Tier::Web
            }
            ResourceKind::VirtualMachine | ResourceKind::FunctionApp | ResourceKind::Messaging => {
                Tier::App
            }
            ResourceKind::ScaleSet | ResourceKind::AvailabilitySet => Tier::Availability,
            ResourceKind::SqlServer | ResourceKind::Database | ResourceKind::StorageAccount => {
                Tier::Data
            }
            ResourceKind::LogAnalytics | ResourceKind::AppInsights => Tier::Monitoring,
            ResourceKind::ResourceGroup | ResourceKind::Module | ResourceKind::Unknown => {
                Tier::Other
            }
        }
    }
}

/// Visual icon family a node is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconCategory {
    Network,
    Subnet,
    NetworkInterface,
    SecurityGroup,
    PublicIp,
    LoadBalancer,
    Gateway,
    Edge,
    Firewall,
    Routing,
    Compute,
    ScaleSet,
    AvailabilitySet,
    Web,
    Function,
    Database,
    Storage,
    Secrets,
    Messaging,
    Monitoring,
    ResourceGroup,
    Module,
    /// Generic fallback for unmapped types.
    Resource,
}

impl IconCategory {
    /// Stable lowercase name, also used as the icon file stem.
    pub fn name(self) -> &'static str {
        match self {
            IconCategory::Network => "network",
            IconCategory::Subnet => "subnet",
            IconCategory::NetworkInterface => "network-interface",
            IconCategory::SecurityGroup => "security-group",
            IconCategory::PublicIp => "public-ip",
            IconCategory::LoadBalancer => "load-balancer",
            IconCategory::Gateway => "gateway",
            IconCategory::Edge => "edge",
            IconCategory::Firewall => "firewall",
            IconCategory::Routing => "routing",
            IconCategory::Compute => "compute",
            IconCategory::ScaleSet => "scale-set",
            IconCategory::AvailabilitySet => "availability-set",
            IconCategory::Web => "web",
            IconCategory::Function => "function",
            IconCategory::Database => "database",
            IconCategory::Storage => "storage",
            IconCategory::Secrets => "secrets",
            IconCategory::Messaging => "messaging",
            IconCategory::Monitoring => "monitoring",
            IconCategory::ResourceGroup => "resource-group",
            IconCategory::Module => "module",
            IconCategory::Resource => "resource",
        }
    }
}

impl fmt::Display for IconCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Container classification that drives grouping and cluster styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// Outermost network boundary (virtual network / VPC).
    Network,
    /// Subnetwork with no recognizable role.
    Subnet,
    Web,
    App,
    Data,
    LoadBalancing,
    Availability,
    Security,
    Networking,
    Monitoring,
    /// Fallback for unrecognized resource types.
    Other,
}

impl Tier {
    /// Title of the container grouping entities of this tier.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Network => "Network",
            Tier::Subnet => "Subnet",
            Tier::Web => "Web Tier",
            Tier::App => "App Tier",
            Tier::Data => "Data Tier",
            Tier::LoadBalancing => "Load Balancing",
            Tier::Availability => "Availability",
            Tier::Security => "Security",
            Tier::Networking => "Networking",
            Tier::Monitoring => "Monitoring",
            Tier::Other => "Other Resources",
        }
    }

    /// Default cluster fill for this tier.
    pub fn default_fill(self) -> &'static str {
        match self {
            Tier::Network => "#E8F4F8",
            Tier::Web => "#E3F2FD",
            Tier::App => "#EDE7F6",
            Tier::Data => "#FFF3E0",
            Tier::LoadBalancing => "#F3E5F5",
            Tier::Availability | Tier::Monitoring => "#E8F5E9",
            Tier::Security => "#FFEBEE",
            Tier::Networking => "#E1F5FE",
            Tier::Subnet | Tier::Other => "#F5F5F5",
        }
    }

    /// Guesses the role of a subnetwork from its name.
    ///
    /// # Examples
    ///
    /// ```
    /// use infragram_core::catalog::Tier;
    ///
    /// assert_eq!(Tier::for_subnet_name("snet-frontend"), Tier::Web);
    /// assert_eq!(Tier::for_subnet_name("DBSubnetName"), Tier::Data);
    /// assert_eq!(Tier::for_subnet_name("FESubnetName"), Tier::Web);
    /// assert_eq!(Tier::for_subnet_name("default"), Tier::Subnet);
    /// ```
    pub fn for_subnet_name(name: &str) -> Self {
        const HINTS: &[(&str, Tier)] = &[
            ("firewall", Tier::Security),
            ("security", Tier::Security),
            ("front", Tier::Web),
            ("web", Tier::Web),
            ("public", Tier::Web),
            ("data", Tier::Data),
            ("db", Tier::Data),
            ("sql", Tier::Data),
            ("back", Tier::App),
            ("app", Tier::App),
            ("api", Tier::App),
            ("private", Tier::App),
        ];

        // Abbreviated roles, only recognized as a leading word.
        const PREFIXES: &[(&str, Tier)] = &[("fe", Tier::Web), ("be", Tier::App)];

        let lowered = name.to_ascii_lowercase();
        HINTS
            .iter()
            .find(|(hint, _)| lowered.contains(hint))
            .or_else(|| {
                PREFIXES
                    .iter()
                    .find(|(prefix, _)| starts_with_word(name, prefix))
            })
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::Subnet)
    }
}

/// `name` begins with the word `prefix`: `FESubnet`, `fe-subnet`, `be_01`.
fn starts_with_word(name: &str, prefix: &str) -> bool {
    let Some(head) = name.get(..prefix.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(prefix) {
        return false;
    }
    match name[prefix.len()..].chars().next() {
        None | Some('-' | '_' | ' ' | '.') => true,
        Some(next) => {
            head.chars().all(|c| c.is_ascii_uppercase()) && next.is_ascii_uppercase()
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_lookup_is_case_insensitive() {
        assert_eq!(
            ResourceKind::of("microsoft.network/VIRTUALNETWORKS"),
            ResourceKind::VirtualNetwork
        );
    }

    #[test]
    fn test_kind_lookup_strips_data_prefix() {
        assert_eq!(
            ResourceKind::of("data.azurerm_subnet"),
            ResourceKind::Subnet
        );
    }

    #[test]
    fn test_unknown_kind_gets_generic_icon_and_other_tier() {
        let kind = ResourceKind::of("null_resource");
        assert_eq!(kind, ResourceKind::Unknown);
        assert_eq!(kind.icon(), IconCategory::Resource);
        assert_eq!(kind.tier(), Tier::Other);
        assert_eq!(kind.tier().label(), "Other Resources");
    }

    #[test]
    fn test_boundary_kinds() {
        assert!(ResourceKind::of("aws_vpc").is_network_boundary());
        assert!(ResourceKind::of("google_compute_subnetwork").is_network_boundary());
        assert!(!ResourceKind::of("azurerm_network_interface").is_network_boundary());
    }

    #[test]
    fn test_static_tiers() {
        assert_eq!(ResourceKind::of("azurerm_log_analytics_workspace").tier(), Tier::Monitoring);
        assert_eq!(ResourceKind::of("azurerm_mssql_database").tier(), Tier::Data);
        assert_eq!(ResourceKind::of("azurerm_lb").tier(), Tier::LoadBalancing);
        assert_eq!(ResourceKind::of("azurerm_availability_set").tier(), Tier::Availability);
    }

    #[test]
    fn test_every_table_entry_resolves() {
        for (type_name, kind) in TYPE_TABLE {
            assert_eq!(ResourceKind::of(type_name), *kind, "{type_name}");
        }
    }

    #[test]
    fn test_subnet_name_hints() {
        assert_eq!(Tier::for_subnet_name("FESubnetName"), Tier::Web);
        assert_eq!(Tier::for_subnet_name("BESubnetName"), Tier::App);
        assert_eq!(Tier::for_subnet_name("fe-subnet"), Tier::Web);
        assert_eq!(Tier::for_subnet_name("feature-subnet"), Tier::Subnet);
        assert_eq!(Tier::for_subnet_name("Berlin"), Tier::Subnet);
        assert_eq!(Tier::for_subnet_name("snet-backend"), Tier::App);
        assert_eq!(Tier::for_subnet_name("AzureFirewallSubnet"), Tier::Security);
        assert_eq!(Tier::for_subnet_name("snet-data"), Tier::Data);
    }

    #[test]
    fn test_tier_deserializes_kebab_case() {
        use serde::de::{IntoDeserializer, value::Error};

        let tier = Tier::deserialize(IntoDeserializer::<Error>::into_deserializer(
            "load-balancing",
        ));
        assert_eq!(tier, Ok(Tier::LoadBalancing));
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    use proptest::prelude::*;

    fn table_entry() -> impl Strategy<Value = (&'static str, ResourceKind)> {
        proptest::sample::select(TYPE_TABLE)
    }

    /// Flip the case of characters picked by `mask`.
    fn recase(type_name: &str, mask: &[bool]) -> String {
        type_name
            .chars()
            .zip(mask.iter().cycle())
            .map(|(c, &upper)| {
                if upper {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }

    fn check_lookup_ignores_case(
        entry: (&'static str, ResourceKind),
        mask: &[bool],
    ) -> Result<(), TestCaseError> {
        let (type_name, kind) = entry;
        prop_assert_eq!(ResourceKind::of(&recase(type_name, mask)), kind);
        Ok(())
    }

    fn check_data_prefix_is_transparent(
        entry: (&'static str, ResourceKind),
    ) -> Result<(), TestCaseError> {
        let (type_name, kind) = entry;
        prop_assert_eq!(ResourceKind::of(&format!("data.{type_name}")), kind);
        Ok(())
    }

    fn check_unlisted_types_are_unknown(suffix: &str) -> Result<(), TestCaseError> {
        let type_name = format!("zz_unlisted_{suffix}");
        let kind = ResourceKind::of(&type_name);
        prop_assert_eq!(kind, ResourceKind::Unknown);
        prop_assert_eq!(kind.tier(), Tier::Other);
        Ok(())
    }

    proptest! {
        #[test]
        fn lookup_ignores_case(
            entry in table_entry(),
            mask in proptest::collection::vec(any::<bool>(), 1..8),
        ) {
            check_lookup_ignores_case(entry, &mask)?;
        }

        #[test]
        fn data_prefix_is_transparent(entry in table_entry()) {
            check_data_prefix_is_transparent(entry)?;
        }

        #[test]
        fn unlisted_types_are_unknown(suffix in "[a-z_]{0,12}") {
            check_unlisted_types_are_unknown(&suffix)?;
        }
    }
}
