//! End-to-end pipeline scenarios with substituted render and convert
//! backends.

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use graphviz_rust::dot_structures::Graph;

use infragram::{
    DiagramBuilder, InfragramError, Source,
    config::{AppConfig, ConverterConfig, ImageFormat, LayoutConfig},
    export::{Error, FormatConverter, RenderBackend, RenderedFiles},
    semantic::EntityId,
};

const THREE_TIER: &str = r#"
resource "azurerm_virtual_network" "vnet" {
  name          = "vnet-contoso-auea-001"
  address_space = ["10.10.0.0/16"]
}

resource "azurerm_subnet" "frontend" {
  name                 = "snet-frontend"
  virtual_network_name = azurerm_virtual_network.vnet.name
  address_prefixes     = ["10.10.1.0/24"]
}

resource "azurerm_subnet" "data" {
  name                 = "snet-data"
  virtual_network_name = azurerm_virtual_network.vnet.name
  address_prefixes     = ["10.10.3.0/24"]
}

resource "azurerm_network_interface" "web" {
  name = "nic-web"
  ip_configuration {
    name      = "internal"
    subnet_id = azurerm_subnet.frontend.id
  }
}

resource "azurerm_linux_virtual_machine" "web" {
  name                  = "vm-web"
  network_interface_ids = [azurerm_network_interface.web.id]
}

resource "azurerm_private_endpoint" "sql" {
  subnet_id = azurerm_subnet.data.id
}

resource "azurerm_mssql_server" "sql" {
  name = "sqlsrv-contoso"
}

resource "azurerm_log_analytics_workspace" "law" {
  name = "law-contoso-prod"
}

resource "random_pet" "suffix" {}
"#;

/// Renderer that writes placeholder files and records what it was asked.
#[derive(Clone, Default)]
struct FakeRenderer {
    calls: Rc<RefCell<Vec<(PathBuf, Vec<ImageFormat>)>>>,
}

impl RenderBackend for FakeRenderer {
    fn render(
        &self,
        _graph: &Graph,
        base: &Path,
        formats: &[ImageFormat],
    ) -> Result<RenderedFiles, Error> {
        self.calls
            .borrow_mut()
            .push((base.to_path_buf(), formats.to_vec()));

        let images: Vec<PathBuf> = formats
            .iter()
            .map(|f| with_extension(base, f.extension()))
            .collect();
        for image in &images {
            fs::write(image, b"image")?;
        }
        let layout = with_extension(base, "dot");
        fs::write(&layout, b"digraph {}")?;
        Ok(RenderedFiles { images, layout })
    }
}

/// Renderer standing in for a machine without Graphviz.
struct MissingRenderer;

impl RenderBackend for MissingRenderer {
    fn render(&self, _: &Graph, _: &Path, _: &[ImageFormat]) -> Result<RenderedFiles, Error> {
        Err(Error::Unavailable {
            program: "dot".to_string(),
            hint: "install Graphviz".to_string(),
        })
    }
}

struct CopyConverter;

impl FormatConverter for CopyConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), Error> {
        fs::copy(input, output)?;
        Ok(())
    }
}

struct FailingConverter;

impl FormatConverter for FailingConverter {
    fn convert(&self, _: &Path, _: &Path) -> Result<(), Error> {
        Err(Error::Failed("exit status: 1".to_string()))
    }
}

fn with_extension(base: &Path, extension: &str) -> PathBuf {
    PathBuf::from(format!("{}.{extension}", base.display()))
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_three_tier_grouping() {
    let builder = DiagramBuilder::default();
    let inventory = builder
        .extract(&[Source::new("main.tf", THREE_TIER)])
        .unwrap();
    let model = builder.build_model(inventory).unwrap();
    let grouping = model.grouping();

    let label_of = |kind: &str, name: &str| {
        let id = grouping.container_of(EntityId::new(kind, name)).unwrap();
        grouping.container(id).unwrap().label().to_string()
    };

    assert_eq!(
        label_of("azurerm_linux_virtual_machine", "web"),
        "snet-frontend\n(10.10.1.0/24)"
    );
    assert_eq!(
        label_of("azurerm_private_endpoint", "sql"),
        "snet-data\n(10.10.3.0/24)"
    );
    assert_eq!(label_of("azurerm_mssql_server", "sql"), "Data Tier");
    assert_eq!(label_of("azurerm_log_analytics_workspace", "law"), "Monitoring");
    assert_eq!(label_of("random_pet", "suffix"), "Other Resources");

    let subnets: Vec<&str> = grouping
        .containers()
        .filter(|c| c.parent().is_some_and(|p| grouping.container(p).unwrap().anchor().is_some()))
        .map(|c| c.label())
        .collect();
    assert_eq!(
        subnets,
        ["snet-frontend\n(10.10.1.0/24)", "snet-data\n(10.10.3.0/24)"]
    );
}

#[test]
fn test_identical_input_gives_identical_output() {
    let builder = DiagramBuilder::default();
    let build = || {
        let inventory = builder
            .extract(&[Source::new("main.tf", THREE_TIER)])
            .unwrap();
        builder.build_model(inventory).unwrap()
    };

    let first = build();
    let second = build();
    assert_eq!(first.nodes(), second.nodes());
    assert_eq!(first.edges(), second.edges());
    assert_eq!(builder.dot_source(&first), builder.dot_source(&second));
}

#[test]
fn test_render_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("contoso");
    let renderer = FakeRenderer::default();
    let layout = LayoutConfig::default().with_formats(vec![ImageFormat::Png, ImageFormat::Svg]);

    let builder = DiagramBuilder::new(AppConfig::default().with_layout(layout))
        .with_renderer(renderer.clone())
        .with_converter(CopyConverter);
    let inventory = builder
        .extract(&[Source::new("main.tf", THREE_TIER)])
        .unwrap();
    let model = builder.build_model(inventory).unwrap();
    let report = builder.render(&model, &base).unwrap();

    assert_eq!(
        renderer.calls.borrow().as_slice(),
        [(base.clone(), vec![ImageFormat::Png, ImageFormat::Svg])]
    );
    assert_eq!(report.images().len(), 2);
    assert_eq!(report.layout(), with_extension(&base, "dot"));
    assert_eq!(report.editable(), Some(with_extension(&base, "drawio").as_path()));
    assert!(report.warnings().is_empty());
    assert_eq!(
        dir_entries(dir.path()),
        ["contoso.dot", "contoso.drawio", "contoso.png", "contoso.svg"]
    );
}

#[test]
fn test_missing_renderer_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("out").join("diagram");

    let builder = DiagramBuilder::default()
        .with_renderer(MissingRenderer)
        .with_converter(CopyConverter);
    let inventory = builder
        .extract(&[Source::new("main.tf", THREE_TIER)])
        .unwrap();
    let model = builder.build_model(inventory).unwrap();

    match builder.render(&model, &base) {
        Err(InfragramError::EnvironmentNotReady { capability, hint }) => {
            assert_eq!(capability, "dot");
            assert!(!hint.is_empty());
        }
        other => panic!("Expected EnvironmentNotReady, got {other:?}"),
    }
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn test_failed_conversion_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("diagram");

    let builder = DiagramBuilder::default()
        .with_renderer(FakeRenderer::default())
        .with_converter(FailingConverter);
    let inventory = builder
        .extract(&[Source::new("main.tf", THREE_TIER)])
        .unwrap();
    let model = builder.build_model(inventory).unwrap();
    let report = builder.render(&model, &base).unwrap();

    assert_eq!(report.editable(), None);
    assert_eq!(report.warnings().len(), 1);
    assert!(report.warnings()[0].contains("drawio"));
    assert_eq!(dir_entries(dir.path()), ["diagram.dot", "diagram.png"]);
}

#[test]
fn test_disabled_conversion_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("diagram");
    let config =
        AppConfig::default().with_converter(ConverterConfig::default().with_enabled(false));

    let builder = DiagramBuilder::new(config)
        .with_renderer(FakeRenderer::default())
        .with_converter(FailingConverter);
    let inventory = builder
        .extract(&[Source::new("main.tf", THREE_TIER)])
        .unwrap();
    let model = builder.build_model(inventory).unwrap();
    let report = builder.render(&model, &base).unwrap();

    assert_eq!(report.editable(), None);
    assert!(report.warnings().is_empty());
}
