//! Infragram - turn Terraform and Bicep infrastructure descriptions into
//! tiered architecture diagrams.
//!
//! Declared resources are extracted, grouped into network, subnet, and tier
//! containers, and handed to Graphviz for layout and rendering. The laid-out
//! graph is finally converted into an editable draw.io document.

pub mod config;
pub mod export;
pub mod model;
pub mod structure;

mod error;

pub use infragram_core::{catalog, color, identifier, semantic};
pub use infragram_parser::{Inventory, Source};

pub use error::InfragramError;

use std::path::{Path, PathBuf};

use log::{debug, info, trace, warn};

use config::AppConfig;
use export::{ExternalConverter, FormatConverter, GraphvizRenderer, RenderBackend};
use model::DiagramModel;

/// Files written by [`DiagramBuilder::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    images: Vec<PathBuf>,
    layout: PathBuf,
    editable: Option<PathBuf>,
    warnings: Vec<String>,
}

impl RenderReport {
    /// Rendered images, one per configured format.
    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    /// The laid-out graph description.
    pub fn layout(&self) -> &Path {
        &self.layout
    }

    /// The editable document, when conversion ran and succeeded.
    pub fn editable(&self) -> Option<&Path> {
        self.editable.as_deref()
    }

    /// Non-fatal problems, such as a failed conversion.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Builder for extracting and rendering Infragram diagrams.
///
/// This provides an API for processing declaration files through
/// extraction, modelling, and rendering stages.
///
/// # Examples
///
/// ```rust,no_run
/// use infragram::{DiagramBuilder, Source, config::AppConfig};
///
/// let source = Source::new("main.tf", r#"resource "azurerm_virtual_network" "vnet" {}"#);
///
/// let builder = DiagramBuilder::new(AppConfig::default());
///
/// // Extract entities and references
/// let inventory = builder.extract(&[source])
///     .expect("Failed to extract");
///
/// // Group and style them
/// let model = builder.build_model(inventory)
///     .expect("Failed to build model");
///
/// // Render diagram.png, diagram.dot, and diagram.drawio
/// let report = builder.render(&model, "diagram")
///     .expect("Failed to render");
/// ```
pub struct DiagramBuilder {
    config: AppConfig,
    renderer: Box<dyn RenderBackend>,
    converter: Box<dyn FormatConverter>,
}

impl Default for DiagramBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl DiagramBuilder {
    /// Create a new diagram builder using Graphviz and the configured
    /// converter program.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use infragram::{DiagramBuilder, config::AppConfig};
    ///
    /// let config = AppConfig::default();
    /// let builder = DiagramBuilder::new(config);
    /// ```
    pub fn new(config: AppConfig) -> Self {
        let converter = ExternalConverter::new(config.converter().program());
        Self {
            config,
            renderer: Box::new(GraphvizRenderer::new()),
            converter: Box::new(converter),
        }
    }

    /// Replace the render backend.
    pub fn with_renderer(mut self, renderer: impl RenderBackend + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace the format converter.
    pub fn with_converter(mut self, converter: impl FormatConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Extract entities and references from declaration sources.
    ///
    /// # Errors
    ///
    /// Returns [`InfragramError::Parse`] only when duplicate declarations
    /// are configured as errors; unreadable declarations are skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use infragram::{DiagramBuilder, Source};
    ///
    /// let builder = DiagramBuilder::default();
    /// let inventory = builder
    ///     .extract(&[Source::new("main.tf", r#"resource "aws_vpc" "main" {}"#)])
    ///     .expect("Failed to extract");
    /// assert_eq!(inventory.len(), 1);
    /// ```
    pub fn extract(&self, sources: &[Source]) -> Result<Inventory, InfragramError> {
        info!(sources = sources.len(); "Extracting entities");

        let inventory = infragram_parser::extract(sources, self.config.extract())
            .map_err(|err| InfragramError::new_parse_error(err, sources))?;

        for warning in inventory.warnings() {
            debug!(warning:% = warning; "Extraction warning");
        }
        trace!(inventory:?; "Extracted inventory");

        Ok(inventory)
    }

    /// Group the inventory and resolve nodes, edges, and cluster styles.
    ///
    /// # Errors
    ///
    /// Returns [`InfragramError::Config`] when a configured color is invalid.
    pub fn build_model(&self, inventory: Inventory) -> Result<DiagramModel, InfragramError> {
        DiagramModel::build(inventory, self.config.style())
    }

    /// The DOT source that [`render`](Self::render) hands to the renderer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use infragram::{DiagramBuilder, Source};
    ///
    /// let builder = DiagramBuilder::default();
    /// let inventory = builder
    ///     .extract(&[Source::new("main.tf", r#"resource "aws_vpc" "main" {}"#)])
    ///     .unwrap();
    /// let model = builder.build_model(inventory).unwrap();
    ///
    /// let dot = builder.dot_source(&model);
    /// assert!(dot.contains("subgraph cluster_1"));
    /// ```
    pub fn dot_source(&self, model: &DiagramModel) -> String {
        export::dot::to_source(&export::dot::to_graph(model, self.config.layout()))
    }

    /// Render `model` to `<base>.<format>` for every configured format and
    /// `<base>.dot`, then convert to the editable format if enabled.
    ///
    /// # Errors
    ///
    /// Returns [`InfragramError::EnvironmentNotReady`] when the renderer is
    /// missing; nothing is written in that case. Conversion failures are not
    /// errors; they are reported through [`RenderReport::warnings`].
    pub fn render(
        &self,
        model: &DiagramModel,
        base: impl AsRef<Path>,
    ) -> Result<RenderReport, InfragramError> {
        let base = base.as_ref();
        let graph = export::dot::to_graph(model, self.config.layout());
        let formats = self.config.layout().formats();

        info!(base:? = base, formats = formats.len(); "Rendering diagram");
        let rendered = self.renderer.render(&graph, base, &formats)?;

        let mut warnings = Vec::new();
        let converter = self.config.converter();
        let editable = if converter.enabled() {
            let output = export::output_path(base, converter.extension());
            match self.converter.convert(&rendered.layout, &output) {
                Ok(()) => {
                    info!(output:? = output; "Editable document written");
                    Some(output)
                }
                Err(err) => {
                    warn!(err:% = err; "Conversion failed; keeping rendered outputs");
                    warnings.push(format!("conversion to `{}` skipped: {err}", converter.extension()));
                    None
                }
            }
        } else {
            debug!("Conversion disabled");
            None
        };

        Ok(RenderReport {
            images: rendered.images,
            layout: rendered.layout,
            editable,
            warnings,
        })
    }
}
