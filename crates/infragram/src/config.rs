//! Configuration types for Infragram diagram rendering.
//!
//! This module provides configuration structures that control extraction,
//! Graphviz layout, cluster styling, and the editable-format conversion step.
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`LayoutConfig`] - Graph direction, spacing, and requested raster formats.
//! - [`StyleConfig`] - Background color, title, and tier palette overrides.
//! - [`ConverterConfig`] - The external program producing the editable document.
//!
//! # Example
//!
//! ```
//! # use infragram::config::{AppConfig, Direction};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().direction(), Direction::TopToBottom);
//! assert!(config.style().background_color().is_ok());
//! ```

use std::{collections::HashMap, fmt, str::FromStr};

use serde::Deserialize;

use infragram_core::{catalog::Tier, color::Color};
use infragram_parser::ExtractConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Extraction configuration section.
    #[serde(default)]
    extract: ExtractConfig,

    /// Format converter configuration section.
    #[serde(default)]
    converter: ConverterConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the given layout and style and default
    /// extraction and converter settings.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self {
            layout,
            style,
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    pub fn with_extract(mut self, extract: ExtractConfig) -> Self {
        self.extract = extract;
        self
    }

    pub fn with_converter(mut self, converter: ConverterConfig) -> Self {
        self.converter = converter;
        self
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the extraction configuration.
    pub fn extract(&self) -> &ExtractConfig {
        &self.extract
    }

    /// Returns the converter configuration.
    pub fn converter(&self) -> &ConverterConfig {
        &self.converter
    }
}

/// Direction in which Graphviz ranks the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB")]
    TopToBottom,
    #[serde(rename = "LR")]
    LeftToRight,
    #[serde(rename = "BT")]
    BottomToTop,
    #[serde(rename = "RL")]
    RightToLeft,
}

impl Direction {
    /// The Graphviz `rankdir` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::TopToBottom => "TB",
            Direction::LeftToRight => "LR",
            Direction::BottomToTop => "BT",
            Direction::RightToLeft => "RL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" => Ok(Direction::TopToBottom),
            "LR" => Ok(Direction::LeftToRight),
            "BT" => Ok(Direction::BottomToTop),
            "RL" => Ok(Direction::RightToLeft),
            _ => Err(format!("unknown direction `{s}` (expected TB, LR, BT, or RL)")),
        }
    }
}

/// Raster or vector image format produced by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
    Pdf,
    Jpg,
}

impl ImageFormat {
    /// File extension of the output, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
            ImageFormat::Pdf => "pdf",
            ImageFormat::Jpg => "jpg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            "pdf" => Ok(ImageFormat::Pdf),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            _ => Err(format!("unknown format `{s}` (expected png, svg, pdf, or jpg)")),
        }
    }
}

/// Graph-level layout settings handed to Graphviz.
///
/// Spacing and padding are in inches, font size in points, as Graphviz
/// expects them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    direction: Direction,
    node_spacing: f32,
    rank_spacing: f32,
    font_size: f32,
    splines: String,
    pad: f32,
    formats: Vec<ImageFormat>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            node_spacing: 0.8,
            rank_spacing: 1.2,
            font_size: 14.0,
            splines: "ortho".to_string(),
            pad: 0.5,
            formats: vec![ImageFormat::Png],
        }
    }
}

impl LayoutConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Replaces the requested image formats. An empty list keeps the current ones.
    pub fn with_formats(mut self, formats: Vec<ImageFormat>) -> Self {
        if !formats.is_empty() {
            self.formats = formats;
        }
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn rank_spacing(&self) -> f32 {
        self.rank_spacing
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Graphviz `splines` mode (`ortho`, `spline`, `polyline`, ...).
    pub fn splines(&self) -> &str {
        &self.splines
    }

    pub fn pad(&self) -> f32 {
        self.pad
    }

    /// Requested image formats, deduplicated, in configuration order.
    ///
    /// Never empty: a configured empty list falls back to PNG.
    pub fn formats(&self) -> Vec<ImageFormat> {
        let mut formats: Vec<ImageFormat> = Vec::with_capacity(self.formats.len().max(1));
        for format in &self.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }
        if formats.is_empty() {
            formats.push(ImageFormat::Png);
        }
        formats
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Colors are kept as strings until they are resolved, so that an invalid
/// color is reported when a diagram is built rather than when the file is
/// loaded.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Diagram background color. Defaults to white.
    #[serde(default)]
    background_color: Option<String>,

    /// Title drawn at the top of the diagram.
    #[serde(default)]
    title: Option<String>,

    /// Cluster fill overrides, keyed by tier.
    #[serde(default)]
    palette: HashMap<Tier, String>,
}

impl StyleConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Overrides the cluster fill for `tier`.
    pub fn with_fill(mut self, tier: Tier, color: impl Into<String>) -> Self {
        self.palette.insert(tier, color.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the parsed background [`Color`], white when none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Color, String> {
        match &self.background_color {
            Some(color) => {
                Color::new(color).map_err(|err| format!("Invalid background color in config: {err}"))
            }
            None => Ok(Color::default()),
        }
    }

    /// Returns the cluster fill for `tier`: the configured override, or the
    /// tier's default.
    ///
    /// # Errors
    ///
    /// Returns an error if the override cannot be parsed.
    pub fn fill(&self, tier: Tier) -> Result<Color, String> {
        let color = self
            .palette
            .get(&tier)
            .map_or(tier.default_fill(), String::as_str);
        Color::new(color).map_err(|err| format!("Invalid palette color for `{tier}`: {err}"))
    }
}

/// Settings for the external program that turns the laid-out graph into an
/// editable document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    enabled: bool,
    program: String,
    extension: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "graphviz2drawio".to_string(),
            extension: "drawio".to_string(),
        }
    }
}

impl ConverterConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Executable invoked as `<program> <input.dot> -o <output>`.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Extension of the editable document, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}
