//! CLI logic for the Infragram diagram tool.
//!
//! This module reads the declaration files named on the command line, applies
//! command-line overrides on top of the loaded configuration, and drives the
//! [`DiagramBuilder`] pipeline.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{info, warn};

use infragram::{DiagramBuilder, InfragramError, RenderReport, Source, config::AppConfig};

/// Extensions stripped from `--output` so `diagram.png` and `diagram` name
/// the same outputs.
const OUTPUT_EXTENSIONS: [&str; 7] = ["png", "svg", "pdf", "jpg", "jpeg", "dot", "drawio"];

/// Run the Infragram CLI application
///
/// This function processes the input files through the Infragram pipeline
/// and writes the rendered images, the laid-out graph, and the editable
/// document next to the output base name.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `InfragramError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Duplicate declarations when configured as errors
/// - A missing Graphviz installation
/// - Rendering errors
pub fn run(args: &Args) -> Result<RenderReport, InfragramError> {
    info!(
        inputs:? = args.input,
        output_base = args.output;
        "Processing diagram"
    );

    // Load configuration
    let app_config = apply_overrides(config::load_config(args.config.as_ref())?, args);

    // Read input files
    let sources = read_sources(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let inventory = builder.extract(&sources)?;
    for reportable in error_adapter::warning_reportables(inventory.warnings(), &sources) {
        warn!("{}", error_adapter::render(&reportable));
    }
    info!(
        entities = inventory.len(),
        references = inventory.references().len();
        "Extraction complete"
    );

    let model = builder.build_model(inventory)?;
    let report = builder.render(&model, output_base(&args.output))?;

    for warning in report.warnings() {
        warn!("{warning}");
    }
    for image in report.images() {
        info!(path:? = image; "Image written");
    }
    if let Some(editable) = report.editable() {
        info!(path:? = editable; "Editable document written");
    }

    Ok(report)
}

/// Layer command-line overrides on top of the loaded configuration.
fn apply_overrides(config: AppConfig, args: &Args) -> AppConfig {
    let mut layout = config.layout().clone().with_formats(args.format.clone());
    if let Some(direction) = args.direction {
        layout = layout.with_direction(direction);
    }

    let mut style = config.style().clone();
    if let Some(title) = &args.title {
        style = style.with_title(title.as_str());
    }

    let converter = config
        .converter()
        .clone()
        .with_enabled(config.converter().enabled() && !args.no_convert);

    config
        .with_layout(layout)
        .with_style(style)
        .with_converter(converter)
}

fn read_sources(paths: &[String]) -> Result<Vec<Source>, InfragramError> {
    paths
        .iter()
        .map(|path| -> Result<Source, InfragramError> {
            let text = fs::read_to_string(path)
                .map_err(|err| io::Error::new(err.kind(), format!("{path}: {err}")))?;
            Ok(Source::new(path.as_str(), text))
        })
        .collect()
}

/// The output base name with any known output extension removed.
fn output_base(output: &str) -> PathBuf {
    let path = Path::new(output);
    let known = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| OUTPUT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
    if known {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use infragram::config::{Direction, ImageFormat};

    use super::*;

    fn args(extra: &[&str]) -> Args {
        use clap::Parser;
        let mut argv = vec!["infragram", "main.tf"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_output_base_strips_known_extensions() {
        assert_eq!(output_base("out/diagram.png"), PathBuf::from("out/diagram"));
        assert_eq!(output_base("contoso.DRAWIO"), PathBuf::from("contoso"));
        assert_eq!(output_base("contoso.v2"), PathBuf::from("contoso.v2"));
        assert_eq!(output_base("diagram"), PathBuf::from("diagram"));
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let config = apply_overrides(
            AppConfig::default(),
            &args(&["--title", "Contoso", "--direction", "rl", "-f", "svg", "--no-convert"]),
        );

        assert_eq!(config.style().title(), Some("Contoso"));
        assert_eq!(config.layout().direction(), Direction::RightToLeft);
        assert_eq!(config.layout().formats(), [ImageFormat::Svg]);
        assert!(!config.converter().enabled());
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let config = apply_overrides(AppConfig::default(), &args(&[]));

        assert_eq!(config.style().title(), None);
        assert_eq!(config.layout().direction(), Direction::TopToBottom);
        assert_eq!(config.layout().formats(), [ImageFormat::Png]);
        assert!(config.converter().enabled());
    }

    #[test]
    fn test_empty_config_formats_without_override() {
        let config = AppConfig::default().with_layout(
            infragram::config::LayoutConfig::default().with_formats(Vec::new()),
        );
        let config = apply_overrides(config, &args(&[]));
        assert!(!config.layout().formats().is_empty());
    }

    #[test]
    fn test_missing_input_names_the_file() {
        let err = read_sources(&["no/such/file.tf".to_string()]).unwrap_err();
        assert!(matches!(&err, InfragramError::Io(_)));
        assert!(err.to_string().contains("no/such/file.tf"));
    }
}
