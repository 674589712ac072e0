//! Command-line argument definitions for the Infragram CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input files, the output base name,
//! the configuration file, a few configuration overrides, and logging
//! verbosity.

use clap::Parser;

use infragram::config::{Direction, ImageFormat};

/// Command-line arguments for the Infragram diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Terraform (.tf) or Bicep (.bicep) files to diagram
    #[arg(required = true, help = "Paths to the input files")]
    pub input: Vec<String>,

    /// Output base name; extensions are appended per format
    #[arg(short, long, default_value = "diagram")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Title drawn at the top of the diagram
    #[arg(long)]
    pub title: Option<String>,

    /// Rank direction (TB, LR, BT, RL)
    #[arg(long)]
    pub direction: Option<Direction>,

    /// Image formats to render (png, svg, pdf, jpg); repeatable or comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub format: Vec<ImageFormat>,

    /// Skip conversion to the editable draw.io format
    #[arg(long)]
    pub no_convert: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = Args::try_parse_from(["infragram", "main.tf"]).unwrap();
        assert_eq!(args.input, ["main.tf"]);
        assert_eq!(args.output, "diagram");
        assert!(args.format.is_empty());
        assert!(!args.no_convert);
    }

    #[test]
    fn test_parse_overrides() {
        let args = Args::try_parse_from([
            "infragram",
            "network.tf",
            "compute.bicep",
            "-o",
            "out/contoso",
            "--direction",
            "LR",
            "--format",
            "png,svg",
            "-f",
            "pdf",
            "--no-convert",
        ])
        .unwrap();
        assert_eq!(args.input.len(), 2);
        assert_eq!(args.direction, Some(Direction::LeftToRight));
        assert_eq!(
            args.format,
            [ImageFormat::Png, ImageFormat::Svg, ImageFormat::Pdf]
        );
        assert!(args.no_convert);
    }

    #[test]
    fn test_input_is_required() {
        assert!(Args::try_parse_from(["infragram"]).is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Args::try_parse_from(["infragram", "main.tf", "--format", "gif"]).is_err());
    }
}
