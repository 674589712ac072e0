//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use infragram::{InfragramError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for InfragramError {
    fn from(err: ConfigError) -> Self {
        InfragramError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (infragram/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, InfragramError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("infragram/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "infragram", "infragram") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, InfragramError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    use infragram::{
        catalog::Tier,
        config::{Direction, ImageFormat},
    };
    use infragram_parser::DuplicatePolicy;

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
[layout]
direction = "LR"
node_spacing = 1.0
rank_spacing = 1.5
formats = ["png", "svg"]

[style]
background_color = "white"
title = "Cust1 IIS + SQL"

[style.palette]
web = "#BBDEFB"

[extract]
duplicates = "error"

[converter]
enabled = false
"##,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.layout().direction(), Direction::LeftToRight);
        assert_eq!(config.layout().rank_spacing(), 1.5);
        assert_eq!(
            config.layout().formats(),
            [ImageFormat::Png, ImageFormat::Svg]
        );
        assert_eq!(config.style().title(), Some("Cust1 IIS + SQL"));
        assert_eq!(
            config.style().fill(Tier::Web).unwrap().to_hex_string(),
            "#bbdefb"
        );
        assert_eq!(config.extract().duplicates(), DuplicatePolicy::Error);
        assert!(!config.converter().enabled());
        assert_eq!(config.converter().program(), "graphviz2drawio");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\nsplines = \"spline\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.layout().splines(), "spline");
        assert_eq!(config.layout().direction(), Direction::TopToBottom);
        assert_eq!(config.layout().formats(), [ImageFormat::Png]);
        assert!(config.converter().enabled());
    }

    #[test]
    fn test_empty_formats_still_render_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\nformats = []\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.layout().formats(), [ImageFormat::Png]);
    }

    #[test]
    fn test_missing_explicit_config() {
        let result = load_config(Some("definitely/not/here.toml"));
        assert!(matches!(result, Err(InfragramError::Config(msg)) if msg.contains("Missing")));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout\ndirection = ").unwrap();

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(InfragramError::Config(msg)) if msg.contains("TOML")));
    }
}
