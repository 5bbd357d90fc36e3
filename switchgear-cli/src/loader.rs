//! Breaker configuration loading

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use switchgear_breaker::BreakerConfig;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => bail!(
                "Unsupported config format for {} (expected .yaml, .yml, .toml or .json)",
                path.display()
            ),
        }
    }
}

/// Load a breaker configuration from a file
///
/// When `validate` is set the limits and store requirements are checked too.
pub fn load_config(path: impl AsRef<Path>, validate: bool) -> Result<BreakerConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = load_from_str(&content, ConfigFormat::from_path(path)?)?;

    if validate {
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    }

    Ok(config)
}

/// Parse a breaker configuration in the given format
pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<BreakerConfig> {
    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML")?,
        ConfigFormat::Toml => toml::from_str(content).context("Failed to parse TOML")?,
        ConfigFormat::Json => serde_json::from_str(content).context("Failed to parse JSON")?,
    };
    Ok(config)
}
