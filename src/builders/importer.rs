use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::core::config::BuildConfig;

/// Serialization formats a manifest can be imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
    Toml,
}

impl ManifestFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .with_context(|| format!("Cannot infer manifest format of {}", path.display()))?;
        extension.parse()
    }
}

impl FromStr for ManifestFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ManifestFormat::Json),
            "yaml" | "yml" => Ok(ManifestFormat::Yaml),
            "toml" => Ok(ManifestFormat::Toml),
            other => anyhow::bail!("Unsupported manifest format: {other}"),
        }
    }
}

/// A trait that defines the behavior for importing a manifest from a source.
pub trait ManifestImporter {
    /// Reads and parses a complete `BuildConfig` from `file_path`.
    ///
    /// Unknown keys are rejected in every format, so a typo in a key name
    /// surfaces here instead of being silently dropped.
    fn import_from_file(&mut self, file_path: &Path, format: ManifestFormat)
    -> Result<BuildConfig>;
}

pub struct FileImporter;

impl ManifestImporter for FileImporter {
    fn import_from_file(
        &mut self,
        file_path: &Path,
        format: ManifestFormat,
    ) -> Result<BuildConfig> {
        let content = fs::read_to_string(file_path).context("Failed to read import file")?;
        self.parse(&content, format)
    }
}

impl FileImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &str, format: ManifestFormat) -> Result<BuildConfig> {
        match format {
            ManifestFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON manifest")
            }
            ManifestFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML manifest")
            }
            ManifestFormat::Toml => toml::from_str(content).context("Failed to parse TOML manifest"),
        }
    }
}
