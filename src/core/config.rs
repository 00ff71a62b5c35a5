use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::builders::bundle::{Bundle, ExclusionPattern};
use crate::builders::importer::{FileImporter, ManifestFormat, ManifestImporter};
use crate::builders::order;
use crate::builders::validator::{ConfigValidator, StandardValidator, ValidationIssue};
use crate::core::profile;

/// File name of the manifest at the manifest root.
pub const MANIFEST_FILE_NAME: &str = "bundles.toml";

/// The build configuration handed to the optimizer.
///
/// Field names are the manifest's own. `core::profile` maps them onto the
/// optimizer's key names when rendering the build profile.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Module-loader config file read before bundling.
    pub entry_config_path: String,
    /// Root from which module identifiers resolve.
    pub base_directory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_pattern: Option<ExclusionPattern>,
    /// Where bundles are written. May equal `base_directory`.
    pub output_directory: String,
    #[serde(default)]
    pub allow_overwrite_in_place: bool,
    #[serde(default)]
    pub retain_intermediate_artifacts: bool,
    /// Build order: foundational bundles first.
    #[serde(default)]
    pub bundles: Vec<Bundle>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            entry_config_path: "requirejs_config.js".to_string(),
            base_directory: "staticfiles".to_string(),
            exclusion_pattern: Some(ExclusionPattern::default()),
            output_directory: "staticfiles".to_string(),
            allow_overwrite_in_place: true,
            retain_intermediate_artifacts: true,
            bundles: Vec::new(),
        }
    }
}

impl BuildConfig {
    pub fn bundle(&self, name: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.name == name)
    }

    /// True when the optimizer writes its output over the sources.
    pub fn is_in_place(&self) -> bool {
        normalize_dir(&self.output_directory) == normalize_dir(&self.base_directory)
    }
}

fn normalize_dir(dir: &str) -> &str {
    let trimmed = dir.trim_end_matches(['/', '\\']);
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    if trimmed.is_empty() { "." } else { trimmed }
}

pub trait ConfigProvider {
    fn load_config(&self) -> Result<BuildConfig>;
    fn save_config(&self, config: &BuildConfig) -> Result<()>;
    fn get_config_path(&self) -> Result<PathBuf>;
}

pub struct ConfigManager {
    config_path: PathBuf,
    manifest_root: PathBuf,
}

impl ConfigManager {
    /// Locates the manifest by walking up from the current directory.
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to read current directory")?;
        let root = find_manifest_root(&current_dir).unwrap_or(current_dir);
        Self::new_at(root)
    }

    pub fn new_at(root: PathBuf) -> Result<Self> {
        let config_path = root.join(MANIFEST_FILE_NAME);
        debug!(path = %config_path.display(), "using manifest");

        Ok(Self {
            config_path,
            manifest_root: root,
        })
    }

    /// Pins the manifest file explicitly, e.g. from `--manifest`.
    pub fn from_path(path: PathBuf) -> Result<Self> {
        let manifest_root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().context("Failed to read current directory")?,
        };
        debug!(path = %path.display(), "using manifest");

        Ok(Self {
            config_path: path,
            manifest_root,
        })
    }

    pub fn initialize(&self) -> Result<()> {
        if self.config_path.exists() {
            debug!("manifest already exists, leaving it untouched");
            return Ok(());
        }

        let default_config = BuildConfig::default();
        self.save_config(&default_config)?;
        info!(path = %self.config_path.display(), "wrote default manifest");
        Ok(())
    }

    /// Runs the standard validator against the manifest on disk and returns
    /// every issue, errors and warnings alike. Only I/O and parse failures are
    /// returned as `Err`.
    pub fn validate_config(&self) -> Result<Vec<ValidationIssue>> {
        let config = self.load_config()?;
        let validator = StandardValidator::new().with_root(self.manifest_root.clone());
        let issues = validator.validate_config(&config)?;

        let errors = issues.iter().filter(|i| i.is_error()).count();
        debug!(errors, warnings = issues.len() - errors, "validated manifest");
        Ok(issues)
    }

    pub fn add_bundle(&mut self, name: String, exclude: Vec<String>) -> Result<()> {
        let mut config = self.load_config()?;
        let bundle = Bundle::new(name, exclude)?;

        if config.bundle(&bundle.name).is_some() {
            anyhow::bail!("Bundle already defined: {}", bundle.name);
        }

        info!(bundle = %bundle, "adding bundle");
        config.bundles.push(bundle);
        self.save_config(&config)
    }

    pub fn remove_bundle(&mut self, name: &str) -> Result<()> {
        let mut config = self.load_config()?;

        let before = config.bundles.len();
        config.bundles.retain(|b| b.name != name);
        if config.bundles.len() == before {
            anyhow::bail!("No bundle named {name}");
        }

        let dependents: Vec<&str> = config
            .bundles
            .iter()
            .filter(|b| b.excludes(name))
            .map(|b| b.name.as_str())
            .collect();
        if !dependents.is_empty() {
            warn!(
                bundle = name,
                dependents = ?dependents,
                "removed bundle is still excluded by other bundles"
            );
        }

        info!(bundle = name, "removed bundle");
        self.save_config(&config)
    }

    /// Replaces the exclusion pattern. `None` clears it.
    pub fn set_exclusion_pattern(&mut self, pattern: Option<String>) -> Result<()> {
        let mut config = self.load_config()?;
        config.exclusion_pattern = pattern.map(ExclusionPattern::parse).transpose()?;
        self.save_config(&config)
    }

    /// Rewrites the bundle list so every exclusion is built before its dependents.
    /// Returns true when the order changed.
    pub fn reorder_bundles(&mut self) -> Result<bool> {
        let mut config = self.load_config()?;
        let ordered = order::resolve_build_order(&config.bundles)?;

        if ordered == config.bundles {
            info!("bundles are already in build order");
            return Ok(false);
        }

        config.bundles = ordered;
        self.save_config(&config)?;
        info!("rewrote bundles in build order");
        Ok(true)
    }

    /// Replaces the manifest with one read from `file_path`.
    pub fn import_config(&mut self, file_path: &Path, format: Option<&str>) -> Result<()> {
        let format = match format {
            Some(f) => f.parse::<ManifestFormat>()?,
            None => ManifestFormat::from_path(file_path)?,
        };

        let mut importer = FileImporter::new();
        let config = importer.import_from_file(file_path, format)?;
        info!(
            source = %file_path.display(),
            bundles = config.bundles.len(),
            "imported manifest"
        );
        self.save_config(&config)
    }

    pub fn export_config(&self, file_path: &Path, format: &str) -> Result<()> {
        let config = self.load_config()?;

        let content = match format {
            "json" => {
                serde_json::to_string_pretty(&config).context("Failed to serialize to JSON")?
            }
            "yaml" => serde_yaml::to_string(&config).context("Failed to serialize to YAML")?,
            "requirejs" | "js" => profile::render_build_profile(&config),
            "toml" => toml::to_string_pretty(&config).context("Failed to serialize to TOML")?,
            other => anyhow::bail!("Unsupported export format: {other}"),
        };

        fs::write(file_path, content).context("Failed to write export file")?;
        info!(destination = %file_path.display(), format, "exported manifest");
        Ok(())
    }

    pub fn get_manifest_root(&self) -> &Path {
        &self.manifest_root
    }
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> Result<BuildConfig> {
        if !self.config_path.exists() {
            debug!("no manifest on disk, using defaults");
            return Ok(BuildConfig::default());
        }

        let content =
            fs::read_to_string(&self.config_path).context("Failed to read config file")?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    fn save_config(&self, config: &BuildConfig) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn get_config_path(&self) -> Result<PathBuf> {
        Ok(self.config_path.clone())
    }
}

fn find_manifest_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(MANIFEST_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}
