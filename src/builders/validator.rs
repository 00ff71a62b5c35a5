use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;

use crate::builders::bundle::Bundle;
use crate::core::config::BuildConfig;

/// A single problem found in a manifest.
///
/// Most variants are errors: the optimizer would either fail or emit
/// duplicated or missing code. The few that only hint at a likely mistake are
/// warnings, see [`ValidationIssue::is_error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("Required field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("Invalid exclusion pattern /{pattern}/: {reason}")]
    InvalidExclusionPattern { pattern: String, reason: String },

    #[error("Exclusion pattern /{pattern}/ uses {construct}, which JavaScript does not support")]
    UnsupportedInJavaScript {
        pattern: String,
        construct: &'static str,
    },

    #[error("Bundle #{index} has an empty name")]
    EmptyBundleName { index: usize },

    #[error("Bundle `{name}` is defined more than once")]
    DuplicateBundle { name: String },

    #[error("Bundle `{name}` excludes itself")]
    SelfExclusion { name: String },

    #[error("Bundle `{bundle}` excludes `{excluded}`, which is not a bundle")]
    UnknownExclusion { bundle: String, excluded: String },

    #[error("Bundle `{bundle}` excludes `{excluded}`, which is built after it")]
    ExclusionOrder { bundle: String, excluded: String },

    #[error(
        "Output directory `{directory}` is the base directory but overwriting sources is not allowed"
    )]
    OverwriteNotAllowed { directory: String },

    #[error("Bundle `{bundle}` lists `{excluded}` more than once")]
    DuplicateExclusion { bundle: String, excluded: String },

    #[error("Path not found: {0}")]
    MissingPath(String),

    #[error("Exclusion pattern /{0}/ matches every file")]
    MatchesEverything(String),
}

impl ValidationIssue {
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            ValidationIssue::DuplicateExclusion { .. }
                | ValidationIssue::MissingPath(_)
                | ValidationIssue::MatchesEverything(_)
        )
    }
}

/// The `ConfigValidator` trait defines the public interface for validating a
/// build manifest.
pub trait ConfigValidator {
    /// Performs a full validation of the `BuildConfig` and returns every
    /// issue found. An empty list means the manifest is clean.
    fn validate_config(&self, config: &BuildConfig) -> Result<Vec<ValidationIssue>>;

    /// Checks that every exclusion names a bundle built earlier in the list.
    fn validate_bundles(&self, bundles: &[Bundle]) -> Vec<ValidationIssue>;
}

/// The `StandardValidator` is the validator used by the `validate` command.
///
/// When given a manifest root it also checks that the entry config file and
/// the base directory exist on disk, resolving them relative to that root.
pub struct StandardValidator {
    root: Option<PathBuf>,
}

impl StandardValidator {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = Some(root);
        self
    }

    fn check_required_fields(&self, config: &BuildConfig) -> Vec<ValidationIssue> {
        [
            ("entry_config_path", &config.entry_config_path),
            ("base_directory", &config.base_directory),
            ("output_directory", &config.output_directory),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| ValidationIssue::EmptyField(field))
        .collect()
    }

    fn check_exclusion_pattern(&self, config: &BuildConfig) -> Vec<ValidationIssue> {
        let Some(pattern) = &config.exclusion_pattern else {
            return Vec::new();
        };

        let source = pattern.as_str();
        if let Some(construct) = pattern.javascript_incompatibility() {
            return vec![ValidationIssue::UnsupportedInJavaScript {
                pattern: source.to_string(),
                construct,
            }];
        }

        match fancy_regex::Regex::new(source) {
            Err(e) => vec![ValidationIssue::InvalidExclusionPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            }],
            Ok(_) if matches!(source, ".*" | "^.*$" | "" | "(?:)") => {
                vec![ValidationIssue::MatchesEverything(source.to_string())]
            }
            Ok(_) => Vec::new(),
        }
    }

    /// Checks the paths the optimizer reads. Skipped when no root is set,
    /// since relative paths then have nothing to resolve against.
    fn check_paths(&self, config: &BuildConfig) -> Vec<ValidationIssue> {
        let Some(root) = &self.root else {
            return Vec::new();
        };

        [&config.entry_config_path, &config.base_directory]
            .into_iter()
            .filter(|p| !p.trim().is_empty() && !root.join(p.as_str()).exists())
            .map(|p| ValidationIssue::MissingPath(p.clone()))
            .collect()
    }
}

impl ConfigValidator for StandardValidator {
    fn validate_config(&self, config: &BuildConfig) -> Result<Vec<ValidationIssue>> {
        let mut issues = self.check_required_fields(config);
        issues.extend(self.check_exclusion_pattern(config));

        if config.is_in_place() && !config.allow_overwrite_in_place {
            issues.push(ValidationIssue::OverwriteNotAllowed {
                directory: config.output_directory.clone(),
            });
        }

        issues.extend(self.validate_bundles(&config.bundles));
        issues.extend(self.check_paths(config));

        Ok(issues)
    }

    fn validate_bundles(&self, bundles: &[Bundle]) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        // First position of every name, so later duplicates do not shadow it.
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (index, bundle) in bundles.iter().enumerate() {
            if bundle.name.trim().is_empty() {
                issues.push(ValidationIssue::EmptyBundleName { index });
                continue;
            }
            if positions.contains_key(bundle.name.as_str()) {
                issues.push(ValidationIssue::DuplicateBundle {
                    name: bundle.name.clone(),
                });
            } else {
                positions.insert(bundle.name.as_str(), index);
            }
        }

        for (index, bundle) in bundles.iter().enumerate() {
            let mut seen = HashSet::new();
            for excluded in &bundle.exclude {
                if !seen.insert(excluded.as_str()) {
                    issues.push(ValidationIssue::DuplicateExclusion {
                        bundle: bundle.name.clone(),
                        excluded: excluded.clone(),
                    });
                    continue;
                }

                if *excluded == bundle.name {
                    issues.push(ValidationIssue::SelfExclusion {
                        name: bundle.name.clone(),
                    });
                    continue;
                }

                match positions.get(excluded.as_str()) {
                    None => issues.push(ValidationIssue::UnknownExclusion {
                        bundle: bundle.name.clone(),
                        excluded: excluded.clone(),
                    }),
                    Some(&position) if position > index => {
                        issues.push(ValidationIssue::ExclusionOrder {
                            bundle: bundle.name.clone(),
                            excluded: excluded.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        issues
    }
}
