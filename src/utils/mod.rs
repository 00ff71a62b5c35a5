use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::builders::reporter::{ConsoleReporter, StatusReporter};
use crate::builders::validator::{ConfigValidator, StandardValidator, ValidationIssue};
use crate::core::config::{ConfigManager, ConfigProvider};
use crate::core::profile;

pub fn initialize_manifest(manager: &ConfigManager) -> Result<()> {
    manager.initialize()?;
    println!(
        "✓ Initialized bundle manifest at {}",
        manager.get_config_path()?.display()
    );
    println!("Run 'bundle-manifest add-bundle <name>' to declare bundles");
    Ok(())
}

pub fn validate_manifest(manager: &ConfigManager) -> Result<()> {
    let issues = manager.validate_config()?;
    print!("{}", format_validation_report(&issues));

    if issues.iter().any(ValidationIssue::is_error) {
        anyhow::bail!("Configuration validation failed.");
    }
    Ok(())
}

/// The text `validate` prints: a verdict line, then errors before warnings.
pub fn format_validation_report(issues: &[ValidationIssue]) -> String {
    let (errors, warnings): (Vec<_>, Vec<_>) = issues.iter().partition(|i| i.is_error());

    let mut report = if !errors.is_empty() {
        String::from("⚠️  Found issues in configuration:\n")
    } else if !warnings.is_empty() {
        String::from("✓ Configuration is valid, with warnings:\n")
    } else {
        return String::from("✓ Configuration is valid.\n");
    };

    for issue in errors {
        report.push_str(&format!("  ✗ {issue}\n"));
    }
    for issue in warnings {
        report.push_str(&format!("  - {issue}\n"));
    }
    report
}

pub fn show_manifest(manager: &ConfigManager, verbose: bool) -> Result<()> {
    let config = manager.load_config()?;
    let validator = StandardValidator::new().with_root(manager.get_manifest_root().to_path_buf());
    let issues = validator.validate_config(&config)?;
    ConsoleReporter::new(verbose).generate_status_report(&config, &issues)
}

/// Splits `--exclude` values, accepting both repeated flags and comma lists.
pub fn split_excludes(values: Vec<String>) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

pub fn reorder_manifest(manager: &mut ConfigManager) -> Result<()> {
    if manager.reorder_bundles()? {
        println!("✓ Bundles rewritten in build order");
    } else {
        println!("✓ Bundles already in build order");
    }
    Ok(())
}

/// Renders the build profile to `out` (or stdout) and reports the optimizer
/// command that consumes it.
pub fn render_profile(manager: &ConfigManager, out: Option<PathBuf>) -> Result<()> {
    let config = manager.load_config()?;
    let rendered = profile::render_build_profile(&config);

    match out {
        Some(path) => {
            write_profile(&path, &rendered)?;
            let command = profile::optimizer_command(&path);
            info!(command = %command.join(" "), "profile ready");
            println!("✓ Wrote build profile to {}", path.display());
            println!("Run: {}", command.join(" "));
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn write_profile(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, rendered).context("Failed to write build profile")
}
