use anyhow::Result;
use colored::Colorize;

use crate::builders::bundle::Bundle;
use crate::builders::validator::ValidationIssue;
use crate::core::config::BuildConfig;

pub trait StatusReporter {
    fn generate_status_report(&self, config: &BuildConfig, issues: &[ValidationIssue])
    -> Result<()>;
}

/// A concrete implementation of `StatusReporter` that prints the report to the console.
///
/// This is the reporter used by the `show` command.
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Formats one bundle line: its build position, name and exclusion set.
    fn format_bundle(&self, position: usize, bundle: &Bundle) -> String {
        let excludes = if bundle.exclude.is_empty() {
            "no exclusions".dimmed().to_string()
        } else {
            format!("excludes {}", bundle.exclude.join(", "))
        };
        format!("{:>3}. {} ({})", position + 1, bundle.name.bold(), excludes)
    }

    fn format_flag(&self, label: &str, value: bool) -> String {
        let value = if value {
            "yes".green().to_string()
        } else {
            "no".yellow().to_string()
        };
        format!("  {label}: {value}")
    }
}

impl StatusReporter for ConsoleReporter {
    fn generate_status_report(
        &self,
        config: &BuildConfig,
        issues: &[ValidationIssue],
    ) -> Result<()> {
        println!("{}", "Bundle Manifest".cyan().bold());
        println!("===============");
        println!("  Entry config: {}", config.entry_config_path);
        println!("  Base directory: {}", config.base_directory);
        println!("  Output directory: {}", config.output_directory);
        match &config.exclusion_pattern {
            Some(pattern) => println!("  Exclusion pattern: {pattern}"),
            None => println!("  Exclusion pattern: {}", "none".dimmed()),
        }
        println!(
            "{}",
            self.format_flag("Overwrite sources in place", config.allow_overwrite_in_place)
        );
        println!(
            "{}",
            self.format_flag("Keep build directory", config.retain_intermediate_artifacts)
        );

        println!("\n📦 Bundles (build order):");
        if config.bundles.is_empty() {
            println!("  No bundles configured.");
        }
        for (position, bundle) in config.bundles.iter().enumerate() {
            println!("{}", self.format_bundle(position, bundle));
        }

        let errors = issues.iter().filter(|i| i.is_error()).count();
        let warnings = issues.len() - errors;

        println!("\n📈 Summary:");
        println!("  Total bundles: {}", config.bundles.len());
        println!("  Errors: {errors}");
        println!("  Warnings: {warnings}");

        if self.verbose || errors > 0 {
            for issue in issues {
                let marker = if issue.is_error() {
                    "✗".red()
                } else {
                    "!".yellow()
                };
                println!("  {marker} {issue}");
            }
        } else if warnings > 0 {
            println!("\n⚠️  Run with --verbose to see the warnings");
        }

        Ok(())
    }
}
