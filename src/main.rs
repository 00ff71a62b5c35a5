/// A bundle manifest is the small, declarative record an r.js style
/// optimizer needs: where the loader config lives, which directory module
/// names resolve against, where to write output, which files to skip, and
/// which bundles to build with which modules left out of each.
/// Keeping it in TOML lets us check it (every exclusion must name a bundle
/// built earlier) before the optimizer silently duplicates or drops code.
use anyhow::Result;
use bundle_manifest::core::config::ConfigManager;
use bundle_manifest::utils;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bundle-manifest")]
#[command(about = "Declare, check and render r.js bundle manifests")]
struct Cli {
    /// Path to the manifest (defaults to the nearest bundles.toml)
    #[arg(long, global = true, env = "BUNDLE_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Show debug logging and every validation warning
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default manifest if none exists
    Init,
    /// Check the manifest and fail on errors
    Validate,
    /// Print the manifest and its bundles in build order
    Show,
    /// Append a bundle
    AddBundle {
        /// Module identifier of the bundle
        name: String,
        /// Modules already provided by earlier bundles (repeatable or comma separated)
        #[arg(short, long)]
        exclude: Vec<String>,
    },
    /// Remove a bundle
    RemoveBundle { name: String },
    /// Set the file exclusion pattern, or clear it when omitted
    SetPattern { pattern: Option<String> },
    /// Rewrite bundles so every exclusion is built first
    Reorder,
    /// Replace the manifest with one read from a JSON, YAML or TOML file
    Import {
        file: PathBuf,
        /// Input format (inferred from the extension when omitted)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Write the manifest in another format
    Export {
        file: PathBuf,
        /// One of json, yaml, toml, requirejs
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Render the r.js build profile
    Profile {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let mut manager = match cli.manifest {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };

    match cli.command {
        Commands::Init => utils::initialize_manifest(&manager),
        Commands::Validate => utils::validate_manifest(&manager),
        Commands::Show => utils::show_manifest(&manager, cli.verbose),
        Commands::AddBundle { name, exclude } => {
            manager.add_bundle(name, utils::split_excludes(exclude))
        }
        Commands::RemoveBundle { name } => manager.remove_bundle(&name),
        Commands::SetPattern { pattern } => manager.set_exclusion_pattern(pattern),
        Commands::Reorder => utils::reorder_manifest(&mut manager),
        Commands::Import { file, format } => manager.import_config(&file, format.as_deref()),
        Commands::Export { file, format } => manager.export_config(&file, &format),
        Commands::Profile { out } => utils::render_profile(&manager, out),
    }
}
