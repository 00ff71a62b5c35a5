//! Declarative build manifests for an r.js style optimizer.
//!
//! A manifest names the loader config, base and output directories, a file
//! exclusion pattern and an ordered list of bundles. This crate stores it as
//! TOML, validates it, and renders the build profile the optimizer consumes.
pub mod builders;
pub mod core;
pub mod utils;
