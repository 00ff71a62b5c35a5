// This file is the module declaration file for the `core` module.
//
// `config` module:
// Defines the manifest data structure (`BuildConfig`), the `ConfigProvider`
// trait for abstracting manifest access, and the `ConfigManager` that loads,
// saves, edits, imports and exports the manifest file.
pub mod config;

// `profile` module:
// Renders a `BuildConfig` as the build profile the r.js optimizer reads,
// and the command line that hands it over.
pub mod profile;
