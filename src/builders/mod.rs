// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules within the `src/builders`
// directory. These modules hold the manifest's building blocks and the logic
// that checks, orders, imports and reports on them.

// `bundle` module:
// Defines the `Bundle` record (a module identifier plus its exclusion set)
// and `ExclusionPattern`, the regex the optimizer uses to skip files.
pub mod bundle;

// `importer` module:
// Reads a complete manifest from a JSON, YAML or TOML file. Unknown keys are
// rejected in every format.
pub mod importer;

// `order` module:
// Resolves a build order in which every bundle comes after the bundles it
// excludes, and reports cycles and dangling references.
pub mod order;

// `reporter` module:
// Defines the `StatusReporter` trait and the `ConsoleReporter` used by the
// `show` command.
pub mod reporter;

// `validator` module:
// Defines the `ConfigValidator` trait, the `StandardValidator`, and the typed
// `ValidationIssue`s it reports (empty fields, bad patterns, exclusions that
// reference unknown or later bundles, and so on).
pub mod validator;
