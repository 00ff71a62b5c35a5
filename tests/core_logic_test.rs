use bundle_manifest::builders::bundle::Bundle;
use bundle_manifest::builders::validator::{ConfigValidator, StandardValidator, ValidationIssue};
use bundle_manifest::core::config::{BuildConfig, ConfigManager, ConfigProvider};
use bundle_manifest::core::profile::render_build_profile;
use std::fs;
use tempfile::TempDir;

const ENTRY: &str = "corehq/apps/hqwebapp/static/hqwebapp/js/requirejs_config.js";

fn setup_manifest_root() -> (TempDir, ConfigManager) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();

    fs::create_dir_all(root.join("staticfiles")).unwrap();
    let entry = root.join(ENTRY);
    fs::create_dir_all(entry.parent().unwrap()).unwrap();
    fs::write(&entry, "requirejs.config({});\n").unwrap();

    let manager = ConfigManager::new_at(root).unwrap();
    let config = BuildConfig {
        entry_config_path: ENTRY.to_string(),
        ..BuildConfig::default()
    };
    manager.save_config(&config).unwrap();
    (dir, manager)
}

fn add(manager: &mut ConfigManager, name: &str, exclude: &[&str]) {
    manager
        .add_bundle(
            name.to_string(),
            exclude.iter().map(|e| e.to_string()).collect(),
        )
        .unwrap();
}

#[test]
fn test_core_workflow() {
    let (_td, mut manager) = setup_manifest_root();

    // 1. Declare bundles: third-party, shared, app specific.
    add(&mut manager, "hqwebapp/js/common", &[]);
    add(&mut manager, "hqwebapp/js/jquery-ui", &["hqwebapp/js/common"]);
    add(&mut manager, "hqwebapp/js/built", &["hqwebapp/js/common"]);
    add(
        &mut manager,
        "fixtures/js/built",
        &["hqwebapp/js/common", "hqwebapp/js/built"],
    );

    // 2. Validate: paths exist and every exclusion is built earlier.
    let issues = manager.validate_config().unwrap();
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");

    // 3. Render the profile the optimizer reads.
    let profile = render_build_profile(&manager.load_config().unwrap());
    let expected = r#"({
    mainConfigFile: "corehq/apps/hqwebapp/static/hqwebapp/js/requirejs_config.js",
    baseUrl: "staticfiles",
    fileExclusionRegExp: /(^\.)|(\.css$)/,
    dir: "staticfiles",
    allowSourceOverwrites: true,
    keepBuildDir: true,
    modules: [
        {
            name: "hqwebapp/js/common",
        },
        {
            name: "hqwebapp/js/jquery-ui",
            exclude: ["hqwebapp/js/common"],
        },
        {
            name: "hqwebapp/js/built",
            exclude: ["hqwebapp/js/common"],
        },
        {
            name: "fixtures/js/built",
            exclude: ["hqwebapp/js/common", "hqwebapp/js/built"],
        },
    ],
});
"#;
    assert_eq!(profile, expected);
}

#[test]
fn test_out_of_order_bundles_fail_until_reordered() {
    let (_td, mut manager) = setup_manifest_root();

    add(&mut manager, "app", &["common"]);
    add(&mut manager, "common", &[]);

    let issues = manager.validate_config().unwrap();
    assert_eq!(
        issues,
        vec![ValidationIssue::ExclusionOrder {
            bundle: "app".to_string(),
            excluded: "common".to_string(),
        }]
    );

    assert!(manager.reorder_bundles().unwrap());
    let names: Vec<String> = manager
        .load_config()
        .unwrap()
        .bundles
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, vec!["common", "app"]);
    assert!(manager.validate_config().unwrap().is_empty());

    // A second pass has nothing left to do.
    assert!(!manager.reorder_bundles().unwrap());
}

#[test]
fn test_removed_bundle_leaves_dangling_exclusion() {
    let (_td, mut manager) = setup_manifest_root();
    add(&mut manager, "common", &[]);
    add(&mut manager, "app", &["common"]);

    manager.remove_bundle("common").unwrap();
    assert!(manager.remove_bundle("common").is_err());

    let config = manager.load_config().unwrap();
    let issues = StandardValidator::new().validate_bundles(&config.bundles);
    assert_eq!(
        issues,
        vec![ValidationIssue::UnknownExclusion {
            bundle: "app".to_string(),
            excluded: "common".to_string(),
        }]
    );
}

#[test]
fn test_duplicate_bundle_is_rejected_on_add() {
    let (_td, mut manager) = setup_manifest_root();
    add(&mut manager, "common", &[]);
    assert!(
        manager
            .add_bundle("common".to_string(), Vec::new())
            .is_err()
    );
}

#[test]
fn test_exclusion_pattern_edits() {
    let (_td, mut manager) = setup_manifest_root();

    assert!(manager.set_exclusion_pattern(Some("(".to_string())).is_err());

    manager
        .set_exclusion_pattern(Some(r"\.map$".to_string()))
        .unwrap();
    let config = manager.load_config().unwrap();
    let pattern = config.exclusion_pattern.unwrap();
    assert!(pattern.is_excluded("hqwebapp/js/main.js.map").unwrap());

    manager.set_exclusion_pattern(None).unwrap();
    let config = manager.load_config().unwrap();
    assert!(config.exclusion_pattern.is_none());
    assert!(!render_build_profile(&config).contains("fileExclusionRegExp"));
}

#[test]
fn test_rust_only_pattern_is_rejected_and_never_rendered() {
    let (_td, mut manager) = setup_manifest_root();

    assert!(
        manager
            .set_exclusion_pattern(Some(r"(?i)\.CSS\z".to_string()))
            .is_err()
    );
    let config = manager.load_config().unwrap();
    assert_eq!(config.exclusion_pattern, BuildConfig::default().exclusion_pattern);

    manager
        .set_exclusion_pattern(Some(r"(?<!\.min)\.js$".to_string()))
        .unwrap();
    let profile = render_build_profile(&manager.load_config().unwrap());
    assert!(profile.contains(r"    fileExclusionRegExp: /(?<!\.min)\.js$/,"));
}

#[test]
fn test_empty_pattern_renders_valid_regex_literal() {
    let (_td, mut manager) = setup_manifest_root();
    manager.set_exclusion_pattern(Some(String::new())).unwrap();

    let issues = manager.validate_config().unwrap();
    assert_eq!(issues, vec![ValidationIssue::MatchesEverything(String::new())]);

    let profile = render_build_profile(&manager.load_config().unwrap());
    assert!(profile.contains("    fileExclusionRegExp: /(?:)/,\n"));
}

#[test]
fn test_export_then_import_json() {
    let (td, mut manager) = setup_manifest_root();
    add(&mut manager, "common", &[]);
    add(&mut manager, "app", &["common"]);
    let original = manager.load_config().unwrap();

    let exported = td.path().join("bundles.json");
    manager.export_config(&exported, "json").unwrap();

    // Clobber the manifest, then restore it from the export.
    manager.save_config(&BuildConfig::default()).unwrap();
    manager.import_config(&exported, None).unwrap();

    assert_eq!(manager.load_config().unwrap(), original);
}

#[test]
fn test_export_requirejs_profile() {
    let (td, manager) = setup_manifest_root();
    let target = td.path().join("build.js");
    manager.export_config(&target, "requirejs").unwrap();

    let text = fs::read_to_string(target).unwrap();
    assert!(text.starts_with("({\n    mainConfigFile: "));
    assert!(text.ends_with("});\n"));

    assert!(manager.export_config(&td.path().join("x.ini"), "ini").is_err());
}

#[test]
fn test_validator_without_root_skips_path_checks() {
    let config = BuildConfig {
        bundles: vec![Bundle::new("common", Vec::new()).unwrap()],
        ..BuildConfig::default()
    };
    let issues = StandardValidator::new().validate_config(&config).unwrap();
    assert!(issues.is_empty());
}
