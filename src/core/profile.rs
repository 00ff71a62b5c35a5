use serde_json::Value;
use std::path::Path;

use crate::core::config::BuildConfig;

/// The optimizer executable the rendered profile is handed to.
pub const OPTIMIZER_BIN: &str = "r.js";

const INDENT: &str = "    ";

/// Renders `config` as an r.js build profile: a parenthesized object literal
/// using the optimizer's own key names.
///
/// The exclusion pattern becomes a regex literal and an empty `exclude` list
/// is left out, so the reference manifest renders to the same profile an
/// author would write by hand.
pub fn render_build_profile(config: &BuildConfig) -> String {
    let mut out = String::from("({\n");

    property(&mut out, 1, "mainConfigFile", &js_string(&config.entry_config_path));
    property(&mut out, 1, "baseUrl", &js_string(&config.base_directory));
    if let Some(pattern) = &config.exclusion_pattern {
        property(&mut out, 1, "fileExclusionRegExp", &js_regex(pattern.as_str()));
    }
    property(&mut out, 1, "dir", &js_string(&config.output_directory));
    property(
        &mut out,
        1,
        "allowSourceOverwrites",
        &config.allow_overwrite_in_place.to_string(),
    );
    property(
        &mut out,
        1,
        "keepBuildDir",
        &config.retain_intermediate_artifacts.to_string(),
    );

    if !config.bundles.is_empty() {
        out.push_str(INDENT);
        out.push_str("modules: [\n");
        for bundle in &config.bundles {
            out.push_str(&format!("{INDENT}{INDENT}{{\n"));
            property(&mut out, 3, "name", &js_string(&bundle.name));
            if !bundle.exclude.is_empty() {
                let list: Vec<String> = bundle.exclude.iter().map(|e| js_string(e)).collect();
                property(&mut out, 3, "exclude", &format!("[{}]", list.join(", ")));
            }
            out.push_str(&format!("{INDENT}{INDENT}}},\n"));
        }
        out.push_str(&format!("{INDENT}],\n"));
    }

    out.push_str("});\n");
    out
}

/// The argv that runs the optimizer against a profile written to `profile_path`.
pub fn optimizer_command(profile_path: &Path) -> Vec<String> {
    vec![
        OPTIMIZER_BIN.to_string(),
        "-o".to_string(),
        profile_path.display().to_string(),
    ]
}

fn property(out: &mut String, depth: usize, key: &str, value: &str) {
    out.push_str(&format!("{}{key}: {value},\n", INDENT.repeat(depth)));
}

fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Wraps a regex source in `/.../`, escaping bare forward slashes and line
/// breaks so the literal stays on one line and terminates where it should.
/// An empty source becomes `/(?:)/`, since `//` opens a line comment.
fn js_regex(source: &str) -> String {
    if source.is_empty() {
        return "/(?:)/".to_string();
    }

    let mut out = String::with_capacity(source.len() + 2);
    out.push('/');

    let mut escaped = false;
    for c in source.chars() {
        match c {
            '/' if !escaped => out.push_str("\\/"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
        escaped = c == '\\' && !escaped;
    }

    out.push('/');
    out
}
