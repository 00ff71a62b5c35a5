use anyhow::{Context, Result};
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single bundle emitted by the optimizer.
///
/// `name` is the module identifier the optimizer builds the bundle from, and
/// `exclude` lists the modules whose code is already emitted by an earlier
/// bundle, so it is left out of this one.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Bundle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl Bundle {
    /// Creates a bundle with the given module identifier and exclusion set.
    ///
    /// Exclusion entries are trimmed and blank entries are dropped, which
    /// makes it safe to feed the result of splitting `--exclude a,b,` here.
    pub fn new(name: impl Into<String>, exclude: Vec<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            anyhow::bail!("Bundle name must not be empty");
        }

        let exclude = exclude
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        Ok(Self { name, exclude })
    }

    /// Returns true when this bundle assumes `module` is provided elsewhere.
    pub fn excludes(&self, module: &str) -> bool {
        self.exclude.iter().any(|e| e == module)
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exclude.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} (excludes {})", self.name, self.exclude.join(", "))
        }
    }
}

/// The regular expression the optimizer uses to skip files when copying the
/// base directory into the output directory.
///
/// Only the source text is stored. It is compiled on demand so the manifest
/// stays serializable and a broken pattern can still be loaded and reported
/// by the validator instead of failing the parse.
///
/// The optimizer evaluates the source as a JavaScript `RegExp` with no flags,
/// so a pattern must both compile here and avoid the constructs JavaScript
/// lacks, see [`ExclusionPattern::javascript_incompatibility`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct ExclusionPattern(String);

impl ExclusionPattern {
    /// Skips dotfiles and stylesheets.
    pub const DEFAULT: &'static str = r"(^\.)|(\.css$)";

    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// Like [`ExclusionPattern::new`] but rejects a pattern that does not
    /// compile or that JavaScript cannot evaluate.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let pattern = Self::new(source);
        if let Some(construct) = pattern.javascript_incompatibility() {
            anyhow::bail!(
                "Exclusion pattern /{}/ uses {construct}, which JavaScript does not support",
                pattern.0
            );
        }
        pattern.compile()?;
        Ok(pattern)
    }

    /// Returns the first construct in the source that this crate's engine
    /// accepts but a flagless JavaScript `RegExp` rejects or reads differently.
    pub fn javascript_incompatibility(&self) -> Option<&'static str> {
        let chars: Vec<char> = self.0.chars().collect();
        let mut in_class = false;
        let mut i = 0;

        while i < chars.len() {
            let next = chars.get(i + 1).copied();
            match chars[i] {
                '\\' => {
                    match next {
                        Some('A') => return Some(r"the \A anchor"),
                        Some('z' | 'Z') => return Some(r"the \z anchor"),
                        Some('p' | 'P') => return Some(r"a \p{..} Unicode class"),
                        Some('x' | 'u') if chars.get(i + 2) == Some(&'{') => {
                            return Some("a braced code point escape");
                        }
                        _ => {}
                    }
                    // Skip the escaped character.
                    i += 2;
                    continue;
                }
                '[' if in_class => return Some("a nested character class"),
                '[' => in_class = true,
                ']' if in_class => in_class = false,
                '&' | '-' | '~' if in_class && next == Some(chars[i]) => {
                    return Some("a character class set operation");
                }
                '(' if !in_class && next == Some('?') => {
                    match (chars.get(i + 2), chars.get(i + 3)) {
                        (Some(':' | '=' | '!'), _) | (Some('<'), _) => {}
                        (Some('P'), Some('<')) => return Some("a (?P<name>..) group"),
                        _ => return Some("inline (?flags)"),
                    }
                }
                _ => {}
            }
            i += 1;
        }

        None
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn compile(&self) -> Result<Regex> {
        Regex::new(&self.0).with_context(|| format!("Invalid exclusion pattern: {}", self.0))
    }

    /// Tests a file the way the optimizer does: against its base name only.
    pub fn is_excluded(&self, path: &str) -> Result<bool> {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        self.compile()?
            .is_match(file_name)
            .with_context(|| format!("Failed to match {file_name} against /{}/", self.0))
    }
}

impl Default for ExclusionPattern {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for ExclusionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.0)
    }
}
