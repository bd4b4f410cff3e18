use crate::error::{ReleaseError, Result};
use regex::Regex;

/// Named matcher locating a version inside one line of a file.
///
/// The regex must define the named groups `indent` (leading whitespace kept
/// on rewrite) and `version` (the version text itself).
#[derive(Debug, Clone)]
pub struct VersionPattern {
    pub name: String,
    regex: Regex,
}

/// Captures of a pattern on a single line, terminator excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'t> {
    pub indent: &'t str,
    pub version: &'t str,
}

impl VersionPattern {
    /// Compile a pattern, checking that both named groups are present
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|e| {
            ReleaseError::config(format!("Invalid regex for pattern '{}': {}", name, e))
        })?;

        for group in ["indent", "version"] {
            if !regex.capture_names().flatten().any(|n| n == group) {
                return Err(ReleaseError::config(format!(
                    "Pattern '{}' must define a named group '{}'",
                    name, group
                )));
            }
        }

        Ok(VersionPattern { name, regex })
    }

    /// Search one line (without its terminator)
    pub fn match_line<'t>(&self, line: &'t str) -> Option<PatternMatch<'t>> {
        let caps = self.regex.captures(line)?;
        let version = caps.name("version")?.as_str();
        let indent = caps.name("indent").map_or("", |m| m.as_str());
        Some(PatternMatch { indent, version })
    }
}
