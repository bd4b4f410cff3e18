use crate::domain::VersionValue;
use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::sync::OnceLock;

const PLACEHOLDERS: [&str; 4] = ["major", "minor", "micro", "suffix"];

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex is valid"))
}

/// Named text template rendering a version for one file format
/// (e.g. "version={major}.{minor}.{micro}", "v{major}.{minor}.{micro}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTemplate {
    pub name: String,
    pub template: String,
}

impl VersionTemplate {
    /// Create a template, rejecting placeholders other than
    /// `{major}`, `{minor}`, `{micro}` and `{suffix}`
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let template = template.into();

        for caps in placeholder_regex().captures_iter(&template) {
            let placeholder = &caps[1];
            if !PLACEHOLDERS.contains(&placeholder) {
                return Err(ReleaseError::config(format!(
                    "Template '{}' uses unknown placeholder '{{{}}}'",
                    name, placeholder
                )));
            }
        }

        Ok(VersionTemplate { name, template })
    }

    /// Format a version according to the template
    /// Example: template="v{major}.{minor}.{micro}", version=1.2.3-dev -> "v1.2.3"
    pub fn render(&self, version: &VersionValue) -> String {
        self.template
            .replace("{major}", &version.major.to_string())
            .replace("{minor}", &version.minor.to_string())
            .replace("{micro}", &version.micro.to_string())
            .replace("{suffix}", version.prerelease.as_deref().unwrap_or(""))
    }
}
