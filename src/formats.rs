//! Registry of the known version file formats.
//!
//! Built once at startup from the built-in table plus the `[formats]` section
//! of the configuration, then passed by reference to everything that locates,
//! renders or rewrites versions. It is never modified afterwards.

use std::collections::BTreeMap;

use crate::config::FormatsConfig;
use crate::domain::{VersionPattern, VersionTemplate, VersionValue};
use crate::error::{ReleaseError, Result};

pub const SHORT: &str = "short";
pub const GIT_TAG: &str = "git-tag";
pub const GIT_MESSAGE: &str = "git-message";

const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    ("build-property", r"(?P<indent>\s*)version=(?P<version>[^\s]+)"),
    ("setup-py", r"(?P<indent>\s*)version = '(?P<version>[^\s']+)'"),
    (
        "ivy-revision",
        r#"(?P<indent>\s*)<info .* revision="(?P<version>[^"]+)""#,
    ),
];

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (SHORT, "{major}.{minor}.{micro}"),
    (GIT_TAG, "v{major}.{minor}.{micro}"),
    (GIT_MESSAGE, "Release Version {major}.{minor}.{micro}"),
    ("build-property", "version={major}.{minor}.{micro}"),
    ("build-property-dev", "version={major}.{minor}.{micro}-dev"),
    ("setup-py", "version = '{major}.{minor}.{micro}',"),
];

/// Immutable name -> pattern and name -> template tables
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    patterns: BTreeMap<String, VersionPattern>,
    templates: BTreeMap<String, VersionTemplate>,
}

impl FormatRegistry {
    /// Registry containing only the built-in formats
    pub fn builtin() -> Result<Self> {
        Self::from_config(&FormatsConfig::default())
    }

    /// Built-in formats overridden and extended by the configuration
    pub fn from_config(config: &FormatsConfig) -> Result<Self> {
        let mut patterns = BTreeMap::new();
        let builtin_patterns = BUILTIN_PATTERNS
            .iter()
            .map(|(name, src)| (name.to_string(), src.to_string()));
        for (name, src) in builtin_patterns.chain(config.patterns.clone()) {
            let pattern = VersionPattern::new(name.clone(), &src)?;
            patterns.insert(name, pattern);
        }

        let mut templates = BTreeMap::new();
        let builtin_templates = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, src)| (name.to_string(), src.to_string()));
        for (name, src) in builtin_templates.chain(config.templates.clone()) {
            let template = VersionTemplate::new(name.clone(), src)?;
            templates.insert(name, template);
        }

        Ok(FormatRegistry {
            patterns,
            templates,
        })
    }

    pub fn pattern(&self, name: &str) -> Result<&VersionPattern> {
        self.patterns
            .get(name)
            .ok_or_else(|| ReleaseError::config(format!("Unknown version pattern '{}'", name)))
    }

    pub fn template(&self, name: &str) -> Result<&VersionTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| ReleaseError::config(format!("Unknown version template '{}'", name)))
    }

    /// Render a version with a named template
    pub fn render(&self, template: &str, version: &VersionValue) -> Result<String> {
        Ok(self.template(template)?.render(version))
    }

    pub fn pattern_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Tag name for a release, from the `git-tag` template
    pub fn tag_name(&self, version: &VersionValue) -> Result<String> {
        self.render(GIT_TAG, version)
    }

    /// Tag and commit message for a release, from the `git-message` template
    pub fn tag_message(&self, version: &VersionValue) -> Result<String> {
        self.render(GIT_MESSAGE, version)
    }
}
