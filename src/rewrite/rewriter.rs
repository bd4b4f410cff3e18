use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{VersionPattern, VersionTemplate, VersionValue};
use crate::error::{ReleaseError, Result};
use crate::rewrite::locator::{self, Located};

/// The text of one version-bearing file, read once and never written in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFile {
    pub path: PathBuf,
    pub text: String,
}

/// A computed single-line replacement, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewrite {
    pub path: PathBuf,
    pub line_index: usize,
    pub new_line: String,
    pub new_text: String,
}

impl VersionFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        VersionFile {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Ok(VersionFile::new(path, text))
    }

    /// Locate the version line, failing with `NotFound` when no line matches
    pub fn locate(&self, pattern: &VersionPattern) -> Result<Located<'_>> {
        locator::locate(&self.text, pattern).ok_or_else(|| ReleaseError::NotFound {
            path: self.path.display().to_string(),
            pattern: pattern.name.clone(),
        })
    }

    /// Locate and parse the current version
    pub fn current_version(&self, pattern: &VersionPattern) -> Result<VersionValue> {
        let located = self.locate(pattern)?;
        VersionValue::parse(located.version_text).map_err(|_| {
            ReleaseError::InvalidVersionInFile {
                path: self.path.display().to_string(),
                pattern: pattern.name.clone(),
                text: located.version_text.to_string(),
            }
        })
    }

    /// Replace the version line with `indent + template(version) + terminator`.
    ///
    /// Every other line is copied unchanged. Nothing touches the disk here.
    pub fn rewrite(
        &self,
        pattern: &VersionPattern,
        template: &VersionTemplate,
        version: &VersionValue,
    ) -> Result<FileRewrite> {
        let located = self.locate(pattern)?;
        let new_line = format!(
            "{}{}{}",
            located.indent,
            template.render(version),
            located.terminator
        );

        let mut new_text = String::with_capacity(self.text.len() + new_line.len());
        for (index, line) in locator::lines(&self.text).enumerate() {
            if index == located.line_index {
                new_text.push_str(&new_line);
            } else {
                new_text.push_str(line.content);
                new_text.push_str(line.terminator);
            }
        }

        Ok(FileRewrite {
            path: self.path.clone(),
            line_index: located.line_index,
            new_line,
            new_text,
        })
    }
}

impl FileRewrite {
    /// True when persisting would not change the file
    pub fn is_noop(&self, original: &VersionFile) -> bool {
        self.new_text == original.text
    }

    pub fn persist(&self) -> Result<()> {
        fs::write(&self.path, &self.new_text)?;
        Ok(())
    }
}

/// Rewrite `text` in memory; see [`VersionFile::rewrite`]
pub fn rewrite(
    text: &str,
    pattern: &VersionPattern,
    template: &VersionTemplate,
    version: &VersionValue,
) -> Result<String> {
    let file = VersionFile::new("<text>", text);
    Ok(file.rewrite(pattern, template, version)?.new_text)
}
