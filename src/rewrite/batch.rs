use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{VersionPattern, VersionTemplate, VersionValue};
use crate::error::Result;
use crate::rewrite::rewriter::VersionFile;

/// File writes computed up front and persisted together.
///
/// Staging reads from disk (or from an earlier staged write of the same file),
/// so a failure while staging leaves every file untouched.
#[derive(Debug, Default)]
pub struct RewriteBatch {
    staged: Vec<(PathBuf, String)>,
}

impl RewriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self, path: &Path) -> Result<VersionFile> {
        match self.staged.iter().rev().find(|(p, _)| p == path) {
            Some((p, text)) => Ok(VersionFile::new(p.clone(), text.clone())),
            None => VersionFile::read(path),
        }
    }

    fn stage(&mut self, path: PathBuf, text: String) {
        match self.staged.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = text,
            None => self.staged.push((path, text)),
        }
    }

    /// Stage a single-line version rewrite
    pub fn stage_rewrite(
        &mut self,
        path: &Path,
        pattern: &VersionPattern,
        template: &VersionTemplate,
        version: &VersionValue,
    ) -> Result<()> {
        let file = self.current(path)?;
        let rewrite = file.rewrite(pattern, template, version)?;
        tracing::debug!(
            path = %path.display(),
            line = rewrite.line_index,
            new_line = rewrite.new_line.trim_end(),
            "staged version rewrite"
        );
        self.stage(rewrite.path, rewrite.new_text);
        Ok(())
    }

    /// Stage a whole-file write rendered from a template
    pub fn stage_contents(&mut self, path: &Path, template: &VersionTemplate, version: &VersionValue) {
        tracing::debug!(path = %path.display(), template = %template.name, "staged file contents");
        self.stage(path.to_path_buf(), template.render(version));
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.staged.iter().map(|(p, _)| p.as_path())
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Staged text for `path`, if any
    pub fn staged_text(&self, path: &Path) -> Option<&str> {
        self.staged
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, text)| text.as_str())
    }

    /// Write every staged file, returning the written paths
    pub fn persist(self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.staged.len());
        for (path, text) in self.staged {
            fs::write(&path, text)?;
            tracing::info!(path = %path.display(), "wrote version file");
            written.push(path);
        }
        Ok(written)
    }
}
