//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations a
//! release needs, so the workflow can run against a real repository or a mock.
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing

pub mod mock;
pub mod repository;

pub use mock::{GitAction, MockRepository};
pub use repository::Git2Repository;

use crate::error::Result;

/// Git operations used by a release
///
/// All methods return [crate::error::Result<T>]; implementations map
/// underlying errors to [crate::error::ReleaseError] variants.
pub trait Repository {
    /// Short name of the checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// True when tracked files have uncommitted changes (untracked files ignored)
    fn has_tracked_changes(&self) -> Result<bool>;

    /// Number of commits on the upstream of the current branch that HEAD lacks.
    ///
    /// Zero when the branch has no upstream.
    fn commits_behind(&self) -> Result<usize>;

    /// Fetch all tags from `remote`
    fn fetch_tags(&self, remote: &str) -> Result<()>;

    /// Configured remote names
    fn list_remotes(&self) -> Result<Vec<String>>;

    /// Commit every modified tracked file, returning the short commit hash
    fn commit_all(&self, message: &str) -> Result<String>;

    /// Create (or replace) an annotated tag pointing at `commit`
    fn create_annotated_tag(&self, name: &str, message: &str, commit: &str) -> Result<()>;

    /// Push a local branch to the same name on `remote`
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Push every local tag to `remote`
    fn push_tags(&self, remote: &str) -> Result<()>;
}

/// Pick the default remote: the first preferred one that exists, else the first configured
pub fn preferred_remote<'a>(remotes: &'a [String], preferred: &[String]) -> Option<&'a str> {
    preferred
        .iter()
        .find_map(|p| remotes.iter().find(|r| *r == p))
        .or_else(|| remotes.first())
        .map(String::as_str)
}
