use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::cell::RefCell;

/// Mutating operation recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitAction {
    FetchTags { remote: String },
    Commit { message: String },
    Tag { name: String, message: String, commit: String },
    PushBranch { remote: String, branch: String },
    PushTags { remote: String },
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    branch: String,
    dirty: bool,
    behind: usize,
    remotes: Vec<String>,
    next_commit: String,
    actions: RefCell<Vec<GitAction>>,
}

impl MockRepository {
    /// A clean repository on `branch` with an `origin` remote
    pub fn new(branch: impl Into<String>) -> Self {
        MockRepository {
            branch: branch.into(),
            dirty: false,
            behind: 0,
            remotes: vec!["origin".to_string()],
            next_commit: "abc1234".to_string(),
            actions: RefCell::new(Vec::new()),
        }
    }

    pub fn with_changes(mut self) -> Self {
        self.dirty = true;
        self
    }

    pub fn with_commits_behind(mut self, count: usize) -> Self {
        self.behind = count;
        self
    }

    pub fn with_remotes<I, S>(mut self, remotes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remotes = remotes.into_iter().map(Into::into).collect();
        self
    }

    /// Recorded mutating operations, in order
    pub fn actions(&self) -> Vec<GitAction> {
        self.actions.borrow().clone()
    }

    fn record(&self, action: GitAction) {
        self.actions.borrow_mut().push(action);
    }

    fn known_remote(&self, remote: &str) -> Result<()> {
        if self.remotes.iter().any(|r| r == remote) {
            Ok(())
        } else {
            Err(ReleaseError::remote(format!("Cannot find remote '{}'", remote)))
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new("develop")
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn has_tracked_changes(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn commits_behind(&self) -> Result<usize> {
        Ok(self.behind)
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        self.known_remote(remote)?;
        self.record(GitAction::FetchTags {
            remote: remote.to_string(),
        });
        Ok(())
    }

    fn list_remotes(&self) -> Result<Vec<String>> {
        Ok(self.remotes.clone())
    }

    fn commit_all(&self, message: &str) -> Result<String> {
        self.record(GitAction::Commit {
            message: message.to_string(),
        });
        Ok(self.next_commit.clone())
    }

    fn create_annotated_tag(&self, name: &str, message: &str, commit: &str) -> Result<()> {
        self.record(GitAction::Tag {
            name: name.to_string(),
            message: message.to_string(),
            commit: commit.to_string(),
        });
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.known_remote(remote)?;
        self.record(GitAction::PushBranch {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        self.known_remote(remote)?;
        self.record(GitAction::PushTags {
            remote: remote.to_string(),
        });
        Ok(())
    }
}
