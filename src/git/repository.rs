use crate::error::{ReleaseError, Result};
use git2::{BranchType, ErrorCode, FetchOptions, PushOptions, RemoteCallbacks, Repository as Git2Repo};
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn remote(&self, name: &str) -> Result<git2::Remote<'_>> {
        self.repo
            .find_remote(name)
            .map_err(|e| ReleaseError::remote(format!("Cannot find remote '{}': {}", name, e)))
    }

    fn push(&self, remote_name: &str, refspecs: &[String]) -> Result<()> {
        let mut remote = self.remote(remote_name)?;
        let mut callbacks = remote_callbacks();
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "{} rejected: {}",
                refname, message
            ))),
            None => Ok(()),
        });
        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec_strs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        tracing::debug!(remote = remote_name, refspecs = ?refspec_strs, "pushing");
        remote
            .push(&refspec_strs, Some(&mut options))
            .map_err(|e| ReleaseError::remote(format!("Push to '{}' failed: {}", remote_name, e)))
    }
}

/// Credentials callback trying SSH keys from ~/.ssh, then the SSH agent,
/// then git's default credentials
fn remote_callbacks() -> RemoteCallbacks<'static> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");
        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });
    callbacks
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }

    fn has_tracked_changes(&self) -> Result<bool> {
        let mut options = git2::StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    fn commits_behind(&self) -> Result<usize> {
        let head = self.repo.head()?;
        let (Some(name), Some(local)) = (head.shorthand(), head.target()) else {
            return Ok(0);
        };

        let branch = match self.repo.find_branch(name, BranchType::Local) {
            Ok(branch) => branch,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let upstream = match branch.upstream() {
            Ok(upstream) => upstream,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let Some(remote_oid) = upstream.get().target() else {
            return Ok(0);
        };

        let (_ahead, behind) = self.repo.graph_ahead_behind(local, remote_oid)?;
        Ok(behind)
    }

    fn fetch_tags(&self, remote_name: &str) -> Result<()> {
        let mut remote = self.remote(remote_name)?;
        let mut options = FetchOptions::new();
        options.remote_callbacks(remote_callbacks());

        tracing::debug!(remote = remote_name, "fetching tags");
        remote
            .fetch(&["+refs/tags/*:refs/tags/*"], Some(&mut options), None)
            .map_err(|e| {
                ReleaseError::remote(format!("Fetch from '{}' failed: {}", remote_name, e))
            })
    }

    fn list_remotes(&self) -> Result<Vec<String>> {
        let remotes = self.repo.remotes()?;
        Ok(remotes.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn commit_all(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        index.update_all(["*"], None)?;
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;

        let short = self.repo.find_object(oid, None)?.short_id()?;
        let short = short.as_str().unwrap_or_default().to_string();
        tracing::info!(commit = %short, message, "committed release changes");
        Ok(short)
    }

    fn create_annotated_tag(&self, name: &str, message: &str, commit: &str) -> Result<()> {
        let target = self.repo.revparse_single(commit)?;
        let signature = self.repo.signature()?;
        self.repo.tag(name, &target, &signature, message, true)?;
        tracing::info!(tag = name, commit, "created annotated tag");
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.push(remote, &[format!("refs/heads/{0}:refs/heads/{0}", branch)])
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        let tags = self.repo.tag_names(None)?;
        let refspecs: Vec<String> = tags
            .iter()
            .flatten()
            .map(|tag| format!("refs/tags/{0}:refs/tags/{0}", tag))
            .collect();
        if refspecs.is_empty() {
            return Ok(());
        }
        self.push(remote, &refspecs)
    }
}
