//! Artifact upload to the release host through `scp`/`ssh`.

use std::path::{Path, PathBuf};

use glob::MatchOptions;
use walkdir::WalkDir;

use crate::boundary::BoundaryWarning;
use crate::command::{run_checked, CommandRunner, CommandSpec};
use crate::config::{DeployConfig, DeployTargetConfig};
use crate::error::{ReleaseError, Result};

/// Commands uploading one artifact pattern and fixing permissions on the host
#[derive(Debug, Clone, PartialEq)]
pub struct DeployPlan {
    pub host: String,
    pub upload: CommandSpec,
    pub permissions: Vec<CommandSpec>,
    /// Every uploaded path on the host, nested entries included
    pub remote_paths: Vec<String>,
}

/// Shell-like matching: `*` never matches a leading dot
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Expand an artifact glob relative to `base`.
///
/// Returns paths relative to `base`, sorted.
pub fn expand_pattern(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let root = glob::Pattern::escape(&base.to_string_lossy());
    let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
    let paths = glob::glob_with(&full, MATCH_OPTIONS)
        .map_err(|e| ReleaseError::config(format!("Invalid artifact pattern '{}': {}", pattern, e)))?;

    let mut matches = Vec::new();
    for path in paths {
        let path = path.map_err(|e| {
            ReleaseError::command(format!("Cannot list artifacts for '{}': {}", pattern, e))
        })?;
        let relative = path.strip_prefix(base).unwrap_or(path.as_path()).to_path_buf();
        matches.push(relative);
    }
    matches.sort();

    if matches.is_empty() {
        return Err(ReleaseError::command(format!(
            "No artifacts match '{}' in {}",
            pattern,
            base.display()
        )));
    }
    Ok(matches)
}

/// `name` followed by everything below `path` when it is a directory,
/// each prefixed with `name/`
fn collect_entries(base: &Path, path: &Path, name: &str) -> Result<Vec<String>> {
    let root = base.join(path);
    let mut entries = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
        let nested: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if nested.is_empty() {
            entries.push(name.to_string());
        } else {
            entries.push(format!("{}/{}", name, nested.join("/")));
        }
    }
    Ok(entries)
}

/// Build the upload and permission commands for one deploy entry
pub fn plan_deploy(
    base: &Path,
    target: &DeployTargetConfig,
    user: &str,
    entry: &DeployConfig,
) -> Result<DeployPlan> {
    if target.host.is_empty() {
        return Err(ReleaseError::config("deploy.host is not configured"));
    }

    let files = expand_pattern(base, &entry.pattern)?;
    let remote_root = format!("{}{}", target.root, entry.subdir);
    let destination = format!("{}@{}", user, target.host);

    let mut remote_paths = Vec::new();
    for file in &files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let entries = if entry.recursive {
            collect_entries(base, file, &name)?
        } else {
            vec![name]
        };
        remote_paths.extend(entries.into_iter().map(|e| format!("{}/{}", remote_root, e)));
    }

    let mut upload = CommandSpec::new("scp").current_dir(base);
    if entry.recursive {
        upload = upload.arg("-r");
    }
    upload = upload
        .args(files.iter().map(|f| f.to_string_lossy().into_owned()))
        .arg(format!("{}:{}", destination, remote_root));

    let mut permissions = vec![CommandSpec::new("ssh")
        .current_dir(base)
        .args([destination.clone(), "chmod".to_string(), target.mode.clone()])
        .args(remote_paths.iter().cloned())];
    if let Some(group) = &target.group {
        permissions.push(
            CommandSpec::new("ssh")
                .current_dir(base)
                .args([destination.clone(), "chgrp".to_string(), group.clone()])
                .args(remote_paths.iter().cloned()),
        );
    }

    Ok(DeployPlan {
        host: target.host.clone(),
        upload,
        permissions,
        remote_paths,
    })
}

/// Upload, then adjust permissions; permission failures only produce warnings
pub fn deploy<R: CommandRunner + ?Sized>(runner: &R, plan: &DeployPlan) -> Result<Vec<BoundaryWarning>> {
    tracing::info!(command = %plan.upload, "uploading artifacts");
    run_checked(runner, &plan.upload)?;

    let mut warnings = Vec::new();
    for command in &plan.permissions {
        let output = runner.run(command)?;
        if !output.is_success() {
            let action = command.args.iter().skip(1).take(2).cloned().collect::<Vec<_>>();
            warnings.push(BoundaryWarning::RemotePermissionFailed {
                host: plan.host.clone(),
                command: action.join(" "),
            });
        }
    }
    Ok(warnings)
}
