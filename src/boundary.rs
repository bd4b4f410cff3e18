use std::fmt;

/// Non-fatal conditions met during a release.
/// These are reported to the operator and may require confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Local branch is behind its upstream
    CommitsBehind { branch: String, count: usize },
    /// Entered version is not higher than the current one
    VersionNotHigher { entered: String, current: String },
    /// Files agree on the release but carry different suffixes
    SuffixMismatch {
        left_path: String,
        left: String,
        right_path: String,
        right: String,
    },
    /// chmod/chgrp on the deployment host failed
    RemotePermissionFailed { host: String, command: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::CommitsBehind { branch, count } => {
                write!(
                    f,
                    "Branch '{}' is {} commit{} behind its upstream",
                    branch,
                    count,
                    if *count == 1 { "" } else { "s" }
                )
            }
            BoundaryWarning::VersionNotHigher { entered, current } => {
                write!(
                    f,
                    "You entered \"{}\", which is not higher than the current (\"{}\") and may overwrite a previous release",
                    entered, current
                )
            }
            BoundaryWarning::SuffixMismatch {
                left_path,
                left,
                right_path,
                right,
            } => {
                write!(
                    f,
                    "{} has {} and {} has {}: same release, different suffixes",
                    left_path, left, right_path, right
                )
            }
            BoundaryWarning::RemotePermissionFailed { host, command } => {
                write!(f, "'{}' failed on {} (ignored)", command, host)
            }
        }
    }
}
