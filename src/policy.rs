//! Release version policy: proposing the next version, guarding operator
//! overrides, and checking that files agree on one release.

use std::cmp::Ordering;

use crate::boundary::BoundaryWarning;
use crate::domain::VersionValue;
use crate::error::{ReleaseError, Result};
use crate::ui::{self, Prompter};

/// Outcome of checking an operator-supplied version against the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideDecision {
    /// Strictly higher than the current version
    Accepted,
    /// Equal or lower; the operator must confirm explicitly
    RequiresConfirmation,
}

impl OverrideDecision {
    pub fn is_accepted(self) -> bool {
        self == OverrideDecision::Accepted
    }

    pub fn requires_confirmation(self) -> bool {
        self == OverrideDecision::RequiresConfirmation
    }
}

/// Next micro version, suffix dropped
pub fn propose_next(current: &VersionValue) -> Result<VersionValue> {
    current.next_micro()
}

pub fn validate_override(current: &VersionValue, proposed: &VersionValue) -> OverrideDecision {
    match proposed.compare(current) {
        Ordering::Greater => OverrideDecision::Accepted,
        Ordering::Equal | Ordering::Less => OverrideDecision::RequiresConfirmation,
    }
}

/// Ask for a version until the answer parses, at most `max_attempts` times
pub fn prompt_for_version<P: Prompter + ?Sized>(
    prompter: &P,
    message: &str,
    default: &VersionValue,
    max_attempts: u32,
) -> Result<VersionValue> {
    let default_text = default.to_string();
    for attempt in 1..=max_attempts.max(1) {
        let answer = prompter.input(message, Some(&default_text))?;
        match VersionValue::parse(answer.trim()) {
            Ok(version) => return Ok(version),
            Err(e) if e.is_recoverable_input() => {
                tracing::debug!(attempt, answer = %answer, "rejected version input");
                ui::display_error(&e.to_string());
            }
            Err(e) => return Err(e),
        }
    }
    Err(ReleaseError::aborted(format!(
        "no valid version entered after {} attempts",
        max_attempts.max(1)
    )))
}

/// Propose the next version, let the operator override it, and guard
/// against re-releasing or regressing.
///
/// A version that is not higher is handed to `on_warning` before the
/// operator is asked to confirm it.
pub fn choose_release_version<P, W>(
    prompter: &P,
    current: &VersionValue,
    max_attempts: u32,
    on_warning: &mut W,
) -> Result<VersionValue>
where
    P: Prompter + ?Sized,
    W: FnMut(BoundaryWarning),
{
    let proposed = propose_next(current)?;
    let message = format!("Please enter the new version (current is \"{}\")", current);
    let chosen = prompt_for_version(prompter, &message, &proposed, max_attempts)?;

    if validate_override(current, &chosen).requires_confirmation() {
        on_warning(BoundaryWarning::VersionNotHigher {
            entered: chosen.release().to_string(),
            current: current.to_string(),
        });
        if !prompter.confirm("Are you absolutely SURE?", false)? {
            return Err(ReleaseError::aborted(
                "Invalid version requested, please try again.",
            ));
        }
    }

    Ok(chosen)
}

/// Check that every labelled version names the same release.
///
/// Suffixes are not compared; a difference is only passed to `on_warning`.
/// Returns the first version on success.
pub fn ensure_consistent<W: FnMut(BoundaryWarning)>(
    versions: &[(String, VersionValue)],
    on_warning: &mut W,
) -> Result<VersionValue> {
    let (first_path, first) = versions
        .first()
        .ok_or_else(|| ReleaseError::config("no version files to compare"))?;

    for (path, version) in &versions[1..] {
        if !version.same_release(first) {
            return Err(ReleaseError::Consistency {
                left_path: first_path.clone(),
                left: first.to_string(),
                right_path: path.clone(),
                right: version.to_string(),
            });
        }
        if version.prerelease != first.prerelease {
            on_warning(BoundaryWarning::SuffixMismatch {
                left_path: first_path.clone(),
                left: first.to_string(),
                right_path: path.clone(),
                right: version.to_string(),
            });
        }
    }

    Ok(first.clone())
}

/// Reject a suffixed version for a release build
pub fn ensure_release_build(path: &str, version: &VersionValue) -> Result<()> {
    match &version.prerelease {
        Some(suffix) => Err(ReleaseError::Prerelease {
            path: path.to_string(),
            suffix: suffix.clone(),
        }),
        None => Ok(()),
    }
}
