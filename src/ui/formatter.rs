//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::{ReleasePlan, WorkflowResult};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    tracing::warn!("{}", warning);
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the banner shown before a release starts.
pub fn display_intro(profile: &str, description: Option<&str>, release_branch: &str) {
    let rule = "-".repeat(78);
    println!("\n{}", rule);
    println!("{}", style(format!("release-bump: {}", profile)).bold());
    if let Some(description) = description {
        println!("{}", description);
    }
    println!();
    println!("Prerequisites:");
    println!(" 1) No local modifications in the repository being released.");
    println!(" 2) The '{}' branch is checked out.", release_branch);
    println!(" 3) HEAD is the exact commit to release.");
    println!(" 4) Dependent versions in config files are already committed.");
    println!("{}\n", rule);
}

/// Display the configured release profiles.
pub fn display_profiles<'a>(profiles: impl Iterator<Item = (&'a str, Option<&'a str>)>) {
    println!("{}", style("Configured profiles:").bold());
    for (name, description) in profiles {
        match description {
            Some(description) => println!("  - {}: {}", name, description),
            None => println!("  - {}", name),
        }
    }
}

/// Display the names usable as `pattern` and `template` in profiles.
pub fn display_formats<'a>(
    patterns: impl Iterator<Item = &'a str>,
    templates: impl Iterator<Item = &'a str>,
) {
    println!("\n{}", style("Version patterns:").bold());
    println!("  {}", patterns.collect::<Vec<_>>().join(", "));
    println!("{}", style("Version templates:").bold());
    println!("  {}", templates.collect::<Vec<_>>().join(", "));
}

/// Display what a release would do.
pub fn display_plan(plan: &ReleasePlan) {
    println!("\n{}", style("Release plan:").bold());
    match &plan.version {
        Some(version) => println!("  Version: {}", style(version).green()),
        None => println!("  Version: (unchanged)"),
    }
    if let Some(dependency) = &plan.dependency {
        println!("  Dependency: {}", dependency);
    }
    for path in &plan.prepare {
        println!("  Update before build: {}", path.display());
    }
    for command in &plan.build {
        println!("  Run: {}", style(command).cyan());
    }
    for pattern in &plan.deploy {
        println!("  Deploy: {}", pattern);
    }
    for path in &plan.finalize {
        println!("  Update after deploy: {}", path.display());
    }
    if let Some(tag) = &plan.tag {
        println!("  Tag: {}", style(tag).green());
    }
    if let Some(remote) = &plan.remote {
        println!("  Push to: {}", remote);
    }
}

/// Display the outcome of a finished release.
pub fn display_result(result: &WorkflowResult) {
    match (&result.tag, &result.commit) {
        (Some(tag), Some(commit)) => println!(
            "\n{} Released {} as {} ({})\n",
            style("✓").green(),
            result.profile,
            style(tag).green(),
            commit
        ),
        _ => println!(
            "\n{} Finished {} (no tag)\n",
            style("✓").green(),
            result.profile
        ),
    }
}
