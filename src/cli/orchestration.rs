//! Release workflow orchestration
//!
//! Drives one release profile: repository checks, version selection, file
//! updates, build, deployment and tagging. Every local validation runs
//! before the first file write, build command, upload or tag.

use std::path::{Path, PathBuf};

use crate::boundary::BoundaryWarning;
use crate::command::{run_checked, CommandRunner, CommandSpec};
use crate::config::{
    Config, FileUpdateConfig, ProfileConfig, VersionPolicyConfig, VersionRef,
    VersionSourceConfig,
};
use crate::deploy;
use crate::domain::VersionValue;
use crate::error::{ReleaseError, Result};
use crate::formats::FormatRegistry;
use crate::git::{preferred_remote, Repository};
use crate::policy;
use crate::rewrite::{RewriteBatch, VersionFile};
use crate::ui::{self, Prompter};

/// Arguments for the release workflow
///
/// Mirrors the CLI arguments so the workflow can be called without clap.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Name of the profile to release
    pub profile: String,

    /// Preview mode - stop after validation and planning
    pub dry_run: bool,
}

/// What a release is going to do, computed before any side effect
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePlan {
    pub profile: String,
    pub version: Option<VersionValue>,
    pub dependency: Option<VersionValue>,
    pub prepare: Vec<PathBuf>,
    pub build: Vec<String>,
    pub deploy: Vec<String>,
    pub finalize: Vec<PathBuf>,
    pub tag: Option<String>,
    pub remote: Option<String>,
}

/// Result of a finished (or previewed) release
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub profile: String,
    pub version: Option<VersionValue>,
    pub tag: Option<String>,
    pub commit: Option<String>,
    pub remote: Option<String>,
    pub files_written: Vec<PathBuf>,
    pub uploaded: Vec<String>,
    pub warnings: Vec<BoundaryWarning>,
    pub dry_run: bool,
}

/// Release workflow over injected collaborators
pub struct ReleaseWorkflow<'a, R: Repository, C: CommandRunner, P: Prompter> {
    config: &'a Config,
    registry: &'a FormatRegistry,
    repo: &'a R,
    runner: &'a C,
    prompter: &'a P,
    deploy_user: Option<String>,
    warnings: Vec<BoundaryWarning>,
}

impl<'a, R: Repository, C: CommandRunner, P: Prompter> ReleaseWorkflow<'a, R, C, P> {
    pub fn new(
        config: &'a Config,
        registry: &'a FormatRegistry,
        repo: &'a R,
        runner: &'a C,
        prompter: &'a P,
    ) -> Self {
        ReleaseWorkflow {
            config,
            registry,
            repo,
            runner,
            prompter,
            deploy_user: config.deploy.user.clone(),
            warnings: Vec::new(),
        }
    }

    /// Run the release for `args.profile`
    pub fn run(&mut self, args: &ReleaseWorkflowArgs) -> Result<WorkflowResult> {
        let config = self.config;
        let profile = config.profile(&args.profile)?;
        validate_profile(&args.profile, profile, config, self.registry)?;
        let base = profile.dir.as_path();

        ui::display_intro(
            &args.profile,
            profile.description.as_deref(),
            &config.git.release_branch,
        );
        tracing::info!(profile = %args.profile, dir = %base.display(), "starting release");

        self.ensure_clean()?;

        let dependency = match &profile.dependency {
            Some(source) => Some(self.read_source(base, source)?),
            None => None,
        };
        let version = self.resolve_release_version(base, &profile.version)?;
        if let Some(version) = &version {
            ui::display_status(&format!("Releasing version {}", version));
        }

        let prepare =
            self.stage_updates(base, &profile.prepare, version.as_ref(), dependency.as_ref())?;
        self.check_update_targets(base, &profile.finalize, &prepare)?;

        if !profile.deploy.is_empty() && !args.dry_run {
            self.resolve_deploy_user()?;
        }

        let tag = match (&version, profile.tag) {
            (Some(version), true) => Some(self.registry.tag_name(version)?),
            _ => None,
        };
        let remote = match &tag {
            Some(_) if !args.dry_run => Some(self.select_remote()?),
            _ => None,
        };

        let plan = ReleasePlan {
            profile: args.profile.clone(),
            version: version.clone(),
            dependency: dependency.clone(),
            prepare: prepare.paths().map(Path::to_path_buf).collect(),
            build: profile.build.iter().map(|argv| argv.join(" ")).collect(),
            deploy: profile.deploy.iter().map(|d| d.pattern.clone()).collect(),
            finalize: profile.finalize.iter().map(|u| base.join(&u.path)).collect(),
            tag: tag.clone(),
            remote: remote.clone(),
        };
        ui::display_plan(&plan);

        let mut result = WorkflowResult {
            profile: args.profile.clone(),
            version: version.clone(),
            tag: tag.clone(),
            commit: None,
            remote: remote.clone(),
            files_written: Vec::new(),
            uploaded: Vec::new(),
            warnings: Vec::new(),
            dry_run: args.dry_run,
        };

        if args.dry_run {
            ui::display_status("Dry run: no files, builds, uploads or tags were touched");
            result.warnings = std::mem::take(&mut self.warnings);
            return Ok(result);
        }

        result.files_written.extend(prepare.persist()?);

        for argv in &profile.build {
            let spec = CommandSpec::from_argv(argv)?.current_dir(base);
            ui::display_status(&format!("Running: {}", spec));
            run_checked(self.runner, &spec)?;
        }

        for entry in &profile.deploy {
            let user = self.resolve_deploy_user()?;
            let plan = deploy::plan_deploy(base, &config.deploy, &user, entry)?;
            ui::display_status(&format!("Deploying {} to {}", entry.pattern, plan.host));
            for warning in deploy::deploy(self.runner, &plan)? {
                self.warn(warning);
            }
            result.uploaded.extend(plan.remote_paths);
        }

        let finalize =
            self.stage_updates(base, &profile.finalize, version.as_ref(), dependency.as_ref())?;
        result.files_written.extend(finalize.persist()?);

        if let (Some(version), Some(tag), Some(remote)) = (&version, &tag, &remote) {
            result.commit = Some(self.tag_release(version, tag, remote)?);
        }

        result.warnings = std::mem::take(&mut self.warnings);
        tracing::info!(profile = %args.profile, tag = ?result.tag, "release finished");
        Ok(result)
    }

    fn warn(&mut self, warning: BoundaryWarning) {
        ui::display_boundary_warning(&warning);
        self.warnings.push(warning);
    }

    /// Release branch checked out, no tracked modifications, not behind upstream
    /// (unless confirmed), tags fetched
    fn ensure_clean(&mut self) -> Result<()> {
        let config = self.config;
        let git = &config.git;

        let branch = self.repo.current_branch()?;
        if branch != git.release_branch {
            return Err(ReleaseError::aborted(format!(
                "You must be in the \"{}\" branch (you are in \"{}\").",
                git.release_branch, branch
            )));
        }

        if git.require_clean && self.repo.has_tracked_changes()? {
            return Err(ReleaseError::aborted(
                "You have local git modifications, please revert or commit first.",
            ));
        }

        let behind = self.repo.commits_behind()?;
        if behind > 0 {
            self.warn(BoundaryWarning::CommitsBehind {
                branch: branch.clone(),
                count: behind,
            });
            if !self
                .prompter
                .confirm("Are you SURE you want to release this version?", false)?
            {
                return Err(ReleaseError::aborted(
                    "Local is behind its upstream, please try again.",
                ));
            }
        }

        let remotes = self.repo.list_remotes()?;
        if let Some(remote) = preferred_remote(&remotes, &git.preferred_remotes) {
            self.repo.fetch_tags(remote)?;
        }
        Ok(())
    }

    fn read_source(&self, base: &Path, source: &VersionSourceConfig) -> Result<VersionValue> {
        match source {
            VersionSourceConfig::File { file, pattern } => {
                let pattern = self.registry.pattern(pattern)?;
                VersionFile::read(base.join(file))?.current_version(pattern)
            }
            VersionSourceConfig::Command { command, dir } => {
                let dir = dir.as_ref().map_or_else(|| base.to_path_buf(), |d| base.join(d));
                let spec = CommandSpec::from_argv(command)?.current_dir(&dir);
                let output = run_checked(self.runner, &spec)?;
                let text = output.stdout.trim();
                tracing::debug!(command = %spec, version = text, "read version from command");
                VersionValue::parse(text).map_err(|_| ReleaseError::InvalidVersionInFile {
                    path: format!("output of '{}'", spec),
                    pattern: "version".to_string(),
                    text: text.to_string(),
                })
            }
        }
    }

    fn resolve_release_version(
        &mut self,
        base: &Path,
        policy_config: &VersionPolicyConfig,
    ) -> Result<Option<VersionValue>> {
        match policy_config {
            VersionPolicyConfig::None => Ok(None),
            VersionPolicyConfig::Prompt { current } => {
                let current = self.read_source(base, current)?;
                let prompter = self.prompter;
                let max_attempts = self.config.prompt.max_attempts;
                let chosen = policy::choose_release_version(
                    prompter,
                    &current,
                    max_attempts,
                    &mut |warning| self.warn(warning),
                )?;
                Ok(Some(chosen))
            }
            VersionPolicyConfig::Locked { files } => {
                let mut versions = Vec::with_capacity(files.len());
                for file in files {
                    let path = base.join(&file.path);
                    let pattern = self.registry.pattern(&file.pattern)?;
                    let version = VersionFile::read(&path)?.current_version(pattern)?;
                    versions.push((file.path.display().to_string(), version));
                }
                let agreed = policy::ensure_consistent(&versions, &mut |warning| self.warn(warning))?;
                for (label, version) in &versions {
                    policy::ensure_release_build(label, version)?;
                }
                Ok(Some(agreed))
            }
        }
    }

    fn stage_updates(
        &self,
        base: &Path,
        updates: &[FileUpdateConfig],
        release: Option<&VersionValue>,
        dependency: Option<&VersionValue>,
    ) -> Result<RewriteBatch> {
        let mut batch = RewriteBatch::new();
        for update in updates {
            let version = version_for(update.version, release, dependency)?;
            let template = self.registry.template(&update.template)?;
            let path = base.join(&update.path);
            match &update.pattern {
                Some(pattern) => {
                    let pattern = self.registry.pattern(pattern)?;
                    batch.stage_rewrite(&path, pattern, template, &version)?;
                }
                None => batch.stage_contents(&path, template, &version),
            }
        }
        Ok(batch)
    }

    /// Locate every later rewrite now, so a missing version line aborts
    /// before anything is written
    fn check_update_targets(
        &self,
        base: &Path,
        updates: &[FileUpdateConfig],
        staged: &RewriteBatch,
    ) -> Result<()> {
        for update in updates {
            let Some(pattern) = &update.pattern else {
                continue;
            };
            let pattern = self.registry.pattern(pattern)?;
            let path = base.join(&update.path);
            let file = match staged.staged_text(&path) {
                Some(text) => VersionFile::new(path.clone(), text),
                None => VersionFile::read(&path)?,
            };
            file.locate(pattern)?;
        }
        Ok(())
    }

    fn resolve_deploy_user(&mut self) -> Result<String> {
        if let Some(user) = &self.deploy_user {
            return Ok(user.clone());
        }
        let default = std::env::var("USER").ok();
        let user = self.prompter.input(
            &format!("Please enter your login name for {}", self.config.deploy.host),
            default.as_deref(),
        )?;
        self.deploy_user = Some(user.clone());
        Ok(user)
    }

    fn select_remote(&self) -> Result<String> {
        let remotes = self.repo.list_remotes()?;
        let default = preferred_remote(&remotes, &self.config.git.preferred_remotes)
            .ok_or_else(|| ReleaseError::aborted("You have no configured git remotes."))?;

        let remote = self
            .prompter
            .input("Please enter the git remote to use", Some(default))?;
        if !remotes.contains(&remote) {
            return Err(ReleaseError::aborted(format!(
                "\"{}\" is not a configured remote.",
                remote
            )));
        }
        Ok(remote)
    }

    fn tag_release(&self, version: &VersionValue, tag: &str, remote: &str) -> Result<String> {
        let message = self.registry.tag_message(version)?;
        let branch = &self.config.git.release_branch;

        let commit = self.repo.commit_all(&message)?;
        self.repo.create_annotated_tag(tag, &message, &commit)?;
        ui::display_success(&format!("Created tag {} at {}", tag, commit));

        self.repo.push_branch(remote, branch)?;
        self.repo.push_tags(remote)?;
        ui::display_success(&format!("Pushed {} and tags to {}", branch, remote));
        Ok(commit)
    }
}

fn version_for(
    version: VersionRef,
    release: Option<&VersionValue>,
    dependency: Option<&VersionValue>,
) -> Result<VersionValue> {
    let resolved = match version {
        VersionRef::Release => release.cloned(),
        VersionRef::NextDev => release.map(policy::propose_next).transpose()?,
        VersionRef::Dependency => dependency.cloned(),
    };
    resolved.ok_or_else(|| {
        ReleaseError::config(format!("No {:?} version available for file update", version))
    })
}

/// Check that every name a profile uses exists in the registry and that
/// version references can be satisfied
pub fn validate_profile(
    name: &str,
    profile: &ProfileConfig,
    config: &Config,
    registry: &FormatRegistry,
) -> Result<()> {
    let context = |e: ReleaseError| match e {
        ReleaseError::Config(msg) => ReleaseError::config(format!("profile '{}': {}", name, msg)),
        other => other,
    };

    let has_release = !matches!(profile.version, VersionPolicyConfig::None);
    match &profile.version {
        VersionPolicyConfig::Prompt {
            current: VersionSourceConfig::File { pattern, .. },
        } => {
            registry.pattern(pattern).map_err(context)?;
        }
        VersionPolicyConfig::Locked { files } => {
            if files.is_empty() {
                return Err(context(ReleaseError::config("locked mode needs at least one file")));
            }
            for file in files {
                registry.pattern(&file.pattern).map_err(context)?;
            }
        }
        _ => {}
    }

    for update in profile.prepare.iter().chain(&profile.finalize) {
        registry.template(&update.template).map_err(context)?;
        if let Some(pattern) = &update.pattern {
            registry.pattern(pattern).map_err(context)?;
        }
        let satisfiable = match update.version {
            VersionRef::Release | VersionRef::NextDev => has_release,
            VersionRef::Dependency => profile.dependency.is_some(),
        };
        if !satisfiable {
            return Err(context(ReleaseError::config(format!(
                "update of {} needs a {:?} version the profile does not provide",
                update.path.display(),
                update.version
            ))));
        }
    }

    for argv in &profile.build {
        if argv.is_empty() {
            return Err(context(ReleaseError::config("empty build command")));
        }
    }

    if !profile.deploy.is_empty() && config.deploy.host.is_empty() {
        return Err(context(ReleaseError::config("deploy.host is not configured")));
    }

    Ok(())
}
