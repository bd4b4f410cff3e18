use std::fs;
use std::path::Path;

use release_bump::boundary::BoundaryWarning;
use release_bump::cli::{ReleaseWorkflow, ReleaseWorkflowArgs, WorkflowResult};
use release_bump::command::{CommandOutput, RecordingRunner};
use release_bump::config::{parse_config, Config};
use release_bump::domain::VersionValue;
use release_bump::error::{ReleaseError, Result};
use release_bump::formats::FormatRegistry;
use release_bump::git::{GitAction, MockRepository};
use release_bump::ui::ScriptedPrompter;

const IVY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ivy-module version="2.0">
    <info module="core" organisation="net.ooici" revision="1.2.0"/>
    <dependencies/>
</ivy-module>
"#;

const SETUP_PY: &str = "from setuptools import setup\n\nsetup(name='ioncore',\n    version = '0.3.1',\n    install_requires = [\n        'ionproto==0.2.0',\n    ],\n)\n";

const SHARED: &str = r#"
[deploy]
host = "releases.example.org"
root = "/var/www/releases"
group = "teamlead"

[formats.patterns]
setup-proto = "(?P<indent>\\s*)'ionproto[><=]=(?P<version>[^']+)'"

[formats.templates]
ivy-core = '<info module="core" organisation="net.ooici" revision="{major}.{minor}.{micro}"/>'
setup-proto-equal = "'ionproto=={major}.{minor}.{micro}',"
"#;

fn config_with(profiles: &str) -> Config {
    parse_config(&format!("{}{}", SHARED, profiles)).unwrap()
}

/// Locked java-style profile; the deploy login is configured
fn java_config(dir: &Path) -> Config {
    let mut config = config_with(&format!(
        r#"
[profiles.java]
description = "Java core library"
dir = '{}'
version = {{ mode = "locked", files = [{{ path = "ivy.xml", pattern = "ivy-revision" }}, {{ path = "build.properties", pattern = "build-property" }}] }}
build = [["ant", "clean"], ["ant", "ivy-publish-local"]]
deploy = [{{ pattern = "dist/*.tar.gz", recursive = false }}]
finalize = [
    {{ path = "ivy.xml", pattern = "ivy-revision", template = "ivy-core", version = "next-dev" }},
    {{ path = "build.properties", pattern = "build-property", template = "build-property-dev", version = "next-dev" }},
]
"#,
        dir.display()
    ));
    config.deploy.user = Some("alice".to_string());
    config
}

/// Prompted python-style profile; the deploy login is asked for
fn python_config(dir: &Path) -> Config {
    config_with(&format!(
        r#"
[profiles.python]
dir = '{}'
version = {{ mode = "prompt", current = {{ file = "setup.py", pattern = "setup-py" }} }}
prepare = [{{ path = "setup.py", pattern = "setup-py", template = "setup-py" }}]
build = [["python", "setup.py", "sdist"]]
deploy = [{{ pattern = "dist/*.tar.gz", recursive = false }}]
"#,
        dir.display()
    ))
}

fn java_workspace(ivy_revision: &str, build_version: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("ivy.xml"),
        IVY_XML.replace("1.2.0", ivy_revision),
    )
    .unwrap();
    fs::write(
        dir.path().join("build.properties"),
        format!("# core build\nversion={}\nsrc=src\n", build_version),
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("dist")).unwrap();
    fs::write(dir.path().join("dist/core-1.2.0.tar.gz"), "artifact").unwrap();
    dir
}

fn python_workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("setup.py"), SETUP_PY).unwrap();
    fs::create_dir_all(dir.path().join("dist")).unwrap();
    fs::write(dir.path().join("dist/ioncore-0.3.2.tar.gz"), "artifact").unwrap();
    dir
}

fn run(
    config: &Config,
    repo: &MockRepository,
    runner: &RecordingRunner,
    prompter: &ScriptedPrompter,
    profile: &str,
    dry_run: bool,
) -> Result<WorkflowResult> {
    let registry = FormatRegistry::from_config(&config.formats).unwrap();
    let mut workflow = ReleaseWorkflow::new(config, &registry, repo, runner, prompter);
    workflow.run(&ReleaseWorkflowArgs {
        profile: profile.to_string(),
        dry_run,
    })
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

fn fetched_only() -> Vec<GitAction> {
    vec![GitAction::FetchTags {
        remote: "origin".to_string(),
    }]
}

#[test]
fn test_locked_release_builds_deploys_bumps_and_tags() {
    let dir = java_workspace("1.2.0", "1.2.0");
    let config = java_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new([""]);

    let result = run(&config, &repo, &runner, &prompter, "java", false).unwrap();

    assert_eq!(result.version, Some(VersionValue::new(1, 2, 0)));
    assert_eq!(result.tag.as_deref(), Some("v1.2.0"));
    assert_eq!(result.commit.as_deref(), Some("abc1234"));
    assert_eq!(result.remote.as_deref(), Some("origin"));
    assert_eq!(
        result.uploaded,
        vec!["/var/www/releases/core-1.2.0.tar.gz".to_string()]
    );
    assert!(result.warnings.is_empty());

    assert_eq!(
        runner.command_lines(),
        vec![
            "ant clean",
            "ant ivy-publish-local",
            "scp dist/core-1.2.0.tar.gz alice@releases.example.org:/var/www/releases",
            "ssh alice@releases.example.org chmod 775 /var/www/releases/core-1.2.0.tar.gz",
            "ssh alice@releases.example.org chgrp teamlead /var/www/releases/core-1.2.0.tar.gz",
        ]
    );
    assert_eq!(runner.calls()[0].cwd.as_deref(), Some(dir.path()));

    assert_eq!(
        read(dir.path(), "build.properties"),
        "# core build\nversion=1.2.1-dev\nsrc=src\n"
    );
    assert_eq!(
        read(dir.path(), "ivy.xml"),
        IVY_XML.replace(
            r#"<info module="core" organisation="net.ooici" revision="1.2.0"/>"#,
            r#"<info module="core" organisation="net.ooici" revision="1.2.1"/>"#
        )
    );

    assert_eq!(
        repo.actions(),
        vec![
            GitAction::FetchTags {
                remote: "origin".to_string()
            },
            GitAction::Commit {
                message: "Release Version 1.2.0".to_string()
            },
            GitAction::Tag {
                name: "v1.2.0".to_string(),
                message: "Release Version 1.2.0".to_string(),
                commit: "abc1234".to_string()
            },
            GitAction::PushBranch {
                remote: "origin".to_string(),
                branch: "develop".to_string()
            },
            GitAction::PushTags {
                remote: "origin".to_string()
            },
        ]
    );
    assert_eq!(prompter.asked(), vec!["Please enter the git remote to use"]);
}

#[test]
fn test_locked_release_rejects_mismatched_files_before_any_write() {
    let dir = java_workspace("2.0.0", "2.0.1");
    let config = java_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new([""]);

    let err = run(&config, &repo, &runner, &prompter, "java", false).unwrap_err();

    assert!(matches!(err, ReleaseError::Consistency { .. }));
    assert!(err.to_string().contains("2.0.1"));
    assert_eq!(read(dir.path(), "ivy.xml"), IVY_XML.replace("1.2.0", "2.0.0"));
    assert_eq!(
        read(dir.path(), "build.properties"),
        "# core build\nversion=2.0.1\nsrc=src\n"
    );
    assert!(runner.calls().is_empty());
    assert_eq!(repo.actions(), fetched_only());
}

#[test]
fn test_locked_release_rejects_development_version() {
    let dir = java_workspace("1.2.0", "1.2.0-dev");
    let config = java_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new([""]);

    let err = run(&config, &repo, &runner, &prompter, "java", false).unwrap_err();

    match err {
        ReleaseError::Prerelease { path, suffix } => {
            assert_eq!(path, "build.properties");
            assert_eq!(suffix, "-dev");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(runner.calls().is_empty());
}

#[test]
fn test_missing_version_line_aborts_before_side_effects() {
    let dir = java_workspace("1.2.0", "1.2.0");
    fs::write(dir.path().join("README"), "no version here\n").unwrap();
    let mut config = java_config(dir.path());
    let profile = config.profiles.get_mut("java").unwrap();
    profile.finalize[1].path = "README".into();

    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new([""]);

    let err = run(&config, &repo, &runner, &prompter, "java", false).unwrap_err();

    match err {
        ReleaseError::NotFound { path, pattern } => {
            assert!(path.ends_with("README"));
            assert_eq!(pattern, "build-property");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(runner.calls().is_empty());
    assert_eq!(repo.actions(), fetched_only());
    assert_eq!(read(dir.path(), "README"), "no version here\n");
}

#[test]
fn test_dry_run_touches_nothing() {
    let dir = java_workspace("1.2.0", "1.2.0");
    let config = java_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new(Vec::<String>::new());

    let result = run(&config, &repo, &runner, &prompter, "java", true).unwrap();

    assert!(result.dry_run);
    assert_eq!(result.tag.as_deref(), Some("v1.2.0"));
    assert!(result.commit.is_none());
    assert!(result.files_written.is_empty());
    assert!(runner.calls().is_empty());
    assert_eq!(repo.actions(), fetched_only());
    assert!(prompter.asked().is_empty());
    assert_eq!(read(dir.path(), "ivy.xml"), IVY_XML);
}

#[test]
fn test_prompted_release_rewrites_setup_py() {
    let dir = python_workspace();
    let config = python_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new(["", "bob", ""]);

    let result = run(&config, &repo, &runner, &prompter, "python", false).unwrap();

    assert_eq!(result.version, Some(VersionValue::new(0, 3, 2)));
    assert_eq!(result.tag.as_deref(), Some("v0.3.2"));
    assert_eq!(
        read(dir.path(), "setup.py"),
        SETUP_PY.replace("version = '0.3.1',", "version = '0.3.2',")
    );
    assert_eq!(
        prompter.asked(),
        vec![
            "Please enter the new version (current is \"0.3.1\")",
            "Please enter your login name for releases.example.org",
            "Please enter the git remote to use",
        ]
    );
    assert_eq!(
        runner.command_lines()[..2],
        [
            "python setup.py sdist".to_string(),
            "scp dist/ioncore-0.3.2.tar.gz bob@releases.example.org:/var/www/releases".to_string(),
        ]
    );
    assert!(repo.actions().contains(&GitAction::Commit {
        message: "Release Version 0.3.2".to_string()
    }));
}

#[test]
fn test_prompted_release_retries_invalid_input() {
    let dir = python_workspace();
    let config = python_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new(["zero.four", "0.4.0", "bob", ""]);

    let result = run(&config, &repo, &runner, &prompter, "python", false).unwrap();

    assert_eq!(result.version, Some(VersionValue::new(0, 4, 0)));
    assert!(read(dir.path(), "setup.py").contains("    version = '0.4.0',\n"));
}

#[test]
fn test_prompted_release_declined_regression_writes_nothing() {
    let dir = python_workspace();
    let config = python_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new(["0.3.1", ""]);

    let err = run(&config, &repo, &runner, &prompter, "python", false).unwrap_err();

    assert!(matches!(err, ReleaseError::Aborted(_)));
    assert_eq!(read(dir.path(), "setup.py"), SETUP_PY);
    assert!(runner.calls().is_empty());
}

#[test]
fn test_prompted_release_confirmed_regression_is_reported() {
    let dir = python_workspace();
    let config = python_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new(["0.3.1", "y"]);

    let result = run(&config, &repo, &runner, &prompter, "python", true).unwrap();

    assert_eq!(result.version, Some(VersionValue::new(0, 3, 1)));
    assert_eq!(
        result.warnings,
        vec![BoundaryWarning::VersionNotHigher {
            entered: "0.3.1".to_string(),
            current: "0.3.1".to_string(),
        }]
    );
}

#[test]
fn test_prompted_release_at_micro_limit_writes_nothing() {
    let dir = python_workspace();
    let limit = SETUP_PY.replace("0.3.1", "0.3.18446744073709551615");
    fs::write(dir.path().join("setup.py"), &limit).unwrap();
    let config = python_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new([""]);

    let err = run(&config, &repo, &runner, &prompter, "python", false).unwrap_err();

    assert!(matches!(err, ReleaseError::Format { .. }));
    assert_eq!(read(dir.path(), "setup.py"), limit);
    assert!(prompter.asked().is_empty());
    assert!(runner.calls().is_empty());
}

#[test]
fn test_wrong_branch_aborts() {
    let dir = java_workspace("1.2.0", "1.2.0");
    let config = java_config(dir.path());
    let repo = MockRepository::new("master");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new([""]);

    let err = run(&config, &repo, &runner, &prompter, "java", false).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Aborted: You must be in the \"develop\" branch (you are in \"master\")."
    );
    assert!(repo.actions().is_empty());
}

#[test]
fn test_dirty_tree_aborts() {
    let dir = java_workspace("1.2.0", "1.2.0");
    let config = java_config(dir.path());
    let repo = MockRepository::new("develop").with_changes();
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new([""]);

    let err = run(&config, &repo, &runner, &prompter, "java", false).unwrap_err();

    assert!(matches!(err, ReleaseError::Aborted(_)));
    assert!(repo.actions().is_empty());
    assert!(runner.calls().is_empty());
}

#[test]
fn test_behind_upstream_needs_confirmation() {
    let dir = java_workspace("1.2.0", "1.2.0");
    let config = java_config(dir.path());
    let runner = RecordingRunner::new();

    let declined = ScriptedPrompter::new([""]);
    let repo = MockRepository::new("develop").with_commits_behind(3);
    let err = run(&config, &repo, &runner, &declined, "java", false).unwrap_err();
    assert!(matches!(err, ReleaseError::Aborted(_)));
    assert!(repo.actions().is_empty());

    let accepted = ScriptedPrompter::new(["y"]);
    let repo = MockRepository::new("develop").with_commits_behind(3);
    let result = run(&config, &repo, &runner, &accepted, "java", true).unwrap();
    assert_eq!(
        result.warnings,
        vec![BoundaryWarning::CommitsBehind {
            branch: "develop".to_string(),
            count: 3
        }]
    );
}

#[test]
fn test_unknown_remote_aborts_before_build() {
    let dir = java_workspace("1.2.0", "1.2.0");
    let config = java_config(dir.path());
    let repo = MockRepository::new("develop").with_remotes(["ooici", "upstream"]);
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new(["nowhere"]);

    let err = run(&config, &repo, &runner, &prompter, "java", false).unwrap_err();

    assert!(err.to_string().contains("\"nowhere\" is not a configured remote"));
    assert!(runner.calls().is_empty());
    assert_eq!(
        repo.actions(),
        vec![GitAction::FetchTags {
            remote: "ooici".to_string()
        }]
    );
    assert_eq!(read(dir.path(), "build.properties"), "# core build\nversion=1.2.0\nsrc=src\n");
}

#[test]
fn test_no_remotes_is_fatal() {
    let dir = java_workspace("1.2.0", "1.2.0");
    let config = java_config(dir.path());
    let repo = MockRepository::new("develop").with_remotes(Vec::<String>::new());
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new([""]);

    let err = run(&config, &repo, &runner, &prompter, "java", false).unwrap_err();

    assert!(matches!(err, ReleaseError::Aborted(_)));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_dependency_version_pinned_without_tag() {
    let dir = python_workspace();
    let config = config_with(&format!(
        r#"
[profiles.pin]
dir = '{}'
tag = false
dependency = {{ command = ["proto-version"] }}
prepare = [
    {{ path = "setup.py", pattern = "setup-proto", template = "setup-proto-equal", version = "dependency" }},
    {{ path = "PROTO_VERSION", template = "short", version = "dependency" }},
]
"#,
        dir.path().display()
    ));
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    runner.respond("proto-version", CommandOutput::success("0.4.1\n"));
    let prompter = ScriptedPrompter::new(Vec::<String>::new());

    let result = run(&config, &repo, &runner, &prompter, "pin", false).unwrap();

    assert!(result.version.is_none());
    assert!(result.tag.is_none());
    assert_eq!(
        read(dir.path(), "setup.py"),
        SETUP_PY.replace("'ionproto==0.2.0',", "'ionproto==0.4.1',")
    );
    assert_eq!(read(dir.path(), "PROTO_VERSION"), "0.4.1");
    assert_eq!(repo.actions(), fetched_only());
}

#[test]
fn test_failed_build_stops_before_deploy_and_tag() {
    let dir = java_workspace("1.2.0", "1.2.0");
    let config = java_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    runner.respond("ant", CommandOutput::failure(1, "BUILD FAILED"));
    let prompter = ScriptedPrompter::new([""]);

    let err = run(&config, &repo, &runner, &prompter, "java", false).unwrap_err();

    assert!(matches!(err, ReleaseError::Command(_)));
    assert_eq!(runner.command_lines(), vec!["ant clean"]);
    assert_eq!(repo.actions(), fetched_only());
    assert_eq!(read(dir.path(), "build.properties"), "# core build\nversion=1.2.0\nsrc=src\n");
}

#[test]
fn test_unknown_profile() {
    let dir = java_workspace("1.2.0", "1.2.0");
    let config = java_config(dir.path());
    let repo = MockRepository::new("develop");
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new(Vec::<String>::new());

    let err = run(&config, &repo, &runner, &prompter, "cobol", false).unwrap_err();
    assert!(matches!(err, ReleaseError::Config(_)));
}
