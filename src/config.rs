use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};

/// File name looked up in the current directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "releasebump.toml";

/// Represents the complete configuration for release-bump.
///
/// Contains git preconditions, prompt behavior, the deployment target, extra
/// version formats and the release profiles.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub deploy: DeployTargetConfig,

    #[serde(default)]
    pub formats: FormatsConfig,

    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

fn default_release_branch() -> String {
    "develop".to_string()
}

fn default_preferred_remotes() -> Vec<String> {
    vec!["origin".to_string()]
}

fn default_true() -> bool {
    true
}

/// Preconditions checked against the repository before a release.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_release_branch")]
    pub release_branch: String,

    /// Remotes offered as the default at the remote prompt, in order of preference.
    #[serde(default = "default_preferred_remotes")]
    pub preferred_remotes: Vec<String>,

    #[serde(default = "default_true")]
    pub require_clean: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            release_branch: default_release_branch(),
            preferred_remotes: default_preferred_remotes(),
            require_clean: true,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PromptConfig {
    /// How many invalid version entries are tolerated before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        PromptConfig {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_mode() -> String {
    "775".to_string()
}

/// Remote host receiving release artifacts.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeployTargetConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub root: String,

    /// Login on the host; prompted once per run when absent.
    #[serde(default)]
    pub user: Option<String>,

    /// Group applied to uploaded files with chgrp, if any.
    #[serde(default)]
    pub group: Option<String>,

    #[serde(default = "default_mode")]
    pub mode: String,
}

impl Default for DeployTargetConfig {
    fn default() -> Self {
        DeployTargetConfig {
            host: String::new(),
            root: String::new(),
            user: None,
            group: None,
            mode: default_mode(),
        }
    }
}

/// Extra or overriding patterns and templates, merged over the built-ins.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct FormatsConfig {
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,

    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

/// One releasable project.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProfileConfig {
    #[serde(default)]
    pub description: Option<String>,

    /// Project directory, relative to where release-bump is run.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    #[serde(default)]
    pub version: VersionPolicyConfig,

    /// Version of another project pinned into this one during the release.
    #[serde(default)]
    pub dependency: Option<VersionSourceConfig>,

    /// File updates applied before building.
    #[serde(default)]
    pub prepare: Vec<FileUpdateConfig>,

    /// Build commands, run in order from the project directory.
    #[serde(default)]
    pub build: Vec<Vec<String>>,

    #[serde(default)]
    pub deploy: Vec<DeployConfig>,

    /// File updates applied after deployment and before tagging.
    #[serde(default)]
    pub finalize: Vec<FileUpdateConfig>,

    #[serde(default = "default_true")]
    pub tag: bool,
}

/// How the release version is chosen.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum VersionPolicyConfig {
    /// Read the current version, propose the next micro and let the operator override it.
    Prompt { current: VersionSourceConfig },
    /// Release exactly the version found in the files; they must agree and carry no suffix.
    Locked { files: Vec<VersionFileConfig> },
    /// No version handling and no tag.
    #[default]
    None,
}

/// Where a version is read from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum VersionSourceConfig {
    File {
        file: PathBuf,
        pattern: String,
    },
    Command {
        command: Vec<String>,
        #[serde(default)]
        dir: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionFileConfig {
    pub path: PathBuf,
    pub pattern: String,
}

/// Which version a file update renders.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VersionRef {
    #[default]
    Release,
    /// Release version with micro incremented, for the next development cycle.
    NextDev,
    Dependency,
}

/// Rewrite of one version line, or of the whole file when `pattern` is absent.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FileUpdateConfig {
    pub path: PathBuf,

    #[serde(default)]
    pub pattern: Option<String>,

    pub template: String,

    #[serde(default)]
    pub version: VersionRef,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeployConfig {
    /// Artifact path; the last component may contain `*`.
    pub pattern: String,

    /// Appended to the deploy root on the remote host.
    #[serde(default)]
    pub subdir: String,

    #[serde(default = "default_true")]
    pub recursive: bool,
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&ProfileConfig> {
        self.profiles.get(name).ok_or_else(|| {
            ReleaseError::config(format!("Profile '{}' is not configured", name))
        })
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releasebump.toml` in current directory
/// 3. `release-bump/releasebump.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => match find_config_file() {
            Some(path) => path,
            None => {
                tracing::debug!("no configuration file found, using defaults");
                return Ok(Config::default());
            }
        },
    };

    tracing::debug!(path = %path.display(), "loading configuration");
    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&config_str)
        .map_err(|e| ReleaseError::config(format!("{}: {}", path.display(), e)))
}

/// Parse configuration text.
pub fn parse_config(text: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(text)
}

fn find_config_file() -> Option<PathBuf> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("release-bump").join(CONFIG_FILE_NAME);
    user.exists().then_some(user)
}
