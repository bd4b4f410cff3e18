use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use release_bump::cli::{ReleaseWorkflow, ReleaseWorkflowArgs};
use release_bump::command::SystemRunner;
use release_bump::config::{self, Config};
use release_bump::domain::VersionValue;
use release_bump::formats::FormatRegistry;
use release_bump::git::Git2Repository;
use release_bump::rewrite::VersionFile;
use release_bump::ui::{self, ConsolePrompter, DefaultsPrompter, Prompter};

#[derive(Parser)]
#[command(
    name = "release-bump",
    version,
    about = "Bump version strings across project files, build, deploy and tag a release"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More log output (-v, -vv)")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the release workflow of a profile
    Release {
        profile: String,

        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,

        #[arg(short, long, help = "Accept every default and confirm every question")]
        yes: bool,
    },
    /// Show the configured release profiles
    List,
    /// Print the version found in a file
    Current { file: PathBuf, pattern: String },
    /// Rewrite the version line of a file
    Set {
        file: PathBuf,
        pattern: String,
        template: String,
        version: String,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("release_bump={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose > 1)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let registry = FormatRegistry::from_config(&config.formats)?;

    match args.command {
        Command::Release {
            profile,
            dry_run,
            yes,
        } => {
            if yes {
                release(&config, &registry, &profile, dry_run, &DefaultsPrompter { assume_yes: true })
            } else {
                release(&config, &registry, &profile, dry_run, &ConsolePrompter::new())
            }
        }
        Command::List => {
            if config.profiles.is_empty() {
                anyhow::bail!("No profiles configured in {}", config::CONFIG_FILE_NAME);
            }
            ui::display_profiles(
                config
                    .profiles
                    .iter()
                    .map(|(name, profile)| (name.as_str(), profile.description.as_deref())),
            );
            ui::display_formats(registry.pattern_names(), registry.template_names());
            Ok(())
        }
        Command::Current { file, pattern } => {
            let pattern = registry.pattern(&pattern)?;
            let version = VersionFile::read(&file)?.current_version(pattern)?;
            println!("{}", version);
            Ok(())
        }
        Command::Set {
            file,
            pattern,
            template,
            version,
        } => {
            let pattern = registry.pattern(&pattern)?;
            let template = registry.template(&template)?;
            let version = VersionValue::parse(&version)?;

            let original = VersionFile::read(&file)?;
            let rewrite = original.rewrite(pattern, template, &version)?;
            if rewrite.is_noop(&original) {
                ui::display_status(&format!("{} already up to date", file.display()));
            } else {
                rewrite.persist()?;
                ui::display_success(&format!(
                    "{}: {}",
                    file.display(),
                    rewrite.new_line.trim_end()
                ));
            }
            Ok(())
        }
    }
}

fn release<P: Prompter>(
    config: &Config,
    registry: &FormatRegistry,
    profile: &str,
    dry_run: bool,
    prompter: &P,
) -> Result<()> {
    let dir = &config.profile(profile)?.dir;
    let repo = Git2Repository::open(dir)
        .with_context(|| format!("Git repository error in {}", dir.display()))?;
    let runner = SystemRunner;

    let mut workflow = ReleaseWorkflow::new(config, registry, &repo, &runner, prompter);
    let result = workflow.run(&ReleaseWorkflowArgs {
        profile: profile.to_string(),
        dry_run,
    })?;

    if !result.dry_run {
        ui::display_result(&result);
    }
    Ok(())
}
