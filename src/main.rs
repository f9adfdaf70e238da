use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use git_nextver::cache::ResultCache;
use git_nextver::config;
use git_nextver::engine::VersionEngine;
use git_nextver::git::repository::DETACHED_HEAD;
use git_nextver::git::{Git2Repository, SnapshotSource};
use git_nextver::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Parser)]
#[command(
    name = "git-nextver",
    version,
    about = "Compute the next semantic version from git history"
)]
struct Args {
    #[arg(short, long, default_value = ".", help = "Repository path")]
    path: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Version as if HEAD were on this branch")]
    branch: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    output: OutputFormat,

    #[arg(long, value_name = "NAME", help = "Print a single variable, e.g. SemVer")]
    show_variable: Option<String>,

    #[arg(long, help = "Neither read nor write the result cache")]
    no_cache: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Verbose logging (-vv for trace)")]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("git_nextver=debug"),
        _ => EnvFilter::new("git_nextver=trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let mut engine = VersionEngine::new(&config).context("Invalid configuration")?;

    let mut repo = Git2Repository::open(&args.path)
        .with_context(|| format!("No git repository at {}", args.path.display()))?;
    if let Some(branch) = &args.branch {
        repo = repo.with_branch(branch.clone());
    }
    if !args.no_cache {
        engine = engine.with_cache(ResultCache::in_git_dir(repo.git_dir()));
    }

    let snapshot = repo.snapshot().context("Failed to read repository")?;
    if snapshot.branch_name() == DETACHED_HEAD {
        ui::display_warning("HEAD is detached; pass --branch to pick the branch configuration");
    }

    let result = engine.compute(&snapshot)?;

    let rendered = match (&args.show_variable, args.output) {
        (Some(name), _) => ui::format_variable(&result, name)?,
        (None, OutputFormat::Json) => ui::format_json(&result)?,
        (None, OutputFormat::Text) => ui::format_text(&result),
    };
    println!("{}", rendered);
    Ok(())
}
