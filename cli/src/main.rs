//! CLI for the pls release synchronizer.
//!
//! Keeps a single release pull request in sync with the conventional-commit
//! history of a base branch.

use clap::{Args, Parser, Subcommand};
use pls::{
    load_settings, parse_repository, require_setting, resolve_setting, DebugEntry, GitHubStore,
    Plan, ReleaseSynchronizer, Stage, SyncConfig, SyncError, SyncOutcome, SyncRequest,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// pls - Release pull requests driven by conventional commits.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or refresh the release pull request.
    Sync(SyncArgs),
}

#[derive(Args, Debug)]
struct SyncArgs {
    /// Repository as owner/name [env: GITHUB_REPOSITORY].
    #[arg(long)]
    repo: Option<String>,

    /// GitHub token [env: GITHUB_TOKEN].
    #[arg(long)]
    token: Option<String>,

    /// Branch releases are cut from [env: PLS_BASE_BRANCH, default: main].
    #[arg(long)]
    base: Option<String>,

    /// Branch backing the release pull request [env: PLS_RELEASE_BRANCH, default: pls-release].
    #[arg(long)]
    release_branch: Option<String>,

    /// Path to the settings file.
    #[arg(long, default_value = "pls.toml")]
    config: PathBuf,

    /// Project manifest carrying the version.
    #[arg(long, default_value = "package.json")]
    project_manifest: String,

    /// Versions manifest path.
    #[arg(long, default_value = ".pls/versions.json")]
    versions_manifest: String,

    /// Move into or through a prerelease stage (alpha, beta, rc, stable).
    #[arg(long)]
    transition: Option<Stage>,

    /// Print what would change without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Append an entry to the debug log in the pull request body.
    #[arg(long)]
    debug_log: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    // octocrab talks TLS through rustls; pick the provider before any request.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Sync(args) => run_sync(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with compact output, filtered by `RUST_LOG`
/// (defaults to "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Resolves settings at the process boundary and runs one synchronization.
async fn run_sync(args: SyncArgs) -> Result<(), SyncError> {
    let repository = require_setting(args.repo.as_deref(), "GITHUB_REPOSITORY", "repo")?;
    let (owner, name) = parse_repository(&repository)?;
    let token = require_setting(args.token.as_deref(), "GITHUB_TOKEN", "token")?;
    let base = resolve_setting(args.base.as_deref(), "PLS_BASE_BRANCH", Some("main"))
        .unwrap_or_else(|| "main".to_string());
    let release_branch = resolve_setting(
        args.release_branch.as_deref(),
        "PLS_RELEASE_BRANCH",
        Some("pls-release"),
    )
    .unwrap_or_else(|| "pls-release".to_string());

    let config = SyncConfig::new(&base, &release_branch)?
        .with_project_manifest(args.project_manifest)
        .with_versions_manifest(args.versions_manifest)
        .with_settings(load_settings(&args.config)?);

    let store = GitHubStore::new(&token, owner, name)?;
    let synchronizer = ReleaseSynchronizer::with_backend(&store, config);

    let mut request = SyncRequest::new();
    if let Some(stage) = args.transition {
        request = request.with_transition(stage);
    }
    if args.debug_log {
        let command = if args.dry_run { "pls sync --dry-run" } else { "pls sync" };
        request = request.with_debug_entry(DebugEntry::new(command));
    }

    if args.dry_run {
        let plan = synchronizer.plan(&request).await?;
        print_plan(&plan);
    } else {
        let outcome = synchronizer.sync(&request).await?;
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_plan(plan: &Plan) {
    match plan {
        Plan::NoOp { reason } => println!("\n[DRY RUN] Nothing to release: {reason}"),
        Plan::Release(plan) => {
            println!("\n[DRY RUN] Release v{}", plan.version);
            println!("  From: v{}", plan.bump.from);
            println!("  Computed: v{} ({})", plan.bump.to, plan.bump.bump_type);
            if plan.is_user_selection() {
                println!("  Keeping version selected in the pull request");
            }
            println!("  Title: {}", plan.title);
            match &plan.existing {
                Some(pr) => println!("  Would update pull request #{}", pr.number),
                None => println!("  Would open a pull request"),
            }
            for change in &plan.changes {
                println!("  Would write: {}", change.path);
            }
            println!("\n{}", plan.body);
        }
    }
}

fn print_outcome(outcome: &SyncOutcome) {
    println!("\nSummary:");
    println!("  Result: {}", outcome.as_str());
    match outcome {
        SyncOutcome::NoOp { reason } => println!("  Reason: {reason}"),
        SyncOutcome::Created { number, url, version } => {
            println!("  Version: v{version}");
            println!("  Pull request: #{number} {url}");
        }
        SyncOutcome::Updated {
            number,
            url,
            version,
            selection_changed,
        } => {
            println!("  Version: v{version}");
            println!("  Pull request: #{number} {url}");
            println!("  Version changed: {}", if *selection_changed { "yes" } else { "no" });
        }
    }
}
