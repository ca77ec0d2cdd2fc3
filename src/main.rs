mod commands;
mod error;
mod github;
mod select;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gh-comment-update")]
#[command(about = "Update your own issue or pull request comment found by regexp")]
#[command(version)]
struct Cli {
    /// Issue or PR number
    #[arg(long)]
    issue: Option<u64>,

    /// Search first matched comment by regexp
    #[arg(long)]
    regexp: Option<String>,

    /// Update body text
    #[arg(long)]
    body: Option<String>,

    /// Specify a repository ([HOST/]OWNER/REPO). If omitted, uses current repository
    #[arg(long, env = "GH_REPO")]
    repo: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // help and version go to stdout and are not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing();

    let result = commands::update::run(
        cli.issue.unwrap_or_default(),
        cli.regexp.as_deref().unwrap_or_default(),
        cli.body.as_deref().unwrap_or_default(),
        cli.repo.as_deref(),
    )
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gh-comment-update failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
