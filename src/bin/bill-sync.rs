use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use cfe_bill_sync::clipboard::{ClipboardSink, NoClipboard, SystemClipboard};
use cfe_bill_sync::github::{DEFAULT_API_BASE, DEFAULT_REMOTE_DIR};
use cfe_bill_sync::pipeline::{self, DEFAULT_CUSTOMER_NAME, SyncConfig, SyncOutcome};
use cfe_bill_sync::{ExtractOptions, PageSelection, ReportMode};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bill-sync",
    version,
    about = "Convert a CFE bill PDF to CSV and publish it to a GitHub repository"
)]
struct Cli {
    /// Local PDF path or http(s) URL to download.
    pdf_path_or_url: String,

    /// Destination repository as owner/name.
    repository: String,

    /// Branch to commit to.
    branch: String,

    /// GitHub token with contents write access.
    token: String,

    /// Name used in the copied consumption summary.
    #[arg(default_value = DEFAULT_CUSTOMER_NAME)]
    customer_name: String,

    /// Directory downloaded PDFs and their CSVs are written to.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// GitHub API base URL.
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_url: String,

    /// Repository directory the CSV is uploaded into.
    #[arg(long, default_value = DEFAULT_REMOTE_DIR)]
    remote_dir: String,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// Write one CSV row per page instead of classified sections.
    #[arg(long)]
    raw_pages: bool,

    /// Do not copy the consumption summary to the clipboard.
    #[arg(long)]
    no_clipboard: bool,

    /// Commit message for the upload.
    #[arg(long)]
    message: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_config(cli: Cli) -> Result<SyncConfig> {
    let pages = cli
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .context("failed to parse --pages")?;

    let mut config = SyncConfig::new(cli.pdf_path_or_url, cli.repository, cli.branch, cli.token);
    config.customer_name = cli.customer_name;
    config.api_base_url = cli.api_url;
    config.remote_dir = cli.remote_dir;
    config.commit_message = cli.message;
    if let Some(work_dir) = cli.work_dir {
        config.work_dir = work_dir;
    }
    config.extract = ExtractOptions {
        pages,
        mode: if cli.raw_pages {
            ReportMode::RawPages
        } else {
            ReportMode::Sections
        },
        ..ExtractOptions::default()
    };
    Ok(config)
}

fn log_outcome(outcome: &SyncOutcome, verbose: bool) {
    let warnings = &outcome.conversion.warnings;
    if !warnings.is_empty() {
        eprintln!("warning: {} issue(s) detected", warnings.len());
        if verbose {
            for warning in warnings {
                eprintln!(
                    "  - {:?} section={:?} row={:?}: {}",
                    warning.code, warning.section, warning.row, warning.message
                );
            }
        }
    }

    if let Some(line) = &outcome.summary_line {
        println!("{line}");
    }
    println!(
        "CSV uploaded to {}:{} with status code {}",
        outcome.upload.target.repository, outcome.upload.target.remote_path, outcome.upload.status
    );
}

async fn run(cli: Cli) -> Result<SyncOutcome> {
    let no_clipboard = cli.no_clipboard;
    let config = parse_config(cli)?;
    let clipboard: Box<dyn ClipboardSink> = if no_clipboard {
        Box::new(NoClipboard)
    } else {
        Box::new(SystemClipboard)
    };

    pipeline::run(&config, clipboard.as_ref())
        .await
        .with_context(|| format!("failed to sync '{}'", config.input))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let default_level = if verbose { "cfe_bill_sync=debug" } else { "cfe_bill_sync=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run(cli).await {
        Ok(outcome) => {
            log_outcome(&outcome, verbose);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
