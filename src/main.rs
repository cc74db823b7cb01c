//! pagesnap CLI
//!
//! Runs a capture job from a JSON config file (or the embedded demo list)
//! and exits 0 only if every target was saved.

use anyhow::Context;
use clap::Parser;
use pagesnap::{ChromeOptions, ChromeSessionFactory, JobConfig, JobRunner, RunResult};
use std::path::PathBuf;
use std::process::ExitCode;

/// Sequential full-page screenshot capture
#[derive(Parser, Debug)]
#[command(name = "pagesnap")]
#[command(version)]
#[command(about = "Capture full-page screenshots for a configured URL list")]
struct Args {
    /// Path to a JSON job config (defaults to the embedded demo target list)
    config: Option<PathBuf>,

    /// Override the job's output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Disable the Chromium sandbox (needed in some containers)
    #[arg(long)]
    no_sandbox: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => JobConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => JobConfig::builtin(),
    };
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let mut options = ChromeOptions::builder().sandbox(!args.no_sandbox);
    if let Some(path) = args.chrome_path {
        options = options.chrome_path(path);
    }

    let runner = JobRunner::new(ChromeSessionFactory::new(options.build()));
    let report = runner.run(&config).await.context("capture run failed")?;

    println!(
        "{} saved, {} failed",
        report.saved_count(),
        report.failed_count()
    );
    for result in report.failures() {
        if let RunResult::Failed { url, reason } = result {
            println!("  failed: {}: {}", url, reason);
        }
    }

    Ok(if report.all_saved() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
