use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    config::load_settings, CandidateFile, Effect, HttpAnalysisClient, WorkflowController,
    WorkflowState,
};
use tracing_subscriber::EnvFilter;

/// Sends a payment screenshot to the analysis service and prints the verdict.
#[derive(Parser, Debug)]
struct Args {
    /// PNG or JPEG image, at most 5 MB.
    image: PathBuf,
    /// Overrides analyzer.toml and the ANALYSIS_URL environment variable.
    #[arg(long)]
    analysis_url: Option<String>,
    /// Where to save the PDF report after a successful analysis.
    #[arg(long)]
    report_out: Option<PathBuf>,
    #[arg(long)]
    show_metadata: bool,
}

fn print_outcome(state: &WorkflowState, show_metadata: bool) {
    let Some(report) = state.report() else {
        return;
    };
    let marker = if report.verdict.is_fake() { "✗" } else { "✓" };
    println!("{marker} Result: {}", report.verdict);
    if let Some(name) = &report.server_filename {
        println!("Stored as: {name}");
    }
    if let Some(link) = report.report_link() {
        println!("Report: {link}");
    }
    if show_metadata {
        if let Some(metadata) = report.metadata_pretty() {
            println!("Metadata:\n{metadata}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.analysis_url {
        settings.analysis_url = url;
    }
    let client = HttpAnalysisClient::from_settings(&settings)?;
    tracing::debug!(url = %client.analysis_url(), "using analysis endpoint");
    let mut controller = WorkflowController::new(client);

    let candidate = CandidateFile::from_path(&args.image)
        .with_context(|| format!("failed to read '{}'", args.image.display()))?;
    let _ = controller.select_file(candidate);
    if let Some(message) = controller.state().error_message() {
        bail!("{message}");
    }

    println!("Analyzing {}...", args.image.display());
    for effect in controller.submit().await {
        if let Effect::Warn(message) = effect {
            eprintln!("warning: {message}");
        }
    }
    if let Some(message) = controller.state().error_message() {
        bail!("{message}");
    }
    print_outcome(controller.state(), args.show_metadata);

    if let Some(destination) = &args.report_out {
        let written = controller
            .download_report(destination)
            .await
            .context("report download failed")?;
        println!("Saved report ({written} bytes) to {}", destination.display());
    }

    Ok(())
}
