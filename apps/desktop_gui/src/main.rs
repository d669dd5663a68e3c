mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{config::load_settings, HttpAnalysisClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::events::{UiError, UiErrorContext, UiEvent};
use ui::{app::APP_TITLE, DesktopGuiApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "desktop_gui", about = "Detect fake payment screenshots")]
struct Args {
    /// Overrides the configured analysis endpoint.
    #[arg(long)]
    analysis_url: Option<String>,

    /// Start in dark mode.
    #[arg(long)]
    dark: bool,
}

/// `RUST_LOG` directives when they parse, otherwise `info`.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> eframe::Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.analysis_url {
        settings.analysis_url = url;
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    match HttpAnalysisClient::from_settings(&settings) {
        Ok(client) => backend_bridge::runtime::launch(client, cmd_rx, ui_tx),
        Err(err) => {
            // No worker: every queued command reports a disconnected backend.
            tracing::error!("cannot start backend worker: {err:#}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: {err:#}"),
            )));
            drop(cmd_rx);
        }
    }

    let startup = StartupConfig {
        analysis_url: settings.analysis_url,
        dark_mode: args.dark,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([960.0, 760.0])
            .with_min_inner_size([560.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(DesktopGuiApp::new(cmd_tx, ui_rx, startup)))),
    )
}
