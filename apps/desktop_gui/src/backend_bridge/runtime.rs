//! Runtime bridge between UI command queue and backend event intake.

use std::{path::Path, sync::Arc, thread};

use client_core::{
    run_analysis, AnalysisClient, HttpAnalysisClient, SelectedFile, WorkflowEvent,
    GENERIC_FAILURE_MESSAGE,
};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Guarantees the UI leaves its loading state for one analysis: whatever
/// happens to the task, exactly one settling event is sent.
struct SettleOnDrop {
    ui_tx: Sender<UiEvent>,
    settled: bool,
}

impl SettleOnDrop {
    fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self {
            ui_tx,
            settled: false,
        }
    }

    fn settle(mut self, event: WorkflowEvent) {
        self.settled = true;
        send_settlement(&self.ui_tx, event);
    }
}

impl Drop for SettleOnDrop {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("analysis task ended without a result");
            send_settlement(
                &self.ui_tx,
                WorkflowEvent::AnalysisFailed {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                },
            );
        }
    }
}

// Blocking send: a settlement must not be dropped when the queue is busy.
// On a runtime worker the wait is moved off the scheduler with
// `block_in_place` so a full UI queue does not stall other tasks.
fn send_settlement(ui_tx: &Sender<UiEvent>, event: WorkflowEvent) {
    let event = match ui_tx.try_send(UiEvent::Workflow(event)) {
        Ok(()) => return,
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui closed before analysis settled");
            return;
        }
        Err(TrySendError::Full(event)) => event,
    };
    let send = || ui_tx.send(event);
    let on_worker = Handle::try_current()
        .is_ok_and(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread);
    let sent = if on_worker {
        tokio::task::block_in_place(send)
    } else {
        send()
    };
    if sent.is_err() {
        tracing::debug!("ui closed before analysis settled");
    }
}

async fn analyze(client: Arc<HttpAnalysisClient>, file: SelectedFile, ui_tx: Sender<UiEvent>) {
    let guard = SettleOnDrop::new(ui_tx);
    let event = run_analysis(client.as_ref(), &file).await;
    guard.settle(event);
}

async fn download_report(
    client: Arc<HttpAnalysisClient>,
    report_link: String,
    destination: &Path,
    ui_tx: Sender<UiEvent>,
) {
    let result = match client.fetch_report(&report_link).await {
        Ok(bytes) => tokio::fs::write(destination, &bytes)
            .await
            .map(|()| bytes.len())
            .map_err(|err| format!("failed to write '{}': {err}", destination.display())),
        Err(err) => Err(err.to_string()),
    };
    match result {
        Ok(size) => {
            tracing::info!(path = %destination.display(), size_bytes = size, "saved analysis report");
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Saved report to {}",
                destination.display()
            )));
        }
        Err(message) => {
            tracing::warn!("report download failed: {message}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::ReportDownload,
                message,
            )));
        }
    }
}

pub fn launch(client: HttpAnalysisClient, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let client = Arc::new(client);
        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Ready; analysis service at {}",
            client.analysis_url()
        )));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                BackendCommand::Analyze { file } => {
                    runtime.spawn(analyze(client.clone(), file, ui_tx.clone()));
                }
                BackendCommand::DownloadReport {
                    report_link,
                    destination,
                } => {
                    let client = client.clone();
                    let ui_tx = ui_tx.clone();
                    runtime.spawn(async move {
                        download_report(client, report_link, &destination, ui_tx).await;
                    });
                }
            }
        }
        tracing::debug!("ui command queue closed; backend worker exiting");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::config::ClientSettings;
    use crossbeam_channel::bounded;

    #[test]
    fn dropped_guard_reports_generic_failure() {
        let (ui_tx, ui_rx) = bounded(4);
        drop(SettleOnDrop::new(ui_tx));

        match ui_rx.try_recv() {
            Ok(UiEvent::Workflow(WorkflowEvent::AnalysisFailed { message })) => {
                assert_eq!(message, GENERIC_FAILURE_MESSAGE);
            }
            _ => panic!("expected a failure settlement"),
        }
        assert!(ui_rx.try_recv().is_err());
    }

    #[test]
    fn settled_guard_sends_exactly_one_event() {
        let (ui_tx, ui_rx) = bounded(4);
        SettleOnDrop::new(ui_tx).settle(WorkflowEvent::AnalysisFailed {
            message: "bad image".into(),
        });

        match ui_rx.try_recv() {
            Ok(UiEvent::Workflow(WorkflowEvent::AnalysisFailed { message })) => {
                assert_eq!(message, "bad image");
            }
            _ => panic!("expected the settled event"),
        }
        assert!(ui_rx.try_recv().is_err());
    }

    #[test]
    fn settlement_waits_for_room_in_a_full_queue_without_stalling_the_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime");
        let (ui_tx, ui_rx) = bounded(1);
        ui_tx
            .send(UiEvent::Info("busy".into()))
            .expect("fill queue");

        let settling = runtime.spawn(async move {
            SettleOnDrop::new(ui_tx).settle(WorkflowEvent::AnalysisFailed {
                message: "bad image".into(),
            });
        });
        let other = runtime.spawn(async { 7 });
        assert_eq!(runtime.block_on(other).expect("join"), 7);

        let timeout = std::time::Duration::from_secs(5);
        assert!(matches!(ui_rx.recv_timeout(timeout), Ok(UiEvent::Info(_))));
        match ui_rx.recv_timeout(timeout) {
            Ok(UiEvent::Workflow(WorkflowEvent::AnalysisFailed { message })) => {
                assert_eq!(message, "bad image");
            }
            _ => panic!("expected the settled event"),
        }
        runtime.block_on(settling).expect("join");
    }

    #[test]
    fn failed_download_reports_a_download_error_and_writes_nothing() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let settings = ClientSettings {
            analysis_url: format!("http://{addr}/upload"),
        };
        let client = Arc::new(HttpAnalysisClient::from_settings(&settings).expect("client"));
        let dir = tempfile::tempdir().expect("tempdir");
        let destination = dir.path().join("report.pdf");
        let (ui_tx, ui_rx) = bounded(4);

        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        runtime.block_on(download_report(
            client,
            "/r/1.pdf".into(),
            &destination,
            ui_tx,
        ));

        match ui_rx.try_recv() {
            Ok(UiEvent::Error(err)) => {
                assert_eq!(err.context(), UiErrorContext::ReportDownload);
                assert!(err.status_line().contains("report download"));
            }
            _ => panic!("expected a download error"),
        }
        assert!(ui_rx.try_recv().is_err());
        assert!(!destination.exists());
    }
}
