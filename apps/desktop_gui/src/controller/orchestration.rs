//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Returns `false` and fills
/// `status` when the command could not be queued.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn download() -> BackendCommand {
        BackendCommand::DownloadReport {
            report_link: "/r/1.pdf".into(),
            destination: "report.pdf".into(),
        }
    }

    #[test]
    fn full_queue_reports_retry_status() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&cmd_tx, download(), &mut status));
        assert!(!dispatch_backend_command(&cmd_tx, download(), &mut status));
        assert!(status.contains("queue is full"));
    }

    #[test]
    fn disconnected_backend_reports_restart_status() {
        let (cmd_tx, cmd_rx) = bounded(1);
        drop(cmd_rx);
        let mut status = String::new();
        assert!(!dispatch_backend_command(&cmd_tx, download(), &mut status));
        assert!(status.contains("disconnected"));
    }
}
