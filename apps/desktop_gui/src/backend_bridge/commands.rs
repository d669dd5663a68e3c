//! Backend commands queued from UI to backend worker.

use client_core::SelectedFile;
use std::path::PathBuf;

pub enum BackendCommand {
    Analyze {
        file: SelectedFile,
    },
    DownloadReport {
        report_link: String,
        destination: PathBuf,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Analyze { .. } => "analyze",
            BackendCommand::DownloadReport { .. } => "download_report",
        }
    }
}
