use async_trait::async_trait;
use tracing::{info, warn};

pub mod config;
mod controller;
pub mod error;
pub mod preview;
pub mod transport;
pub mod types;
pub mod workflow;

pub use controller::WorkflowController;
pub use error::{AnalysisError, GENERIC_FAILURE_MESSAGE};
pub use preview::{PreviewHandle, PreviewId};
pub use transport::HttpAnalysisClient;
pub use types::{AnalysisReport, CandidateFile, SelectedFile};
pub use workflow::{reduce, Effect, Outcome, Phase, Transition, WorkflowEvent, WorkflowState};

/// Remote side of the workflow: the fake-screenshot analysis service.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Uploads one image and returns the service's verdict.
    async fn analyze(&self, file: &SelectedFile) -> Result<AnalysisReport, AnalysisError>;

    /// Downloads the PDF behind a report link, absolute or relative.
    async fn fetch_report(&self, report_link: &str) -> Result<Vec<u8>, AnalysisError>;
}

/// Runs one analysis and turns its result into the event that settles the
/// submission. Every path yields an event, so loading always ends.
pub async fn run_analysis<C>(client: &C, file: &SelectedFile) -> WorkflowEvent
where
    C: AnalysisClient + ?Sized,
{
    match client.analyze(file).await {
        Ok(report) => {
            info!(file = file.name(), verdict = %report.verdict, "analysis completed");
            WorkflowEvent::AnalysisSucceeded(report)
        }
        Err(err) => {
            warn!(file = file.name(), "analysis failed: {err}");
            WorkflowEvent::AnalysisFailed {
                message: err.user_message(),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
