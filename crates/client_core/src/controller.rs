//! Headless driver that owns a [`WorkflowState`] and executes its effects.

use std::{mem, path::Path};

use tracing::{debug, info};

use crate::{
    error::{AnalysisError, GENERIC_FAILURE_MESSAGE},
    run_analysis,
    types::CandidateFile,
    workflow::{reduce, Effect, WorkflowEvent, WorkflowState},
    AnalysisClient,
};

pub struct WorkflowController<C: AnalysisClient> {
    client: C,
    state: WorkflowState,
}

/// Holds the loading flag for one submission. If the submission is dropped
/// before it settles, the state is settled as a failure instead of being
/// left loading.
struct LoadingScope<'a> {
    state: &'a mut WorkflowState,
    settled: bool,
}

impl<'a> LoadingScope<'a> {
    fn new(state: &'a mut WorkflowState) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    fn settle(mut self, event: WorkflowEvent) -> Vec<Effect> {
        self.settled = true;
        apply(self.state, event)
    }
}

impl Drop for LoadingScope<'_> {
    fn drop(&mut self) {
        if !self.settled && self.state.is_loading() {
            debug!("submission abandoned before completion");
            let _ = apply(
                self.state,
                WorkflowEvent::AnalysisFailed {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                },
            );
        }
    }
}

fn apply(state: &mut WorkflowState, event: WorkflowEvent) -> Vec<Effect> {
    let transition = reduce(mem::take(state), event);
    *state = transition.state;
    transition.effects
}

impl<C: AnalysisClient> WorkflowController<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: WorkflowState::default(),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Applies one event and returns the effects left for the caller.
    pub fn dispatch(&mut self, event: WorkflowEvent) -> Vec<Effect> {
        apply(&mut self.state, event)
    }

    /// Returns the effects of the selection (at most a preview release).
    pub fn select_file(&mut self, file: CandidateFile) -> Vec<Effect> {
        self.dispatch(WorkflowEvent::FileChosen(file))
    }

    /// Submits the selected file and waits for the service. Effects the
    /// controller cannot carry out itself, such as warnings, are returned.
    pub async fn submit(&mut self) -> Vec<Effect> {
        let effects = self.dispatch(WorkflowEvent::SubmitRequested);
        let mut remaining = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartAnalysis(file) => {
                    let scope = LoadingScope::new(&mut self.state);
                    let event = run_analysis(&self.client, &file).await;
                    remaining.extend(scope.settle(event));
                }
                other => remaining.push(other),
            }
        }
        remaining
    }

    pub fn toggle_metadata_visibility(&mut self) {
        let _ = self.dispatch(WorkflowEvent::ToggleMetadata);
    }

    pub fn toggle_dark_mode(&mut self) {
        let _ = self.dispatch(WorkflowEvent::ToggleDarkMode);
    }

    /// Saves the report of the last successful analysis to `destination`.
    /// Returns the number of bytes written. Workflow state is untouched.
    pub async fn download_report(&self, destination: &Path) -> Result<u64, AnalysisError> {
        let link = self.state.report_link().ok_or(AnalysisError::NoReport)?;
        let bytes = self.client.fetch_report(link).await?;
        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|source| AnalysisError::WriteReport {
                path: destination.to_path_buf(),
                source,
            })?;
        info!(path = %destination.display(), size_bytes = bytes.len(), "saved analysis report");
        Ok(bytes.len() as u64)
    }
}
