//! Upload workflow state and its reducer.
//!
//! Every change to what the user sees goes through [`reduce`], a pure
//! function from the current state and one event to the next state plus the
//! side effects the front end must carry out. Front ends never mutate
//! [`WorkflowState`] directly.

use shared::{
    domain::{validate_selection, Verdict},
    error::SelectionError,
};

use crate::{
    preview::{PreviewHandle, PreviewId},
    types::{AnalysisReport, CandidateFile, SelectedFile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Result of the most recent submission. Holding one enum keeps the report
/// and the failure message mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Analysis(AnalysisReport),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct WorkflowState {
    selected: Option<SelectedFile>,
    preview: Option<PreviewHandle>,
    phase: Phase,
    outcome: Option<Outcome>,
    rejection: Option<String>,
    show_metadata: bool,
    dark_mode: bool,
    dragging: bool,
    next_preview_id: u64,
}

impl WorkflowState {
    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match &self.outcome {
            Some(Outcome::Analysis(report)) => Some(report),
            _ => None,
        }
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.report().map(|report| &report.verdict)
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.report()
            .map(|report| &report.metadata)
            .filter(|metadata| !metadata.is_null())
    }

    pub fn report_link(&self) -> Option<&str> {
        self.report().and_then(AnalysisReport::report_link)
    }

    /// Latest validation or request failure. A rejected selection takes
    /// precedence since it happened after the last submission settled.
    pub fn error_message(&self) -> Option<&str> {
        if let Some(rejection) = &self.rejection {
            return Some(rejection);
        }
        match &self.outcome {
            Some(Outcome::Failed(message)) => Some(message),
            _ => None,
        }
    }

    pub fn show_metadata(&self) -> bool {
        self.show_metadata
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.is_loading()
    }
}

#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    FileChosen(CandidateFile),
    SubmitRequested,
    AnalysisSucceeded(AnalysisReport),
    AnalysisFailed { message: String },
    ToggleMetadata,
    ToggleDarkMode,
    DragEntered,
    DragLeft,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Upload the file to the analysis service and feed the answer back as
    /// `AnalysisSucceeded` or `AnalysisFailed`.
    StartAnalysis(SelectedFile),
    /// Show a warning that does not change the workflow state.
    Warn(String),
    /// The preview with this id was superseded; drop anything built from it.
    PreviewReleased(PreviewId),
}

#[derive(Debug)]
pub struct Transition {
    pub state: WorkflowState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(state: WorkflowState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

pub fn reduce(mut state: WorkflowState, event: WorkflowEvent) -> Transition {
    match event {
        WorkflowEvent::FileChosen(candidate) => {
            state.dragging = false;
            select_file(state, candidate)
        }
        WorkflowEvent::SubmitRequested => {
            if state.is_loading() {
                return Transition::quiet(state);
            }
            let Some(file) = state.selected.clone() else {
                let warning = SelectionError::NoFileSelected.user_message().to_string();
                return Transition {
                    state,
                    effects: vec![Effect::Warn(warning)],
                };
            };
            state.phase = Phase::Loading;
            Transition {
                state,
                effects: vec![Effect::StartAnalysis(file)],
            }
        }
        WorkflowEvent::AnalysisSucceeded(report) => {
            if !state.is_loading() {
                return Transition::quiet(state);
            }
            state.phase = Phase::Succeeded;
            state.outcome = Some(Outcome::Analysis(report));
            state.rejection = None;
            Transition::quiet(state)
        }
        WorkflowEvent::AnalysisFailed { message } => {
            if !state.is_loading() {
                return Transition::quiet(state);
            }
            state.phase = Phase::Failed;
            state.outcome = Some(Outcome::Failed(message));
            state.rejection = None;
            Transition::quiet(state)
        }
        WorkflowEvent::ToggleMetadata => {
            state.show_metadata = !state.show_metadata;
            Transition::quiet(state)
        }
        WorkflowEvent::ToggleDarkMode => {
            state.dark_mode = !state.dark_mode;
            Transition::quiet(state)
        }
        WorkflowEvent::DragEntered => {
            state.dragging = true;
            Transition::quiet(state)
        }
        WorkflowEvent::DragLeft => {
            state.dragging = false;
            Transition::quiet(state)
        }
    }
}

fn select_file(mut state: WorkflowState, candidate: CandidateFile) -> Transition {
    let mime = match validate_selection(&candidate.declared_mime, candidate.size_bytes) {
        Ok(mime) => mime,
        Err(err) => {
            tracing::warn!(file = %candidate.name, "rejected selection: {err}");
            state.rejection = Some(err.user_message().to_string());
            return Transition::quiet(state);
        }
    };

    let file = SelectedFile::new(candidate, mime);
    let preview_id = PreviewId(state.next_preview_id);
    state.next_preview_id += 1;

    let mut effects = Vec::new();
    if let Some(previous) = state.preview.replace(PreviewHandle::for_file(preview_id, &file)) {
        effects.push(Effect::PreviewReleased(previous.release()));
    }
    state.selected = Some(file);
    state.rejection = None;
    // Prior analysis results stay visible until the next submission settles;
    // only a failure message is cleared along with the rejection.
    if matches!(state.outcome, Some(Outcome::Failed(_))) {
        state.outcome = None;
    }
    if !state.is_loading() {
        state.phase = Phase::Idle;
    }

    Transition { state, effects }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
