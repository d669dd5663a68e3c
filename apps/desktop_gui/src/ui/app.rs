use std::{mem, path::Path};

use client_core::{
    reduce, CandidateFile, Effect, WorkflowEvent, WorkflowState, GENERIC_FAILURE_MESSAGE,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::{
    preview::{PreviewTextures, PREVIEW_MAX_HEIGHT},
    theme,
};

pub const APP_TITLE: &str = "Fake Payment Detector";

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub analysis_url: String,
    pub dark_mode: bool,
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    workflow: WorkflowState,
    previews: PreviewTextures,

    status: String,
    warning: Option<String>,
    applied_dark_mode: Option<bool>,
    analysis_url: String,
}

/// Turns a file dropped onto the window into a candidate. Native drops carry
/// a path; web drops carry bytes and sometimes a MIME type.
pub fn candidate_from_drop(file: &egui::DroppedFile) -> std::io::Result<Option<CandidateFile>> {
    if let Some(path) = &file.path {
        return CandidateFile::from_path(path).map(Some);
    }
    let Some(bytes) = &file.bytes else {
        return Ok(None);
    };
    let declared_mime = if file.mime.is_empty() {
        mime_guess::from_path(&file.name)
            .first_raw()
            .unwrap_or_default()
            .to_string()
    } else {
        file.mime.clone()
    };
    Ok(Some(CandidateFile::from_bytes(
        file.name.clone(),
        declared_mime,
        bytes.clone(),
    )))
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        let mut workflow = WorkflowState::default();
        if startup.dark_mode {
            workflow = reduce(workflow, WorkflowEvent::ToggleDarkMode).state;
        }
        Self {
            cmd_tx,
            ui_rx,
            workflow,
            previews: PreviewTextures::default(),
            status: "Starting backend worker...".to_string(),
            warning: None,
            applied_dark_mode: None,
            analysis_url: startup.analysis_url,
        }
    }

    pub fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    /// Runs one event through the reducer and carries out its effects.
    pub fn dispatch(&mut self, event: WorkflowEvent) {
        let transition = reduce(mem::take(&mut self.workflow), event);
        self.workflow = transition.state;

        for effect in transition.effects {
            match effect {
                Effect::StartAnalysis(file) => {
                    self.status = format!("Analyzing {}...", file.name());
                    let queued = dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::Analyze { file },
                        &mut self.status,
                    );
                    if !queued {
                        self.dispatch(WorkflowEvent::AnalysisFailed {
                            message: GENERIC_FAILURE_MESSAGE.to_string(),
                        });
                    }
                }
                Effect::Warn(message) => {
                    self.warning = Some(message);
                }
                Effect::PreviewReleased(id) => {
                    self.previews.release(id);
                    tracing::trace!(live = self.previews.len(), "dropped preview texture");
                }
            }
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    tracing::warn!("{}", err.status_line());
                    self.status = err.status_line();
                }
                UiEvent::Workflow(event) => {
                    let settled = matches!(
                        event,
                        WorkflowEvent::AnalysisSucceeded(_) | WorkflowEvent::AnalysisFailed { .. }
                    );
                    self.dispatch(event);
                    if settled {
                        self.status = "Analysis finished".to_string();
                    }
                }
            }
        }
    }

    fn apply_theme_if_needed(&mut self, ctx: &egui::Context) {
        let dark_mode = self.workflow.dark_mode();
        if self.applied_dark_mode != Some(dark_mode) {
            ctx.set_visuals(theme::visuals(dark_mode));
            self.applied_dark_mode = Some(dark_mode);
        }
    }

    fn choose_file(&mut self, path: &Path) {
        match CandidateFile::from_path(path) {
            Ok(candidate) => self.dispatch(WorkflowEvent::FileChosen(candidate)),
            Err(err) => self.report_file_error(path, err),
        }
    }

    fn report_file_error(&mut self, path: &Path, err: std::io::Error) {
        let err = UiError::from_message(
            UiErrorContext::FileAccess,
            format!("failed to read '{}': {err}", path.display()),
        );
        tracing::warn!("{}", err.status_line());
        self.status = err.status_line();
    }

    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        if hovering != self.workflow.dragging() {
            self.dispatch(if hovering {
                WorkflowEvent::DragEntered
            } else {
                WorkflowEvent::DragLeft
            });
        }

        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        let Some(file) = dropped else {
            return;
        };
        match candidate_from_drop(&file) {
            Ok(Some(candidate)) => self.dispatch(WorkflowEvent::FileChosen(candidate)),
            Ok(None) => {
                self.dispatch(WorkflowEvent::DragLeft);
                self.status = format!("Could not read dropped file '{}'", file.name);
            }
            Err(err) => {
                self.dispatch(WorkflowEvent::DragLeft);
                let path = file.path.clone().unwrap_or_default();
                self.report_file_error(&path, err);
            }
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        let dark_mode = self.workflow.dark_mode();
        egui::TopBottomPanel::top("nav_bar")
            .frame(
                egui::Frame::new()
                    .fill(theme::brand_fill(dark_mode))
                    .inner_margin(10.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("🛡 {APP_TITLE}"))
                            .strong()
                            .size(18.0)
                            .color(egui::Color32::WHITE),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let toggle_label = if dark_mode { "☀" } else { "🌙" };
                        if ui
                            .button(egui::RichText::new(toggle_label).size(16.0))
                            .on_hover_text("Toggle dark mode")
                            .clicked()
                        {
                            self.dispatch(WorkflowEvent::ToggleDarkMode);
                        }
                        // Navigation and accounts are not part of this app yet.
                        for label in ["Signup", "Login", "About", "Home"] {
                            let _ = ui.button(egui::RichText::new(label).color(egui::Color32::WHITE));
                        }
                    });
                });
            });
    }

    fn show_footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer")
            .frame(
                egui::Frame::new()
                    .fill(theme::brand_fill(self.workflow.dark_mode()))
                    .inner_margin(8.0),
            )
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "© 2025 {APP_TITLE}. All rights reserved."
                        ))
                        .color(egui::Color32::WHITE),
                    );
                    ui.small(
                        egui::RichText::new(format!("{} · {}", self.status, self.analysis_url))
                            .color(egui::Color32::WHITE),
                    );
                });
            });
    }

    fn show_drop_zone(&mut self, ui: &mut egui::Ui) {
        let fill = theme::drop_zone_fill(self.workflow.dark_mode(), self.workflow.dragging());
        egui::Frame::group(ui.style())
            .fill(fill)
            .corner_radius(8.0)
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width().min(640.0));
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("🖼").size(40.0));
                    ui.label(
                        egui::RichText::new("Drag & Drop an image here, or click to select")
                            .strong(),
                    );
                    ui.add_space(6.0);
                    if ui.button("Choose image…").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["png", "jpg", "jpeg"])
                            .add_filter("All files", &["*"])
                            .pick_file()
                        {
                            self.choose_file(&path);
                        }
                    }
                    if let Some(file) = self.workflow.selected_file() {
                        ui.small(format!("{} · {} bytes", file.name(), file.size_bytes()));
                    }
                });
            });
    }

    fn show_preview(&mut self, ui: &mut egui::Ui) {
        let Some(handle) = self.workflow.preview() else {
            return;
        };
        match self.previews.texture_for(ui.ctx(), handle) {
            Some(texture) => {
                ui.add(egui::Image::new(texture).max_height(PREVIEW_MAX_HEIGHT));
            }
            None => {
                ui.weak("Preview unavailable for this image");
            }
        }
    }

    fn show_analyze_controls(&mut self, ui: &mut egui::Ui) {
        let loading = self.workflow.is_loading();
        let label = if loading { "Analyzing..." } else { "⬆ Analyze" };
        let button = egui::Button::new(egui::RichText::new(label).strong())
            .fill(theme::SUCCESS)
            .min_size(egui::vec2(240.0, 32.0));
        if ui.add_enabled(!loading, button).clicked() {
            self.dispatch(WorkflowEvent::SubmitRequested);
        }
        if loading {
            ui.add_space(6.0);
            ui.spinner();
        }
    }

    fn show_outcome(&mut self, ui: &mut egui::Ui) {
        if let Some(message) = self.workflow.error_message() {
            ui.add_space(12.0);
            ui.label(
                egui::RichText::new(format!("✖ {message}"))
                    .color(theme::DANGER)
                    .size(18.0),
            );
        }

        let Some(report) = self.workflow.report().cloned() else {
            return;
        };

        ui.add_space(12.0);
        egui::Frame::new()
            .fill(theme::verdict_fill(&report.verdict))
            .corner_radius(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "{} Result: {}",
                        theme::verdict_icon(&report.verdict),
                        report.verdict
                    ))
                    .size(22.0)
                    .strong()
                    .color(egui::Color32::WHITE),
                );
            });
        if let Some(name) = &report.server_filename {
            ui.small(format!("Stored as {name}"));
        }

        if let Some(link) = report.report_link() {
            ui.add_space(8.0);
            if ui.button("⬇ Download Report (PDF)").clicked() {
                if let Some(destination) = rfd::FileDialog::new()
                    .set_file_name("report.pdf")
                    .save_file()
                {
                    let _ = dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::DownloadReport {
                            report_link: link.to_string(),
                            destination,
                        },
                        &mut self.status,
                    );
                }
            }
        }

        let Some(metadata) = report.metadata_pretty() else {
            return;
        };
        ui.add_space(12.0);
        let showing = self.workflow.show_metadata();
        let toggle = if showing {
            "🙈 Hide Metadata"
        } else {
            "👁 Show Metadata"
        };
        if ui.button(toggle).clicked() {
            self.dispatch(WorkflowEvent::ToggleMetadata);
        }
        if showing {
            egui::Frame::group(ui.style())
                .inner_margin(12.0)
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .max_height(260.0)
                        .show(ui, |ui| {
                            ui.add(egui::Label::new(egui::RichText::new(metadata).monospace()).wrap());
                        });
                });
        }
    }

    fn show_warning_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.warning.clone() else {
            return;
        };
        egui::Window::new("⚠ Warning")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.warning = None;
                }
            });
    }

    fn show_main_workspace(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(16.0);
                    self.show_drop_zone(ui);
                    ui.add_space(12.0);
                    self.show_preview(ui);
                    ui.add_space(12.0);
                    self.show_analyze_controls(ui);
                    self.show_outcome(ui);
                    ui.add_space(16.0);
                });
            });
        });
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.handle_file_drops(ctx);
        self.apply_theme_if_needed(ctx);

        self.show_top_bar(ctx);
        self.show_footer(ctx);
        self.show_main_workspace(ctx);
        self.show_warning_window(ctx);

        if self.workflow.is_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::AnalysisReport;
    use crossbeam_channel::bounded;
    use shared::domain::Verdict;
    use std::sync::Arc;

    fn app() -> (DesktopGuiApp, Receiver<BackendCommand>, Sender<UiEvent>) {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let app = DesktopGuiApp::new(
            cmd_tx,
            ui_rx,
            StartupConfig {
                analysis_url: "http://127.0.0.1:5000/upload".into(),
                dark_mode: false,
            },
        );
        (app, cmd_rx, ui_tx)
    }

    fn png() -> CandidateFile {
        CandidateFile::from_bytes("shot.png", "image/png", b"png".to_vec())
    }

    #[test]
    fn submit_without_file_shows_warning_and_queues_nothing() {
        let (mut app, cmd_rx, _ui_tx) = app();
        app.dispatch(WorkflowEvent::SubmitRequested);
        assert_eq!(app.warning.as_deref(), Some("Please select a file first!"));
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn submit_queues_analysis_and_backend_result_settles_loading() {
        let (mut app, cmd_rx, ui_tx) = app();
        app.dispatch(WorkflowEvent::FileChosen(png()));
        app.dispatch(WorkflowEvent::SubmitRequested);
        assert!(app.workflow().is_loading());
        match cmd_rx.try_recv() {
            Ok(BackendCommand::Analyze { file }) => assert_eq!(file.name(), "shot.png"),
            _ => panic!("expected an analyze command"),
        }

        ui_tx
            .send(UiEvent::Workflow(WorkflowEvent::AnalysisSucceeded(
                AnalysisReport {
                    verdict: Verdict::Fake,
                    metadata: Default::default(),
                    report_url: Some("/r/1.pdf".into()),
                    server_filename: None,
                },
            )))
            .expect("send");
        app.process_ui_events();
        assert!(!app.workflow().is_loading());
        assert_eq!(app.workflow().verdict(), Some(&Verdict::Fake));
    }

    #[test]
    fn disconnected_backend_does_not_leave_loading() {
        let (mut app, cmd_rx, _ui_tx) = app();
        drop(cmd_rx);
        app.dispatch(WorkflowEvent::FileChosen(png()));
        app.dispatch(WorkflowEvent::SubmitRequested);
        assert!(!app.workflow().is_loading());
        assert_eq!(
            app.workflow().error_message(),
            Some(GENERIC_FAILURE_MESSAGE)
        );
        assert!(app.status.contains("disconnected"));
    }

    #[test]
    fn startup_dark_mode_is_applied_to_workflow() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let (_ui_tx, ui_rx) = bounded(1);
        let app = DesktopGuiApp::new(
            cmd_tx,
            ui_rx,
            StartupConfig {
                analysis_url: String::new(),
                dark_mode: true,
            },
        );
        assert!(app.workflow().dark_mode());
    }

    #[test]
    fn web_drop_uses_bytes_and_guesses_missing_mime() {
        let dropped = egui::DroppedFile {
            name: "receipt.jpeg".into(),
            bytes: Some(Arc::from(&b"jpeg"[..])),
            ..Default::default()
        };
        let candidate = candidate_from_drop(&dropped)
            .expect("readable")
            .expect("candidate");
        assert_eq!(candidate.declared_mime, "image/jpeg");
        assert_eq!(candidate.size_bytes, 4);
    }

    #[test]
    fn drop_without_path_or_bytes_is_ignored() {
        let dropped = egui::DroppedFile {
            name: "ghost.png".into(),
            ..Default::default()
        };
        assert!(candidate_from_drop(&dropped).expect("no io").is_none());
    }
}
