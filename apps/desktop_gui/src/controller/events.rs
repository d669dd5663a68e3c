//! UI/backend events and error modeling for desktop GUI controller.

use client_core::WorkflowEvent;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    Workflow(WorkflowEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Storage,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    FileAccess,
    ReportDownload,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("connect")
            || message_lower.contains("dns")
            || message_lower.contains("request to service failed")
            || message_lower.contains("disconnected")
            || message_lower.contains("answered http")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("invalid")
            || message_lower.contains("unsupported")
            || message_lower.contains("malformed")
            || message_lower.contains("no report")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("failed to write")
            || message_lower.contains("failed to read")
            || message_lower.contains("permission denied")
            || message_lower.contains("no such file")
        {
            UiErrorCategory::Storage
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Short line for the status bar.
    pub fn status_line(&self) -> String {
        let label = match self.category {
            UiErrorCategory::Transport => "Network",
            UiErrorCategory::Validation => "Invalid",
            UiErrorCategory::Storage => "File",
            UiErrorCategory::Unknown => "Unexpected",
        };
        let action = match self.context {
            UiErrorContext::BackendStartup => "startup",
            UiErrorContext::FileAccess => "opening file",
            UiErrorContext::ReportDownload => "report download",
        };
        format!("{label} error during {action}: {}", self.message)
    }
}
