//! Failures of the remote half of the workflow.

use std::path::PathBuf;

use thiserror::Error;

/// Shown when the service gives no usable `error` field.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error processing image.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("request to service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(
        "service answered HTTP {status}: {}",
        message.as_deref().unwrap_or("no error message")
    )]
    Rejected { status: u16, message: Option<String> },
    #[error("malformed analysis response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("invalid report link '{link}': {source}")]
    InvalidReportLink {
        link: String,
        #[source]
        source: url::ParseError,
    },
    #[error("no report is available for download")]
    NoReport,
    #[error("failed to write report to '{}': {source}", path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    /// The single message surfaced to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_with_error_field_is_shown_verbatim() {
        let err = AnalysisError::Rejected {
            status: 400,
            message: Some("bad image".into()),
        };
        assert_eq!(err.user_message(), "bad image");
        assert_eq!(err.to_string(), "service answered HTTP 400: bad image");
    }

    #[test]
    fn other_failures_fall_back_to_generic_message() {
        let rejected = AnalysisError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(rejected.user_message(), GENERIC_FAILURE_MESSAGE);

        let malformed = AnalysisError::MalformedResponse(
            serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json"),
        );
        assert_eq!(malformed.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn rejection_text_does_not_blame_the_analysis() {
        let err = AnalysisError::Rejected {
            status: 404,
            message: None,
        };
        let text = err.to_string();
        assert_eq!(text, "service answered HTTP 404: no error message");
        assert!(!text.contains("analysis"));
    }
}
