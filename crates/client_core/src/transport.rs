//! reqwest implementation of [`AnalysisClient`].

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::UPLOAD_FIELD_NAME,
    protocol::{AnalysisResponse, ErrorBody},
};
use tracing::debug;
use url::Url;

use crate::{
    config::ClientSettings,
    error::AnalysisError,
    types::{AnalysisReport, SelectedFile},
    AnalysisClient,
};

pub struct HttpAnalysisClient {
    http: Client,
    analysis_url: Url,
}

impl HttpAnalysisClient {
    /// No request timeout is set; a submission waits for the service.
    pub fn new(analysis_url: Url) -> Self {
        Self {
            http: Client::new(),
            analysis_url,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        Ok(Self::new(settings.analysis_endpoint()?))
    }

    pub fn analysis_url(&self) -> &Url {
        &self.analysis_url
    }

    /// Resolves a report link against the analysis endpoint, so both
    /// `/r/1.pdf` and `http://host/r/1.pdf` work.
    pub fn resolve_report_link(&self, link: &str) -> Result<Url, AnalysisError> {
        self.analysis_url
            .join(link.trim())
            .map_err(|source| AnalysisError::InvalidReportLink {
                link: link.to_string(),
                source,
            })
    }
}

/// Reads the whole body, turning a non-2xx status into a rejection that
/// carries the service's `error` field when it sent one.
async fn successful_body(response: Response) -> Result<Vec<u8>, AnalysisError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(AnalysisError::Rejected {
            status: status.as_u16(),
            message: ErrorBody::message_from_bytes(&body),
        });
    }
    Ok(body.to_vec())
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, file: &SelectedFile) -> Result<AnalysisReport, AnalysisError> {
        let part = Part::bytes(file.contents().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime().as_str())?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        debug!(
            url = %self.analysis_url,
            file = file.name(),
            size_bytes = file.size_bytes(),
            "uploading image for analysis"
        );
        let response = self
            .http
            .post(self.analysis_url.clone())
            .multipart(form)
            .send()
            .await?;
        let body = successful_body(response).await?;
        let parsed: AnalysisResponse =
            serde_json::from_slice(&body).map_err(AnalysisError::MalformedResponse)?;
        Ok(parsed.into())
    }

    async fn fetch_report(&self, report_link: &str) -> Result<Vec<u8>, AnalysisError> {
        let url = self.resolve_report_link(report_link)?;
        debug!(%url, "downloading analysis report");
        let response = self.http.get(url).send().await?;
        successful_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpAnalysisClient {
        HttpAnalysisClient::new(Url::parse("http://127.0.0.1:5000/upload").expect("url"))
    }

    #[test]
    fn resolves_relative_report_links_against_endpoint() {
        assert_eq!(
            client().resolve_report_link("/r/1.pdf").expect("resolve").as_str(),
            "http://127.0.0.1:5000/r/1.pdf"
        );
        assert_eq!(
            client()
                .resolve_report_link("download_report/x.pdf")
                .expect("resolve")
                .as_str(),
            "http://127.0.0.1:5000/download_report/x.pdf"
        );
    }

    #[test]
    fn keeps_absolute_report_links() {
        assert_eq!(
            client()
                .resolve_report_link("https://reports.example/a.pdf")
                .expect("resolve")
                .as_str(),
            "https://reports.example/a.pdf"
        );
    }

    #[test]
    fn rejects_unparseable_report_links() {
        let err = client()
            .resolve_report_link("http://[::1")
            .expect_err("invalid");
        assert!(matches!(err, AnalysisError::InvalidReportLink { .. }));
    }
}
