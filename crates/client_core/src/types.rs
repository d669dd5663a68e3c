//! Files moving through the workflow and the report the service sends back.

use std::{
    fs,
    io::{self, Read},
    path::Path,
    sync::Arc,
};

use shared::{
    domain::{ImageMime, Verdict, MAX_UPLOAD_BYTES},
    protocol::AnalysisResponse,
};

/// A file the user picked or dropped, before validation.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub declared_mime: String,
    pub size_bytes: u64,
    pub contents: Arc<[u8]>,
}

impl CandidateFile {
    pub fn from_bytes(
        name: impl Into<String>,
        declared_mime: impl Into<String>,
        contents: impl Into<Arc<[u8]>>,
    ) -> Self {
        let contents = contents.into();
        Self {
            name: name.into(),
            declared_mime: declared_mime.into(),
            size_bytes: contents.len() as u64,
            contents,
        }
    }

    /// Describes a file on disk, guessing its MIME type from the extension.
    ///
    /// Contents are only read when the file is within the upload limit; an
    /// oversized file keeps its real size and empty contents so validation
    /// can reject it without loading it.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let file = fs::File::open(path)?;
        let on_disk = file.metadata()?.len();
        let (size_bytes, contents) = read_within_limit(file, on_disk)?;
        let declared_mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or_default()
            .to_string();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            name,
            declared_mime,
            size_bytes,
            contents,
        })
    }
}

/// Reads at most one byte past the upload limit. The size returned is the
/// number of bytes read, not `on_disk`.
fn read_within_limit(reader: impl Read, on_disk: u64) -> io::Result<(u64, Arc<[u8]>)> {
    if on_disk > MAX_UPLOAD_BYTES {
        return Ok((on_disk, Arc::from(Vec::<u8>::new())));
    }
    let mut contents = Vec::new();
    reader
        .take(MAX_UPLOAD_BYTES + 1)
        .read_to_end(&mut contents)?;
    Ok((contents.len() as u64, contents.into()))
}

/// A candidate that passed validation. Cloning shares the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime: ImageMime,
    size_bytes: u64,
    contents: Arc<[u8]>,
}

impl SelectedFile {
    pub(crate) fn new(candidate: CandidateFile, mime: ImageMime) -> Self {
        Self {
            name: candidate.name,
            mime,
            size_bytes: candidate.size_bytes,
            contents: candidate.contents,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub(crate) fn shared_contents(&self) -> Arc<[u8]> {
        Arc::clone(&self.contents)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub verdict: Verdict,
    pub metadata: serde_json::Value,
    pub report_url: Option<String>,
    pub server_filename: Option<String>,
}

impl AnalysisReport {
    /// Metadata as indented JSON, or `None` when the service sent none.
    pub fn metadata_pretty(&self) -> Option<String> {
        if self.metadata.is_null() {
            return None;
        }
        serde_json::to_string_pretty(&self.metadata).ok()
    }

    /// The report link, when the service sent a non-empty one.
    pub fn report_link(&self) -> Option<&str> {
        self.report_url
            .as_deref()
            .filter(|link| !link.trim().is_empty())
    }
}

impl From<AnalysisResponse> for AnalysisReport {
    fn from(value: AnalysisResponse) -> Self {
        Self {
            verdict: value.result,
            metadata: value.metadata,
            report_url: value.report_url,
            server_filename: value.filename,
        }
    }
}
