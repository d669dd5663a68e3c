use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// Largest image the analysis service accepts (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Multipart field the analysis service reads the image from.
pub const UPLOAD_FIELD_NAME: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    /// Non-standard alias some platforms report for JPEG files.
    #[serde(rename = "image/jpg")]
    Jpg,
}

impl ImageMime {
    pub const ALL: [ImageMime; 3] = [ImageMime::Png, ImageMime::Jpeg, ImageMime::Jpg];

    pub fn parse(declared: &str) -> Option<Self> {
        match declared.trim() {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/jpg" => Some(Self::Jpg),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Jpg => "image/jpg",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks a candidate file against the upload constraints.
///
/// The type is checked before the size, so an oversized file of the wrong
/// type reports the type error.
pub fn validate_selection(declared_mime: &str, size_bytes: u64) -> Result<ImageMime, SelectionError> {
    let mime = ImageMime::parse(declared_mime).ok_or_else(|| SelectionError::UnsupportedType {
        declared: declared_mime.to_string(),
    })?;
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(SelectionError::TooLarge {
            size_bytes,
            limit_bytes: MAX_UPLOAD_BYTES,
        });
    }
    Ok(mime)
}

/// Verdict returned by the analysis service.
///
/// Anything other than `Fake` or `Real` is kept verbatim; the service uses
/// free-form strings such as `"Error: Could not read image"` on a 2xx reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    Fake,
    Real,
    Unrecognized(String),
}

impl Verdict {
    pub fn is_fake(&self) -> bool {
        matches!(self, Self::Fake)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Fake => "Fake",
            Self::Real => "Real",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Verdict {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Fake" => Self::Fake,
            "Real" => Self::Real,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<Verdict> for String {
    fn from(value: Verdict) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
