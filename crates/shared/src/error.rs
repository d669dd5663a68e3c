use thiserror::Error;

/// Local rejection of a file before anything is sent over the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unsupported image type '{declared}'")]
    UnsupportedType { declared: String },
    #[error("image is {size_bytes} bytes, limit is {limit_bytes}")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },
    #[error("no image selected")]
    NoFileSelected,
}

impl SelectionError {
    /// Message shown to the user in place of the technical description.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => {
                "Invalid file type. Only PNG, JPG, and JPEG are allowed."
            }
            Self::TooLarge { .. } => "File is too large. Max size is 5MB.",
            Self::NoFileSelected => "Please select a file first!",
        }
    }
}
