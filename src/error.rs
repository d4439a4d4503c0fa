/// Error types for every stage of the restore workflow
///
/// User-facing messages live in the `Display` impls so the UI can show
/// `err.to_string()` directly.
use thiserror::Error;

/// Shown when a file passes validation but cannot be read or decoded
pub const DECODE_FAILED_MESSAGE: &str = "Failed to process image. Please try another one.";

/// Shown when a restoration fails without any usable message
pub const RESTORE_FALLBACK_MESSAGE: &str =
    "Something went wrong during restoration. Please try again.";

/// Rejections raised before a selected file is ever read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please select a valid image file.")]
    NotAnImage { mime_type: String },

    #[error("Image is too large. Please choose an image under 10MB.")]
    TooLarge { size: u64, max: u64 },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    Join(String),

    #[error("Data URL error: {0}")]
    DataUrl(#[from] DataUrlError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUrlError {
    #[error("Data URL has no payload")]
    MissingPayload,

    #[error("Invalid base64 payload: {0}")]
    Base64(String),
}

impl From<base64::DecodeError> for DataUrlError {
    fn from(e: base64::DecodeError) -> Self {
        DataUrlError::Base64(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("No API key configured. Set GEMINI_API_KEY or add api_key to the config file.")]
    MissingApiKey,

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("{0}")]
    NoImage(String),

    #[error("Failed to parse the service response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("The service returned an unreadable image: {0}")]
    InvalidImage(#[from] DataUrlError),
}

impl RestoreError {
    /// Message for the error banner, never empty
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            RESTORE_FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid image data: {0}")]
    DataUrl(#[from] DataUrlError),

    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
