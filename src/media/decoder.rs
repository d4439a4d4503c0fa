/// Photo file loading
///
/// Validates a picked file, then reads it into a data URL off the UI thread.
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::debug;

use crate::error::{DecodeError, SelectionError};
use crate::state::data::{DataUrl, ImageFile};

/// Largest accepted upload (10 MB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// MIME type reported for files with no recognizable image extension
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// A file the user picked, before any of its contents are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// MIME type derived from the file extension
    pub mime_type: String,
}

impl SelectedFile {
    /// Stat the file and derive its MIME type from the extension
    pub fn inspect(path: &Path) -> Result<Self, DecodeError> {
        let metadata = std::fs::metadata(path)?;

        Ok(SelectedFile {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            mime_type: mime_type_for_path(path),
        })
    }

    /// Reject non-images and oversized files without reading them
    pub fn validate(&self) -> Result<(), SelectionError> {
        if !self.mime_type.starts_with("image/") {
            return Err(SelectionError::NotAnImage {
                mime_type: self.mime_type.clone(),
            });
        }

        if self.size_bytes > MAX_UPLOAD_BYTES {
            return Err(SelectionError::TooLarge {
                size: self.size_bytes,
                max: MAX_UPLOAD_BYTES,
            });
        }

        Ok(())
    }
}

/// MIME type for a path based on its extension
pub fn mime_type_for_path(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MIME_TYPE.to_string())
}

/// Read a file into a `data:<mime>;base64,...` string
///
/// The MIME type comes from the file contents when recognizable,
/// otherwise from `fallback_mime`.
pub async fn read_as_data_url(path: PathBuf, fallback_mime: String) -> Result<String, DecodeError> {
    // Spawn blocking because reading and encoding a 10MB file stalls the executor
    task::spawn_blocking(move || read_as_data_url_blocking(&path, &fallback_mime))
        .await
        .map_err(|e| DecodeError::Join(e.to_string()))?
}

fn read_as_data_url_blocking(path: &Path, fallback_mime: &str) -> Result<String, DecodeError> {
    let bytes = std::fs::read(path)?;

    let mime_type = image::guess_format(&bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(fallback_mime);

    debug!("Read {} bytes from {} as {}", bytes.len(), path.display(), mime_type);

    Ok(DataUrl::encode(mime_type, &bytes))
}

/// Decode a validated selection into an `ImageFile`
pub async fn load_image_file(selected: SelectedFile) -> Result<ImageFile, DecodeError> {
    let data_url = read_as_data_url(selected.path.clone(), selected.mime_type.clone()).await?;
    Ok(ImageFile::from_data_url(&selected.path, selected.size_bytes, data_url)?)
}
