/// Shared data structures for the application state
///
/// These structs represent the images that flow between
/// the decoder, the restoration client and the UI layer.
use base64::Engine as _;
use iced::widget::image::Handle;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::DataUrlError;

/// MIME type assumed when a data URL header cannot be parsed
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// A `data:<mime>;base64,<payload>` string split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    /// Raw base64 text, prefix stripped
    pub payload: String,
}

impl DataUrl {
    /// Build a data URL string from raw bytes
    pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
        format!(
            "data:{};base64,{}",
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    /// Split a data URL into MIME type and payload
    ///
    /// The MIME type is whatever sits between the first `:` and the next `;`
    /// of the header, falling back to `image/png`. The payload is everything
    /// after the first comma.
    pub fn parse(data_url: &str) -> Self {
        let (header, payload) = match data_url.split_once(',') {
            Some((header, payload)) => (header, payload),
            None => (data_url, ""),
        };

        let mime_type = header
            .split_once(':')
            .and_then(|(_, rest)| rest.split_once(';'))
            .map(|(mime, _)| mime.trim())
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        DataUrl {
            mime_type,
            payload: payload.to_string(),
        }
    }

    /// Decode the base64 payload back into bytes
    pub fn decode_payload(&self) -> Result<Vec<u8>, DataUrlError> {
        if self.payload.is_empty() {
            return Err(DataUrlError::MissingPayload);
        }
        Ok(base64::engine::general_purpose::STANDARD.decode(self.payload.trim())?)
    }
}

/// Read width and height from an encoded image header, if recognizable
pub fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// The user's selected photo, decoded and ready to send
///
/// Created once on file selection and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Where the original file lives on disk
    pub source: PathBuf,
    /// File name only (e.g., "grandma-1962.jpg")
    pub name: String,
    /// Size of the original file in bytes
    pub size_bytes: u64,
    /// Full data URL of the file contents
    pub preview_url: String,
    /// Raw base64 payload, data URL prefix stripped
    pub base64: String,
    pub mime_type: String,
    /// Pixel size, None if the header could not be read
    pub dimensions: Option<(u32, u32)>,
    /// Render handle for the preview and the comparison slider
    pub handle: Handle,
}

impl ImageFile {
    /// Build an image file from the data URL produced by the decoder
    pub fn from_data_url(
        source: &Path,
        size_bytes: u64,
        data_url: String,
    ) -> Result<Self, DataUrlError> {
        let parts = DataUrl::parse(&data_url);
        let bytes = parts.decode_payload()?;
        let dimensions = read_dimensions(&bytes);

        let name = source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(ImageFile {
            source: source.to_path_buf(),
            name,
            size_bytes,
            preview_url: data_url,
            base64: parts.payload,
            mime_type: parts.mime_type,
            dimensions,
            handle: Handle::from_bytes(bytes),
        })
    }

    /// Human-readable size, e.g. "2.00 MB"
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }
}

/// The enhanced image returned by the restoration service
#[derive(Debug, Clone)]
pub struct RestorationResult {
    pub data_url: String,
    pub mime_type: String,
    pub dimensions: Option<(u32, u32)>,
    pub handle: Handle,
}

impl RestorationResult {
    pub fn from_data_url(data_url: String) -> Result<Self, DataUrlError> {
        let parts = DataUrl::parse(&data_url);
        let bytes = parts.decode_payload()?;

        Ok(RestorationResult {
            dimensions: read_dimensions(&bytes),
            mime_type: parts.mime_type,
            handle: Handle::from_bytes(bytes),
            data_url,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    /// Encode a small solid image for use as a fixture
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_parse_extracts_mime_and_payload() {
        let parsed = DataUrl::parse("data:image/jpeg;base64,AAEC");
        assert_eq!(parsed.mime_type, "image/jpeg");
        assert_eq!(parsed.payload, "AAEC");
    }

    #[test]
    fn test_parse_defaults_to_png() {
        assert_eq!(DataUrl::parse("garbage,AAEC").mime_type, "image/png");
        assert_eq!(DataUrl::parse("data:;base64,AAEC").mime_type, "image/png");
        assert_eq!(DataUrl::parse("data:image/webp,AAEC").mime_type, "image/png");
    }

    #[test]
    fn test_parse_splits_on_first_comma() {
        let parsed = DataUrl::parse("data:image/png;base64,AA,BB");
        assert_eq!(parsed.payload, "AA,BB");

        let parsed = DataUrl::parse("data:image/png;base64");
        assert_eq!(parsed.payload, "");
        assert_eq!(parsed.decode_payload(), Err(DataUrlError::MissingPayload));
    }

    #[test]
    fn test_payload_reconstructs_bytes() {
        let bytes = png_bytes(3, 2);
        let url = DataUrl::encode("image/png", &bytes);
        assert!(url.starts_with("data:image/png;base64,"));

        let parsed = DataUrl::parse(&url);
        assert_eq!(parsed.decode_payload().unwrap(), bytes);
    }

    #[test]
    fn test_image_file_from_data_url() {
        let bytes = png_bytes(8, 4);
        let url = DataUrl::encode("image/png", &bytes);

        let file = ImageFile::from_data_url(Path::new("/photos/old.png"), 2 * 1024 * 1024, url.clone())
            .unwrap();

        assert_eq!(file.name, "old.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.preview_url, url);
        assert_eq!(file.dimensions, Some((8, 4)));
        assert_eq!(file.size_label(), "2.00 MB");

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&file.base64)
            .unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_restoration_result_rejects_bad_payload() {
        let result = RestorationResult::from_data_url("data:image/png;base64,@@@".to_string());
        assert!(result.is_err());
    }
}
