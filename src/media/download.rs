/// Saving the restored image to disk
use chrono::Utc;
use std::path::PathBuf;
use tracing::info;

use crate::error::DownloadError;
use crate::state::data::DataUrl;

/// Suggested file name for a download, e.g. `restored-1760612345678.png`
pub fn default_filename() -> String {
    format!("restored-{}.png", Utc::now().timestamp_millis())
}

/// Decode a data URL and write its bytes to `path`
pub async fn save_data_url(data_url: String, path: PathBuf) -> Result<PathBuf, DownloadError> {
    let bytes = DataUrl::parse(&data_url).decode_payload()?;
    tokio::fs::write(&path, &bytes).await?;

    info!("💾 Saved {}KB to {}", bytes.len() / 1024, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::tests::png_bytes;

    #[test]
    fn test_default_filename_pattern() {
        let name = default_filename();
        let digits = name
            .strip_prefix("restored-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .unwrap();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_save_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = png_bytes(5, 5);
        let path = dir.path().join(default_filename());

        let saved = save_data_url(DataUrl::encode("image/png", &bytes), path.clone())
            .await
            .unwrap();

        assert_eq!(saved, path);
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_save_rejects_empty_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let result = save_data_url("data:image/png;base64,".to_string(), path.clone()).await;
        assert!(matches!(result, Err(DownloadError::DataUrl(_))));
        assert!(!path.exists());
    }
}
