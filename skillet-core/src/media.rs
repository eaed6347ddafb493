//! Image acquisition, encoding, and review-photo validation.

use std::io::Cursor;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{ImageFormat, ImageReader};

use crate::error::UploadError;

/// Allowed formats for review photos.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum review photo size (10MB).
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// An image the user selected, before it is read into memory.
///
/// Whatever the acquisition path, the same source bytes must produce the
/// same base64 payload, so everything converges on raw bytes here.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image file on local disk.
    Path(PathBuf),
    /// Image already held in memory.
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Read the raw image bytes.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            ImageSource::Path(path) => tokio::fs::read(path).await,
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Encode image bytes as the base64 payload expected by the vision service.
pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// A review photo that passed validation, ready for upload.
#[derive(Debug, Clone)]
pub struct ValidatedPhoto {
    /// The raw image bytes.
    pub data: Vec<u8>,
    /// The detected content type (e.g., "image/jpeg").
    pub content_type: String,
}

/// Validate a review photo: size cap plus format sniffing against the
/// allowlist. Returns the photo with its detected content type.
pub fn validate_photo(data: Vec<u8>) -> Result<ValidatedPhoto, UploadError> {
    if data.len() > MAX_PHOTO_BYTES {
        return Err(UploadError::InvalidMedia(format!(
            "photo too large: {} bytes (max {})",
            data.len(),
            MAX_PHOTO_BYTES
        )));
    }

    let reader = ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .map_err(|e| UploadError::InvalidMedia(format!("failed to read photo: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| UploadError::InvalidMedia("could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(UploadError::InvalidMedia(format!(
            "unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        )));
    }

    Ok(ValidatedPhoto {
        content_type: format.to_mime_type().to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest well-formed PNG: 8-byte signature plus an IHDR chunk header.
    fn png_header() -> Vec<u8> {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D]);
        data.extend_from_slice(b"IHDR");
        data
    }

    #[test]
    fn test_validate_png_header() {
        let photo = validate_photo(png_header()).unwrap();
        assert_eq!(photo.content_type, "image/png");
    }

    #[test]
    fn test_validate_rejects_unknown_bytes() {
        assert!(validate_photo(vec![0x00; 32]).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized() {
        let mut data = png_header();
        data.resize(MAX_PHOTO_BYTES + 1, 0);
        assert!(validate_photo(data).is_err());
    }

    #[tokio::test]
    async fn test_path_and_bytes_encode_identically() {
        let bytes = png_header();
        let dir = std::env::temp_dir().join("skillet-media-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("probe.png");
        std::fs::write(&path, &bytes).unwrap();

        let from_path = ImageSource::from_path(&path).read().await.unwrap();
        let from_bytes = ImageSource::from_bytes(bytes).read().await.unwrap();
        assert_eq!(encode_base64(&from_path), encode_base64(&from_bytes));
    }
}
