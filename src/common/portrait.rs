use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::UploadError;

/// Raster formats accepted for upload and returned by the generator.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

fn accepted_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// The uploaded portrait, kept encoded in memory for the whole session.
#[derive(Debug, Clone)]
pub struct SourceImage {
    id: Uuid,
    bytes: Arc<[u8]>,
    mime_type: &'static str,
    width: u32,
    height: u32,
}

impl SourceImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, UploadError> {
        let format = image::guess_format(&bytes).map_err(|_| UploadError::UnsupportedFormat)?;
        let mime_type = accepted_mime(format).ok_or(UploadError::UnsupportedFormat)?;
        let decoded = image::load_from_memory_with_format(&bytes, format)?;

        Ok(Self {
            id: Uuid::new_v4(),
            bytes: bytes.into(),
            mime_type,
            width: decoded.width(),
            height: decoded.height(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let bytes = std::fs::read(path).map_err(|source| UploadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(bytes)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// URI under which the egui image loaders cache this upload.
    pub fn uri(&self) -> String {
        format!("bytes://source/{}", self.id)
    }
}

/// One image returned by the generator for a transform label.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    id: Uuid,
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl GeneratedImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Decodes base64 payload from the API and checks it is a readable image.
    pub fn from_base64(data: &str, mime_type: &str) -> Result<Self, crate::error::GenerationError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
        image::load_from_memory(&bytes)?;
        Ok(Self::new(bytes, mime_type))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn decode(&self) -> Result<DynamicImage, image::ImageError> {
        image::load_from_memory(&self.bytes)
    }

    pub fn uri(&self) -> String {
        format!("bytes://generated/{}", self.id)
    }

    pub fn file_extension(&self) -> &'static str {
        match image::guess_format(&self.bytes) {
            Ok(ImageFormat::Jpeg) => "jpg",
            Ok(ImageFormat::WebP) => "webp",
            _ => "png",
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_image_accepts_png() {
        let source = SourceImage::from_bytes(fixtures::png_bytes(12, 8, [10, 20, 30])).unwrap();
        assert_eq!(source.mime_type(), "image/png");
        assert_eq!(source.dimensions(), (12, 8));
        assert!(source.uri().starts_with("bytes://source/"));
    }

    #[test]
    fn test_source_image_rejects_other_formats() {
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;".to_vec();
        assert!(matches!(
            SourceImage::from_bytes(gif),
            Err(UploadError::UnsupportedFormat)
        ));
        assert!(matches!(
            SourceImage::from_bytes(b"not an image".to_vec()),
            Err(UploadError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_generated_image_from_base64() {
        let bytes = fixtures::png_bytes(4, 4, [200, 0, 0]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let generated = GeneratedImage::from_base64(&encoded, "image/png").unwrap();
        assert_eq!(generated.bytes().as_ref(), bytes.as_slice());
        assert_eq!(generated.file_extension(), "png");
        assert_eq!(generated.decode().unwrap().width(), 4);
    }

    #[test]
    fn test_generated_image_rejects_garbage() {
        assert!(GeneratedImage::from_base64("%%%", "image/png").is_err());
        let not_image = base64::engine::general_purpose::STANDARD.encode(b"hello");
        assert!(GeneratedImage::from_base64(&not_image, "image/png").is_err());
    }
}
