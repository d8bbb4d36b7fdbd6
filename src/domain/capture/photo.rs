//! Captured photo value object

use std::sync::Arc;

/// File name the photo is uploaded under
pub const PHOTO_FILE_NAME: &str = "factura.jpg";

/// MIME type of the encoded photo
pub const PHOTO_MIME_TYPE: &str = "image/jpeg";

/// A still taken from the camera, held in two forms at once: the JPEG
/// bytes sent to the analysis service and a data URL for previewing.
/// Both are built from the same encoded buffer, so they always show the
/// same photo. Cloning shares the buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    jpeg: Arc<[u8]>,
    data_url: Arc<str>,
    width: u32,
    height: u32,
}

impl CapturedPhoto {
    /// Create a photo from encoded JPEG bytes
    pub fn from_jpeg(jpeg: Vec<u8>, width: u32, height: u32) -> Self {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&jpeg);
        let data_url = format!("data:{};base64,{}", PHOTO_MIME_TYPE, encoded);

        Self {
            jpeg: Arc::from(jpeg),
            data_url: Arc::from(data_url),
            width,
            height,
        }
    }

    /// The upload payload
    pub fn bytes(&self) -> &[u8] {
        &self.jpeg
    }

    /// The preview form
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn file_name(&self) -> &'static str {
        PHOTO_FILE_NAME
    }

    pub fn mime_type(&self) -> &'static str {
        PHOTO_MIME_TYPE
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.jpeg.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_encodes_same_bytes() {
        let photo = CapturedPhoto::from_jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9], 1, 1);
        let url = photo.data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        use base64::Engine;
        let payload = url.trim_start_matches("data:image/jpeg;base64,");
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        assert_eq!(decoded, photo.bytes());
    }

    #[test]
    fn clone_shares_buffer() {
        let photo = CapturedPhoto::from_jpeg(vec![1, 2, 3], 4, 5);
        let copy = photo.clone();
        assert_eq!(photo.bytes().as_ptr(), copy.bytes().as_ptr());
        assert_eq!(copy.width(), 4);
        assert_eq!(copy.height(), 5);
    }

    #[test]
    fn upload_metadata() {
        let photo = CapturedPhoto::from_jpeg(vec![1], 1, 1);
        assert_eq!(photo.file_name(), "factura.jpg");
        assert_eq!(photo.mime_type(), "image/jpeg");
    }

    #[test]
    fn human_readable_size_bytes() {
        let photo = CapturedPhoto::from_jpeg(vec![0u8; 500], 1, 1);
        assert_eq!(photo.human_readable_size(), "500 B");
    }

    #[test]
    fn human_readable_size_kb() {
        let photo = CapturedPhoto::from_jpeg(vec![0u8; 2048], 1, 1);
        assert_eq!(photo.human_readable_size(), "2.0 KB");
    }

    #[test]
    fn human_readable_size_mb() {
        let photo = CapturedPhoto::from_jpeg(vec![0u8; 2 * 1024 * 1024], 1, 1);
        assert_eq!(photo.human_readable_size(), "2.0 MB");
    }
}
