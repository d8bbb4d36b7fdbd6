//! JPEG photo encoder adapter

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use tracing::trace;

use crate::application::ports::{CaptureError, PhotoEncoder, PHOTO_QUALITY};
use crate::domain::capture::{CapturedPhoto, VideoFrame};

/// Encodes frames at their native size with a fixed quality
pub struct JpegPhotoEncoder {
    quality: u8,
}

impl JpegPhotoEncoder {
    pub fn new() -> Self {
        Self {
            quality: PHOTO_QUALITY,
        }
    }
}

impl Default for JpegPhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoEncoder for JpegPhotoEncoder {
    fn encode(&self, frame: &VideoFrame) -> Result<CapturedPhoto, CaptureError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(CaptureError::EncodingFailed(format!(
                "frame has no area ({}x{})",
                frame.width(),
                frame.height()
            )));
        }
        // The JPEG writer asserts on the exact raster length
        if !frame.is_consistent() {
            return Err(CaptureError::EncodingFailed(format!(
                "expected {} bytes for {}x{}, got {}",
                VideoFrame::expected_len(frame.width(), frame.height()),
                frame.width(),
                frame.height(),
                frame.pixels().len()
            )));
        }

        let raster = RgbImage::from_raw(frame.width(), frame.height(), frame.pixels().to_vec())
            .ok_or_else(|| CaptureError::EncodingFailed("frame buffer rejected".to_string()))?;

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .write_image(
                raster.as_raw(),
                raster.width(),
                raster.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;

        trace!(bytes = jpeg.len(), quality = self.quality, "frame encoded");

        Ok(CapturedPhoto::from_jpeg(jpeg, frame.width(), frame.height()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(width: u32, height: u32) -> VideoFrame {
        VideoFrame::new(
            width,
            height,
            vec![128; VideoFrame::expected_len(width, height)],
        )
    }

    #[test]
    fn encodes_native_size_jpeg() {
        let photo = JpegPhotoEncoder::new().encode(&gray_frame(16, 9)).unwrap();

        assert_eq!(photo.width(), 16);
        assert_eq!(photo.height(), 9);
        assert_eq!(&photo.bytes()[..2], &[0xFF, 0xD8]);
        assert!(photo.data_url().starts_with("data:image/jpeg;base64,"));

        let decoded = image::load_from_memory(photo.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 9));
    }

    #[test]
    fn short_buffer_fails() {
        let frame = VideoFrame::new(4, 4, vec![0; 10]);
        let err = JpegPhotoEncoder::new().encode(&frame).unwrap_err();
        assert!(matches!(err, CaptureError::EncodingFailed(_)));
    }

    #[test]
    fn long_buffer_fails() {
        let frame = VideoFrame::new(2, 2, vec![0; 13]);
        match JpegPhotoEncoder::new().encode(&frame) {
            Err(CaptureError::EncodingFailed(detail)) => {
                assert_eq!(detail, "expected 12 bytes for 2x2, got 13");
            }
            other => panic!("expected EncodingFailed, got {:?}", other.map(|p| p.width())),
        }
    }

    #[test]
    fn empty_frame_fails() {
        let err = JpegPhotoEncoder::new()
            .encode(&VideoFrame::new(0, 0, Vec::new()))
            .unwrap_err();
        assert!(matches!(err, CaptureError::EncodingFailed(_)));
    }
}
