//! Photo encoder port interface

use thiserror::Error;

use crate::domain::capture::{CapturedPhoto, VideoFrame};
use crate::domain::flow::ErrorKind;

/// Fixed JPEG quality used for captured photos
pub const PHOTO_QUALITY: u8 = 95;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Video has no frame to capture yet")]
    Unready,

    #[error("Failed to encode photo: {0}")]
    EncodingFailed(String),
}

impl CaptureError {
    /// Taxonomy entry for this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unready => ErrorKind::CaptureUnready,
            Self::EncodingFailed(_) => ErrorKind::CaptureEncodingFailed,
        }
    }

    /// Message shown to the user
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Unready => "The video is not ready yet. Wait a moment.",
            Self::EncodingFailed(_) => "Error capturing the photo",
        }
    }
}

/// Port for turning a video frame into a captured photo
pub trait PhotoEncoder: Send + Sync {
    /// Rasterize the frame at its native size and encode it.
    ///
    /// # Arguments
    /// * `frame` - The frame to encode
    ///
    /// # Returns
    /// The photo in both preview and upload forms
    fn encode(&self, frame: &VideoFrame) -> Result<CapturedPhoto, CaptureError>;
}
