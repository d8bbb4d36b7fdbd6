//! Camera port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::capture::{CameraConstraints, ReadyState, VideoFrame, VideoTrack};
use crate::domain::flow::ErrorKind;

/// Camera acquisition errors
#[derive(Debug, Clone, Error)]
pub enum CameraError {
    #[error("Camera access is not supported on this platform")]
    Unsupported,

    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("Camera not found: {0}")]
    NotFound(String),

    #[error("Camera is busy: {0}")]
    Busy(String),

    #[error("Camera constraints cannot be satisfied: {0}")]
    ConstraintsUnsatisfiable(String),

    #[error("Camera error: {0}")]
    Unknown(String),
}

impl CameraError {
    /// Taxonomy entry for this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported => ErrorKind::CameraUnsupported,
            Self::PermissionDenied(_) => ErrorKind::CameraPermissionDenied,
            Self::NotFound(_) => ErrorKind::CameraNotFound,
            Self::Busy(_) => ErrorKind::CameraBusy,
            Self::ConstraintsUnsatisfiable(_) => ErrorKind::CameraConstraintsUnsatisfiable,
            Self::Unknown(_) => ErrorKind::CameraUnknownError,
        }
    }

    /// Message shown to the user
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Unsupported => "Your device does not support camera access",
            Self::PermissionDenied(_) => {
                "Camera permissions denied. Please allow access to the camera."
            }
            Self::NotFound(_) => "No camera was found on this device.",
            Self::Busy(_) => "The camera is being used by another application.",
            Self::ConstraintsUnsatisfiable(_) => {
                "The camera does not meet the requested requirements."
            }
            Self::Unknown(_) => "Error accessing the camera",
        }
    }
}

/// Port for a camera device that can open video streams
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Whether this platform can access cameras at all
    fn is_supported(&self) -> bool;

    /// Open a video-only stream matching the constraints.
    ///
    /// # Arguments
    /// * `constraints` - Facing mode and resolution bounds
    ///
    /// # Returns
    /// A live session, or an error; nothing stays acquired on error
    async fn open(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn CameraSession>, CameraError>;
}

/// Blanket implementation for boxed camera types
#[async_trait]
impl CameraDevice for Box<dyn CameraDevice> {
    fn is_supported(&self) -> bool {
        self.as_ref().is_supported()
    }

    async fn open(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn CameraSession>, CameraError> {
        self.as_ref().open(constraints).await
    }
}

/// Handle to a live camera stream.
/// Holds the hardware until `stop` is called.
pub trait CameraSession: Send + Sync {
    /// Live video tracks of the stream (empty once stopped)
    fn video_tracks(&self) -> Vec<VideoTrack>;

    /// Current buffering state
    fn ready_state(&self) -> ReadyState;

    /// Subscribe to ready state changes
    fn ready_signal(&self) -> watch::Receiver<ReadyState>;

    /// Latest frame, if one has arrived
    fn current_frame(&self) -> Option<VideoFrame>;

    /// Stop all tracks and release the device. Safe to call twice.
    fn stop(&mut self);

    /// Whether the session still holds the device
    fn is_active(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_error_has_distinct_message() {
        let errors = [
            CameraError::Unsupported,
            CameraError::PermissionDenied(String::new()),
            CameraError::NotFound(String::new()),
            CameraError::Busy(String::new()),
            CameraError::ConstraintsUnsatisfiable(String::new()),
            CameraError::Unknown(String::new()),
        ];

        let mut messages: Vec<&str> = errors.iter().map(|e| e.user_message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn permission_denied_kind() {
        let err = CameraError::PermissionDenied("EACCES".to_string());
        assert_eq!(err.kind(), ErrorKind::CameraPermissionDenied);
        assert!(err.user_message().contains("permissions denied"));
    }
}
