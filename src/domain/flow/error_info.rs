//! User-facing error information

use std::fmt;

/// Every way a capture attempt can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CameraUnsupported,
    CameraPermissionDenied,
    CameraNotFound,
    CameraBusy,
    CameraConstraintsUnsatisfiable,
    CameraUnknownError,
    CaptureUnready,
    CaptureEncodingFailed,
    UploadServerError,
    UploadNetworkError,
}

impl ErrorKind {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CameraUnsupported => "camera-unsupported",
            Self::CameraPermissionDenied => "camera-permission-denied",
            Self::CameraNotFound => "camera-not-found",
            Self::CameraBusy => "camera-busy",
            Self::CameraConstraintsUnsatisfiable => "camera-constraints-unsatisfiable",
            Self::CameraUnknownError => "camera-unknown-error",
            Self::CaptureUnready => "capture-unready",
            Self::CaptureEncodingFailed => "capture-encoding-failed",
            Self::UploadServerError => "upload-server-error",
            Self::UploadNetworkError => "upload-network-error",
        }
    }

    /// Whether the error came from the camera acquisition step
    pub const fn is_camera(&self) -> bool {
        matches!(
            self,
            Self::CameraUnsupported
                | Self::CameraPermissionDenied
                | Self::CameraNotFound
                | Self::CameraBusy
                | Self::CameraConstraintsUnsatisfiable
                | Self::CameraUnknownError
        )
    }

    /// Whether the error came from the upload step
    pub const fn is_upload(&self) -> bool {
        matches!(self, Self::UploadServerError | Self::UploadNetworkError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error shown to the user while the flow is in the error state.
/// The message is what the user sees; the cause is the low-level detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    kind: ErrorKind,
    message: String,
    cause: Option<String>,
}

impl ErrorInfo {
    /// Create an error with a user-facing message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the low-level cause
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_message_only() {
        let info = ErrorInfo::new(ErrorKind::UploadServerError, "invalid image")
            .with_cause("HTTP 400");
        assert_eq!(info.to_string(), "invalid image");
        assert_eq!(info.cause(), Some("HTTP 400"));
    }

    #[test]
    fn kind_groups() {
        assert!(ErrorKind::CameraBusy.is_camera());
        assert!(!ErrorKind::CameraBusy.is_upload());
        assert!(ErrorKind::UploadNetworkError.is_upload());
        assert!(!ErrorKind::CaptureUnready.is_camera());
        assert!(!ErrorKind::CaptureUnready.is_upload());
    }
}
