//! Invoice analyzer port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::analysis::AnalysisResult;
use crate::domain::capture::CapturedPhoto;
use crate::domain::flow::ErrorKind;

/// Message used when the service fails without saying why
pub const GENERIC_SERVER_ERROR: &str = "Server error while processing the image";

/// Message used when the service cannot be reached
pub const CONNECTION_ERROR: &str = "Connection error while sending the image";

/// Message used when a success response cannot be read
pub const INVALID_RESPONSE_ERROR: &str = "The server returned an unreadable response";

/// Analysis errors
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("Analysis service returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Failed to parse analysis response: {0}")]
    InvalidResponse(String),

    #[error("Analysis request failed: {0}")]
    Network(String),
}

impl AnalysisError {
    /// Taxonomy entry for this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Server { .. } | Self::InvalidResponse(_) => ErrorKind::UploadServerError,
            Self::Network(_) => ErrorKind::UploadNetworkError,
        }
    }

    /// Message shown to the user
    pub fn user_message(&self) -> &str {
        match self {
            Self::Server { message, .. } => message,
            Self::InvalidResponse(_) => INVALID_RESPONSE_ERROR,
            Self::Network(_) => CONNECTION_ERROR,
        }
    }
}

/// Port for the remote invoice analysis service
#[async_trait]
pub trait InvoiceAnalyzer: Send + Sync {
    /// Upload the photo once and return the extracted invoice data.
    ///
    /// # Arguments
    /// * `photo` - The captured photo
    ///
    /// # Returns
    /// The analysis result or an error
    async fn analyze(&self, photo: &CapturedPhoto) -> Result<AnalysisResult, AnalysisError>;
}
