//! HTTP invoice analyzer adapter

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::application::ports::{AnalysisError, InvoiceAnalyzer, GENERIC_SERVER_ERROR};
use crate::domain::analysis::{AnalysisResponse, AnalysisResult, ErrorResponse};
use crate::domain::capture::CapturedPhoto;

/// Path of the analysis endpoint, relative to the service base URL
const ANALYZE_PATH: &str = "/analyze";

/// Multipart field carrying the photo
const FILE_FIELD: &str = "file";

/// Analysis service client
pub struct HttpInvoiceAnalyzer {
    base_url: String,
    client: reqwest::Client,
}

impl HttpInvoiceAnalyzer {
    /// Create a new analyzer for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a new analyzer with a preconfigured client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Build the endpoint URL
    fn analyze_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), ANALYZE_PATH)
    }

    /// Build the multipart body
    fn build_form(photo: &CapturedPhoto) -> Result<Form, AnalysisError> {
        let part = Part::bytes(photo.bytes().to_vec())
            .file_name(photo.file_name())
            .mime_str(photo.mime_type())
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        Ok(Form::new().part(FILE_FIELD, part))
    }

    /// Pick the message for a failed response
    fn server_message(body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string())
    }
}

#[async_trait]
impl InvoiceAnalyzer for HttpInvoiceAnalyzer {
    async fn analyze(&self, photo: &CapturedPhoto) -> Result<AnalysisResult, AnalysisError> {
        let url = self.analyze_url();
        let form = Self::build_form(photo)?;
        debug!(url = %url, bytes = photo.size_bytes(), "posting photo");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        debug!(status = status.as_u16(), bytes = body.len(), "analysis response");

        if !status.is_success() {
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                message: Self::server_message(&body),
            });
        }

        let response: AnalysisResponse = serde_json::from_str(&body)
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

        Ok(response.data)
    }
}
