//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::capture::{Duration, FacingMode};
use crate::domain::error::DurationParseError;

/// Analysis service used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5001";

/// Default camera device for both facing modes
#[cfg(target_os = "macos")]
pub const DEFAULT_CAMERA_DEVICE: &str = "0";

#[cfg(not(target_os = "macos"))]
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";

/// Camera device configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub rear_device: Option<String>,
    pub front_device: Option<String>,
    pub ready_timeout: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub camera: Option<CameraConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_url: Some(DEFAULT_API_URL.to_string()),
            camera: Some(CameraConfig {
                rear_device: Some(DEFAULT_CAMERA_DEVICE.to_string()),
                front_device: Some(DEFAULT_CAMERA_DEVICE.to_string()),
                ready_timeout: Some(Duration::default_ready_timeout().to_string()),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_url: other.api_url.or(self.api_url),
            camera: Self::merge_camera_config(self.camera, other.camera),
        }
    }

    /// Merge camera config sections
    fn merge_camera_config(
        base: Option<CameraConfig>,
        other: Option<CameraConfig>,
    ) -> Option<CameraConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(CameraConfig {
                rear_device: o.rear_device.or(b.rear_device),
                front_device: o.front_device.or(b.front_device),
                ready_timeout: o.ready_timeout.or(b.ready_timeout),
            }),
        }
    }

    /// Get the analysis service base URL, or the local default
    pub fn api_url_or_default(&self) -> &str {
        self.api_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }

    /// Get the device path for a facing mode, or the platform default
    pub fn device_or_default(&self, facing_mode: FacingMode) -> &str {
        self.camera
            .as_ref()
            .and_then(|c| match facing_mode {
                FacingMode::Environment => c.rear_device.as_deref(),
                FacingMode::User => c.front_device.as_deref(),
            })
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CAMERA_DEVICE)
    }

    /// Parsed `camera.ready_timeout`, or the default when unset
    pub fn ready_timeout(&self) -> Result<Duration, DurationParseError> {
        match self.camera.as_ref().and_then(|c| c.ready_timeout.as_deref()) {
            Some(value) => value.parse(),
            None => Ok(Duration::default_ready_timeout()),
        }
    }
}
