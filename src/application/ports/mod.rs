//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod analyzer;
pub mod camera;
pub mod config;
pub mod encoder;

// Re-export common types
pub use analyzer::{
    AnalysisError, InvoiceAnalyzer, CONNECTION_ERROR, GENERIC_SERVER_ERROR, INVALID_RESPONSE_ERROR,
};
pub use camera::{CameraDevice, CameraError, CameraSession};
pub use config::ConfigStore;
pub use encoder::{CaptureError, PhotoEncoder, PHOTO_QUALITY};
