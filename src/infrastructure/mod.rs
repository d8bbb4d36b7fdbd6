//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with ffmpeg, the image codecs, the analysis service
//! and the config file.

pub mod analysis;
pub mod camera;
pub mod config;
pub mod imaging;

// Re-export adapters
pub use analysis::HttpInvoiceAnalyzer;
pub use camera::{FfmpegCamera, StillImageCamera};
pub use config::XdgConfigStore;
pub use imaging::JpegPhotoEncoder;
