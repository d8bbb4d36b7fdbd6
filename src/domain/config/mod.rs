//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, CameraConfig, DEFAULT_API_URL, DEFAULT_CAMERA_DEVICE};
