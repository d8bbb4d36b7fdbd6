//! Camera infrastructure module
//!
//! Live capture goes through an ffmpeg child process. A still image file
//! can stand in for the camera.

mod ffmpeg;
mod still_image;

pub use ffmpeg::{FfmpegCamera, FfmpegSession};
pub use still_image::StillImageCamera;
