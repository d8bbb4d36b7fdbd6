//! Imaging infrastructure module

mod jpeg_encoder;

pub use jpeg_encoder::JpegPhotoEncoder;
