//! Video stream value objects

use std::fmt;

/// How much data a video stream has buffered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ReadyState {
    /// Nothing known about the stream yet
    #[default]
    HaveNothing,
    /// Dimensions are known but no frame has arrived
    HaveMetadata,
    /// At least one frame is buffered and can be captured
    HaveCurrentData,
}

impl ReadyState {
    pub const fn has_current_data(&self) -> bool {
        matches!(self, Self::HaveCurrentData)
    }
}

/// A live video track of a camera session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTrack {
    pub label: String,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for VideoTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.label, self.width, self.height)
    }
}

/// One decoded video frame at the stream's native resolution.
/// Pixels are packed RGB24, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl VideoFrame {
    /// Bytes per RGB24 pixel
    pub const BYTES_PER_PIXEL: usize = 3;

    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Expected buffer length for a frame of the given size
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * Self::BYTES_PER_PIXEL
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the pixel buffer matches the declared dimensions
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == Self::expected_len(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_state_ordering() {
        assert!(ReadyState::HaveNothing < ReadyState::HaveMetadata);
        assert!(ReadyState::HaveMetadata < ReadyState::HaveCurrentData);
        assert!(ReadyState::HaveCurrentData.has_current_data());
        assert!(!ReadyState::HaveMetadata.has_current_data());
    }

    #[test]
    fn frame_consistency() {
        assert!(VideoFrame::new(2, 2, vec![0; 12]).is_consistent());
        assert!(!VideoFrame::new(2, 2, vec![0; 11]).is_consistent());
        assert!(!VideoFrame::new(0, 2, vec![]).is_consistent());
    }

    #[test]
    fn expected_len_is_rgb24() {
        assert_eq!(VideoFrame::expected_len(1280, 720), 1280 * 720 * 3);
    }
}
