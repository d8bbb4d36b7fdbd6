//! Still image camera adapter
//!
//! Serves a single image file as the camera stream. Lets the capture flow
//! run against a scanned invoice on machines without a camera.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use crate::application::ports::{CameraDevice, CameraError, CameraSession};
use crate::domain::capture::{CameraConstraints, ReadyState, VideoFrame, VideoTrack};

/// Camera backed by an image file
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load_frame(path: &Path) -> Result<VideoFrame, CameraError> {
        let image = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                CameraError::NotFound(path.display().to_string())
            }
            image::ImageError::IoError(io)
                if io.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                CameraError::PermissionDenied(path.display().to_string())
            }
            other => CameraError::Unknown(format!("{}: {}", path.display(), other)),
        })?;

        let rgb = image.into_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(VideoFrame::new(width, height, rgb.into_raw()))
    }
}

#[async_trait]
impl CameraDevice for StillImageCamera {
    fn is_supported(&self) -> bool {
        true
    }

    /// Resolution constraints are not applied; the file is served at its own size.
    async fn open(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn CameraSession>, CameraError> {
        let path = self.path.clone();
        let frame = tokio::task::spawn_blocking(move || Self::load_frame(&path))
            .await
            .map_err(|e| CameraError::Unknown(e.to_string()))??;

        debug!(
            path = %self.path.display(),
            facing_mode = %constraints.facing_mode,
            width = frame.width(),
            height = frame.height(),
            "opened still image"
        );

        Ok(Box::new(StillImageSession::new(
            self.path.display().to_string(),
            frame,
        )))
    }
}

/// Session that always shows the same frame
struct StillImageSession {
    track: VideoTrack,
    frame: Option<VideoFrame>,
    ready: watch::Sender<ReadyState>,
}

impl StillImageSession {
    fn new(label: String, frame: VideoFrame) -> Self {
        let (ready, _) = watch::channel(ReadyState::HaveCurrentData);
        Self {
            track: VideoTrack {
                label,
                width: frame.width(),
                height: frame.height(),
            },
            frame: Some(frame),
            ready,
        }
    }
}

impl CameraSession for StillImageSession {
    fn video_tracks(&self) -> Vec<VideoTrack> {
        if self.frame.is_some() {
            vec![self.track.clone()]
        } else {
            Vec::new()
        }
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready.borrow()
    }

    fn ready_signal(&self) -> watch::Receiver<ReadyState> {
        self.ready.subscribe()
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        self.frame.clone()
    }

    fn stop(&mut self) {
        if self.frame.take().is_some() {
            self.ready.send_replace(ReadyState::HaveNothing);
        }
    }

    fn is_active(&self) -> bool {
        self.frame.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("invoice.png");
        RgbImage::from_pixel(width, height, Rgb([200, 10, 10]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn serves_file_as_ready_frame() {
        let dir = tempfile::tempdir().unwrap();
        let camera = StillImageCamera::new(write_png(dir.path(), 8, 6));

        let session = camera.open(&CameraConstraints::preferred()).await.unwrap();
        assert!(session.ready_state().has_current_data());

        let tracks = session.video_tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!((tracks[0].width, tracks[0].height), (8, 6));

        let frame = session.current_frame().unwrap();
        assert!(frame.is_consistent());
        assert_eq!(&frame.pixels()[..3], &[200, 10, 10]);
    }

    #[tokio::test]
    async fn stop_releases_frame() {
        let dir = tempfile::tempdir().unwrap();
        let camera = StillImageCamera::new(write_png(dir.path(), 2, 2));

        let mut session = camera.open(&CameraConstraints::fallback()).await.unwrap();
        session.stop();
        session.stop();

        assert!(!session.is_active());
        assert!(session.video_tracks().is_empty());
        assert!(session.current_frame().is_none());
        assert_eq!(session.ready_state(), ReadyState::HaveNothing);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let camera = StillImageCamera::new("/nonexistent/invoice.jpg");
        let err = camera
            .open(&CameraConstraints::preferred())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CameraError::NotFound(_)));
    }

    #[tokio::test]
    async fn undecodable_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.png");
        std::fs::write(&path, b"not an image").unwrap();

        let err = StillImageCamera::new(path)
            .open(&CameraConstraints::preferred())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CameraError::Unknown(_)));
    }
}
