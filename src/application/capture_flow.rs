//! Capture flow use case
//!
//! Drives one invoice through camera, preview and upload. All methods take
//! `&self` so the flow can be shared and reset while an acquisition or an
//! upload is still pending; the lock is never held across a call into the
//! camera or the analysis service.

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::analysis::AnalysisResult;
use crate::domain::capture::{CameraConstraints, CapturedPhoto, Duration};
use crate::domain::flow::{ErrorInfo, FlowState, FlowTrigger, InvalidStateTransition};

use super::ports::{
    AnalysisError, CameraDevice, CameraError, CameraSession, CaptureError, InvoiceAnalyzer,
    PhotoEncoder,
};

/// Actions the flow rejected. The state is unchanged when one of these is returned.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Video is not available for capture")]
    CameraNotActive,

    #[error("There is no image to send")]
    NoPhoto,

    #[error("{}", .0.user_message())]
    Capture(#[from] CaptureError),
}

/// Read-only view of the flow for rendering
#[derive(Debug, Clone)]
pub struct FlowSnapshot {
    pub state: FlowState,
    pub camera_active: bool,
    pub photo: Option<CapturedPhoto>,
    pub result: Option<AnalysisResult>,
    pub error: Option<ErrorInfo>,
}

impl From<&CameraError> for ErrorInfo {
    fn from(err: &CameraError) -> Self {
        ErrorInfo::new(err.kind(), err.user_message()).with_cause(err.to_string())
    }
}

impl From<&CaptureError> for ErrorInfo {
    fn from(err: &CaptureError) -> Self {
        ErrorInfo::new(err.kind(), err.user_message()).with_cause(err.to_string())
    }
}

impl From<&AnalysisError> for ErrorInfo {
    fn from(err: &AnalysisError) -> Self {
        ErrorInfo::new(err.kind(), err.user_message()).with_cause(err.to_string())
    }
}

/// Mutable flow state, guarded by the flow's lock
#[derive(Default)]
struct FlowInner {
    state: FlowState,
    session: Option<Box<dyn CameraSession>>,
    photo: Option<CapturedPhoto>,
    result: Option<AnalysisResult>,
    error: Option<ErrorInfo>,
    /// Bumped on every reset; outcomes from an older generation are dropped
    generation: u64,
}

impl FlowInner {
    fn ensure(&self, trigger: FlowTrigger) -> Result<(), InvalidStateTransition> {
        self.state.next(trigger).map(|_| ())
    }

    /// Move to the next state and drop whatever that state may not own
    fn apply(&mut self, trigger: FlowTrigger) -> Result<FlowState, InvalidStateTransition> {
        let next = self.state.next(trigger)?;
        debug!(from = %self.state, to = %next, "flow transition");
        self.state = next;

        if !next.holds_camera() {
            self.release_camera();
        }
        if !next.holds_photo() {
            self.photo = None;
        }
        Ok(next)
    }

    fn release_camera(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
            debug!("camera released");
        }
    }

    fn fail(
        &mut self,
        trigger: FlowTrigger,
        info: ErrorInfo,
    ) -> Result<FlowState, InvalidStateTransition> {
        let next = self.apply(trigger)?;
        self.error = Some(info);
        Ok(next)
    }
}

/// Camera-to-analysis capture flow
pub struct CaptureFlow<C, E, A>
where
    C: CameraDevice,
    E: PhotoEncoder,
    A: InvoiceAnalyzer,
{
    camera: C,
    encoder: E,
    analyzer: A,
    inner: Mutex<FlowInner>,
}

impl<C, E, A> CaptureFlow<C, E, A>
where
    C: CameraDevice,
    E: PhotoEncoder,
    A: InvoiceAnalyzer,
{
    /// Create a new flow in the initial state
    pub fn new(camera: C, encoder: E, analyzer: A) -> Self {
        Self {
            camera,
            encoder,
            analyzer,
            inner: Mutex::new(FlowInner::default()),
        }
    }

    /// Get the current state
    pub async fn state(&self) -> FlowState {
        self.inner.lock().await.state
    }

    /// Copy out everything needed to render the current state
    pub async fn snapshot(&self) -> FlowSnapshot {
        let inner = self.inner.lock().await;
        FlowSnapshot {
            state: inner.state,
            camera_active: inner.session.as_ref().is_some_and(|s| s.is_active()),
            photo: inner.photo.clone(),
            result: inner.result.clone(),
            error: inner.error.clone(),
        }
    }

    /// Open the camera: INITIAL -> REQUESTING -> CAMERA, or ERROR
    pub async fn start_capture(&self) -> Result<FlowState, FlowError> {
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.ensure(FlowTrigger::StartCapture)?;

            if !self.camera.is_supported() {
                let err = CameraError::Unsupported;
                warn!(error = %err, "camera access unavailable");
                return Ok(inner.fail(FlowTrigger::AccessFailed, ErrorInfo::from(&err))?);
            }

            inner.apply(FlowTrigger::StartCapture)?;
            inner.generation
        };

        let outcome = self.request_camera_access().await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!("flow was reset while the camera was opening, discarding stream");
            if let Ok(mut session) = outcome {
                session.stop();
            }
            return Ok(inner.state);
        }

        match outcome {
            Ok(session) => {
                inner.session = Some(session);
                info!("camera stream bound");
                Ok(inner.apply(FlowTrigger::AccessGranted)?)
            }
            Err(err) => {
                warn!(error = %err, "camera access failed");
                Ok(inner.fail(FlowTrigger::AccessFailed, ErrorInfo::from(&err))?)
            }
        }
    }

    /// Acquire a camera stream, preferring the rear camera.
    ///
    /// Falls back to the front camera at a smaller size when the rear
    /// stream comes back without a video track. Any session opened along
    /// the way is stopped before an error is returned.
    pub async fn request_camera_access(&self) -> Result<Box<dyn CameraSession>, CameraError> {
        let preferred = CameraConstraints::preferred();
        debug!(constraints = %preferred, "requesting camera");
        let mut session = self.camera.open(&preferred).await?;

        if !session.video_tracks().is_empty() {
            return Ok(session);
        }
        session.stop();

        let fallback = CameraConstraints::fallback();
        info!(constraints = %fallback, "rear camera has no video track, trying any camera");
        let mut session = self.camera.open(&fallback).await?;

        if session.video_tracks().is_empty() {
            session.stop();
            return Err(CameraError::NotFound(
                "stream has no video track".to_string(),
            ));
        }

        Ok(session)
    }

    /// Wait until the camera has buffered a frame.
    ///
    /// # Returns
    /// `true` once a frame is available, `false` if the timeout elapsed
    /// or the stream ended first
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<bool, FlowError> {
        let mut signal = {
            let inner = self.inner.lock().await;
            if inner.state != FlowState::Camera {
                return Err(FlowError::CameraNotActive);
            }
            inner
                .session
                .as_ref()
                .ok_or(FlowError::CameraNotActive)?
                .ready_signal()
        };

        let ready = tokio::time::timeout(
            timeout.as_std(),
            signal.wait_for(|state| state.has_current_data()),
        )
        .await;

        match ready {
            Ok(Ok(_)) => {
                debug!("camera ready");
                Ok(true)
            }
            Ok(Err(_)) => Ok(false),
            Err(_) => {
                debug!(timeout = %timeout, "camera not ready in time");
                Ok(false)
            }
        }
    }

    /// Take a still: CAMERA -> PREVIEW, releasing the camera
    pub async fn capture_photo(&self) -> Result<FlowState, FlowError> {
        let mut inner = self.inner.lock().await;
        inner.ensure(FlowTrigger::Capture)?;

        let frame = {
            let session = inner
                .session
                .as_ref()
                .filter(|s| s.is_active())
                .ok_or(FlowError::CameraNotActive)?;

            if !session.ready_state().has_current_data() {
                return Err(CaptureError::Unready.into());
            }
            session.current_frame().ok_or(CaptureError::Unready)?
        };

        debug!(width = frame.width(), height = frame.height(), "capturing frame");

        match self.encoder.encode(&frame) {
            Ok(photo) => {
                info!(
                    size = %photo.human_readable_size(),
                    width = photo.width(),
                    height = photo.height(),
                    "photo captured"
                );
                inner.photo = Some(photo);
                Ok(inner.apply(FlowTrigger::Capture)?)
            }
            Err(err) => {
                warn!(error = %err, "capture failed");
                Ok(inner.fail(FlowTrigger::CaptureFailed, ErrorInfo::from(&err))?)
            }
        }
    }

    /// Close the camera without taking a photo: CAMERA -> INITIAL
    pub async fn close_camera(&self) -> Result<FlowState, FlowError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.apply(FlowTrigger::CloseCamera)?)
    }

    /// Throw the photo away: PREVIEW -> INITIAL
    pub async fn discard_photo(&self) -> Result<FlowState, FlowError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.apply(FlowTrigger::Discard)?)
    }

    /// Send the photo for analysis: PREVIEW -> UPLOADING -> SUCCESS, or ERROR.
    /// One attempt, no retry.
    pub async fn upload_photo(&self) -> Result<FlowState, FlowError> {
        let (photo, generation) = {
            let mut inner = self.inner.lock().await;
            inner.ensure(FlowTrigger::Confirm)?;
            let photo = inner.photo.clone().ok_or(FlowError::NoPhoto)?;
            inner.apply(FlowTrigger::Confirm)?;
            (photo, inner.generation)
        };

        info!(size = %photo.human_readable_size(), "sending photo for analysis");
        let outcome = self.analyzer.analyze(&photo).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!("flow was reset during upload, ignoring response");
            return Ok(inner.state);
        }

        match outcome {
            Ok(result) => {
                info!(company = %result.company, "invoice analyzed");
                inner.result = Some(result);
                Ok(inner.apply(FlowTrigger::UploadSucceeded)?)
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                Ok(inner.fail(FlowTrigger::UploadFailed, ErrorInfo::from(&err))?)
            }
        }
    }

    /// Return to INITIAL from any state, releasing the camera and clearing
    /// the photo, result and error. Safe to call repeatedly.
    pub async fn reset(&self) -> FlowState {
        let mut inner = self.inner.lock().await;
        inner.release_camera();
        inner.photo = None;
        inner.result = None;
        inner.error = None;
        inner.generation = inner.generation.wrapping_add(1);
        inner.state = inner.state.next(FlowTrigger::Reset).unwrap_or_default();
        debug!("flow reset");
        inner.state
    }
}

impl<C, E, A> Drop for CaptureFlow<C, E, A>
where
    C: CameraDevice,
    E: PhotoEncoder,
    A: InvoiceAnalyzer,
{
    fn drop(&mut self) {
        self.inner.get_mut().release_camera();
    }
}
