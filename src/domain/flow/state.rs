//! Capture flow state machine

use std::fmt;
use thiserror::Error;

/// Flow states, one per screen of the capture flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowState {
    #[default]
    Initial,
    Requesting,
    Camera,
    Preview,
    Uploading,
    Success,
    Error,
}

impl FlowState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Requesting => "requesting",
            Self::Camera => "camera",
            Self::Preview => "preview",
            Self::Uploading => "uploading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// States in which a captured photo may exist
    pub const fn holds_photo(&self) -> bool {
        matches!(self, Self::Preview | Self::Uploading | Self::Success)
    }

    /// States in which a camera session may be live
    pub const fn holds_camera(&self) -> bool {
        matches!(self, Self::Requesting | Self::Camera)
    }

    /// Apply a trigger and return the next state.
    ///
    /// Transition table:
    ///
    /// ```text
    ///   INITIAL    -> REQUESTING (start_capture)
    ///   INITIAL    -> ERROR      (access_failed, platform unsupported)
    ///   REQUESTING -> CAMERA     (access_granted)
    ///   REQUESTING -> ERROR      (access_failed)
    ///   CAMERA     -> PREVIEW    (capture)
    ///   CAMERA     -> ERROR      (capture_failed)
    ///   CAMERA     -> INITIAL    (close_camera)
    ///   PREVIEW    -> UPLOADING  (confirm)
    ///   PREVIEW    -> INITIAL    (discard)
    ///   UPLOADING  -> SUCCESS    (upload_succeeded)
    ///   UPLOADING  -> ERROR      (upload_failed)
    ///   *          -> INITIAL    (reset)
    /// ```
    pub fn next(self, trigger: FlowTrigger) -> Result<FlowState, InvalidStateTransition> {
        use FlowState as S;
        use FlowTrigger as T;

        let next = match (self, trigger) {
            (_, T::Reset) => S::Initial,
            (S::Initial, T::StartCapture) => S::Requesting,
            (S::Initial | S::Requesting, T::AccessFailed) => S::Error,
            (S::Requesting, T::AccessGranted) => S::Camera,
            (S::Camera, T::Capture) => S::Preview,
            (S::Camera, T::CaptureFailed) => S::Error,
            (S::Camera, T::CloseCamera) => S::Initial,
            (S::Preview, T::Confirm) => S::Uploading,
            (S::Preview, T::Discard) => S::Initial,
            (S::Uploading, T::UploadSucceeded) => S::Success,
            (S::Uploading, T::UploadFailed) => S::Error,
            (current_state, trigger) => {
                return Err(InvalidStateTransition {
                    current_state,
                    trigger,
                })
            }
        };

        Ok(next)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User actions and asynchronous outcomes that move the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowTrigger {
    StartCapture,
    AccessGranted,
    AccessFailed,
    Capture,
    CaptureFailed,
    CloseCamera,
    Confirm,
    Discard,
    UploadSucceeded,
    UploadFailed,
    Reset,
}

impl FlowTrigger {
    /// Human-readable action name used in error messages
    pub const fn action(&self) -> &'static str {
        match self {
            Self::StartCapture => "start capture",
            Self::AccessGranted => "bind camera",
            Self::AccessFailed => "fail camera access",
            Self::Capture => "capture photo",
            Self::CaptureFailed => "fail capture",
            Self::CloseCamera => "close camera",
            Self::Confirm => "send photo",
            Self::Discard => "discard photo",
            Self::UploadSucceeded => "complete upload",
            Self::UploadFailed => "fail upload",
            Self::Reset => "reset",
        }
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {} while in {current_state} state", .trigger.action())]
pub struct InvalidStateTransition {
    pub current_state: FlowState,
    pub trigger: FlowTrigger,
}
