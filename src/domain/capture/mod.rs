//! Camera capture domain module

mod constraints;
mod duration;
mod frame;
mod photo;

pub use constraints::{CameraConstraints, DimensionRange, FacingMode};
pub use duration::Duration;
pub use frame::{ReadyState, VideoFrame, VideoTrack};
pub use photo::{CapturedPhoto, PHOTO_FILE_NAME, PHOTO_MIME_TYPE};
