//! Domain layer - Core business logic
//!
//! Contains value objects, the flow state table, and domain errors.
//! This layer has no dependencies on external systems.

pub mod analysis;
pub mod capture;
pub mod config;
pub mod error;
pub mod flow;

// Re-export common types
pub use analysis::{AnalysisResult, Modality};
pub use capture::{CameraConstraints, CapturedPhoto, Duration, FacingMode, ReadyState, VideoFrame};
pub use config::AppConfig;
pub use error::*;
pub use flow::{ErrorInfo, ErrorKind, FlowState, FlowTrigger, InvalidStateTransition};
