//! Application layer - Use cases and port interfaces
//!
//! Contains the capture flow and the trait definitions
//! for external system interactions.

pub mod capture_flow;
pub mod ports;

// Re-export use cases
pub use capture_flow::{CaptureFlow, FlowError, FlowSnapshot};
