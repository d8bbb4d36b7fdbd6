//! Capture flow domain module

mod error_info;
mod state;

pub use error_info::{ErrorInfo, ErrorKind};
pub use state::{FlowState, FlowTrigger, InvalidStateTransition};
