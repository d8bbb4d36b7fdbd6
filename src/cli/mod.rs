//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, keyboard and signal
//! handling, logging setup and the capture runner.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod logging;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{run_capture, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{CaptureOptions, Cli, Commands, ConfigAction};
pub use presenter::Presenter;
