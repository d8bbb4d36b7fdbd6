//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::analysis::AnalysisResult;
use crate::domain::capture::CapturedPhoto;
use crate::domain::flow::{ErrorInfo, ErrorKind, FlowState};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (results meant for piping)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print the key hints for a state, without newline
    pub fn prompt(&self, state: FlowState) {
        if let Some(hint) = Self::prompt_for(state) {
            eprint!("{} {} ", "›".cyan(), hint.dimmed());
            let _ = io::stderr().flush();
        }
    }

    fn prompt_for(state: FlowState) -> Option<&'static str> {
        match state {
            FlowState::Initial => Some("[Enter] open camera  [q] quit"),
            FlowState::Requesting => Some("[c] cancel"),
            FlowState::Camera => Some("[Enter] capture  [c] close camera"),
            FlowState::Preview => Some("[s] send  [r] retake"),
            FlowState::Uploading => None,
            FlowState::Success | FlowState::Error => Some("[Enter] scan another  [q] quit"),
        }
    }

    /// Describe the captured photo
    pub fn photo_preview(&self, photo: &CapturedPhoto) {
        eprintln!(
            "{} Photo captured: {}x{}, {}",
            "◉".cyan(),
            photo.width(),
            photo.height(),
            photo.human_readable_size()
        );
    }

    /// Print the failure panel for the error state
    pub fn error_panel(&self, info: &ErrorInfo) {
        eprintln!(
            "{} {} {}",
            "✗".red(),
            format!("{}:", Self::error_heading(info.kind())).red(),
            info.message().bold()
        );
        if let Some(cause) = info.cause() {
            eprintln!("  {}", cause.dimmed());
        }
    }

    /// Which step the error belongs to
    pub fn error_heading(kind: ErrorKind) -> &'static str {
        if kind.is_camera() {
            "Camera error"
        } else if kind.is_upload() {
            "Upload error"
        } else {
            "Capture error"
        }
    }

    /// Print the invoice data to stdout
    pub fn analysis_result(&self, result: &AnalysisResult) {
        self.output(&Self::format_result(result));
    }

    /// Render the extracted invoice data
    pub fn format_result(result: &AnalysisResult) -> String {
        let mut lines = vec![
            format!("{}", "Invoice data".bold()),
            format!("  {:<13}{}", "Company:", result.company),
            format!("  {:<13}{}", "Category:", result.category),
            format!("  {:<13}{}", "Total:", result.total_amount),
        ];

        if let Some(date) = result.date() {
            lines.push(format!("  {:<13}{}", "Date:", date));
        }
        if let Some(client) = result.client_name() {
            lines.push(format!("  {:<13}{}", "Client:", client));
        }

        if !result.modalities.is_empty() {
            lines.push(String::new());
            lines.push(format!("{}", "Payment options".bold()));
            for modality in &result.modalities {
                lines.push(format!("  • {}", modality.modality_title));
                for (name, value) in modality.visible_identifiers() {
                    lines.push(format!("      {}: {}", name.cyan(), value));
                }
            }
        }

        lines.join("\n")
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
