//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::capture::Duration;

/// Environment variable overriding the analysis service URL
pub const API_URL_ENV: &str = "INVOICE_API_URL";

/// invoice-snap - photograph an invoice and extract its data
#[derive(Parser, Debug)]
#[command(name = "invoice-snap")]
#[command(version)]
#[command(about = "Capture an invoice with the camera and extract its data with an analysis service")]
#[command(long_about = None)]
pub struct Cli {
    /// Analysis service base URL
    #[arg(long, value_name = "URL", env = API_URL_ENV)]
    pub api_url: Option<String>,

    /// Use an image file instead of the camera
    #[arg(short = 'f', long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// Write the captured JPEG to this path
    #[arg(short = 's', long, value_name = "PATH")]
    pub save_photo: Option<PathBuf>,

    /// Run one capture non-interactively: open, capture, send
    #[arg(short = 'a', long)]
    pub auto: bool,

    /// Print the analysis result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Show debug logs on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed capture options
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub api_url: String,
    pub rear_device: String,
    pub front_device: String,
    pub ready_timeout: Duration,
    pub from_file: Option<PathBuf>,
    pub save_photo: Option<PathBuf>,
    pub auto: bool,
    pub json: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_url",
    "camera.rear_device",
    "camera.front_device",
    "camera.ready_timeout",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::try_parse_from(["invoice-snap"]).unwrap();
        assert!(cli.from_file.is_none());
        assert!(cli.save_photo.is_none());
        assert!(!cli.auto);
        assert!(!cli.json);
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_api_url() {
        let cli = Cli::parse_from(["invoice-snap", "--api-url", "http://10.0.0.5:5001"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.5:5001"));
    }

    #[test]
    fn cli_parses_auto_run() {
        let cli = Cli::parse_from([
            "invoice-snap",
            "--auto",
            "--json",
            "-f",
            "scan.png",
            "-s",
            "out.jpg",
            "-v",
        ]);
        assert!(cli.auto);
        assert!(cli.json);
        assert!(cli.verbose);
        assert_eq!(cli.from_file, Some(PathBuf::from("scan.png")));
        assert_eq!(cli.save_photo, Some(PathBuf::from("out.jpg")));
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["invoice-snap", "config", "init"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from([
            "invoice-snap",
            "config",
            "set",
            "camera.rear_device",
            "/dev/video2",
        ]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "camera.rear_device");
            assert_eq!(value, "/dev/video2");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("api_url"));
        assert!(is_valid_config_key("camera.ready_timeout"));
        assert!(!is_valid_config_key("camera"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        // Verify the CLI definition is valid
        Cli::command().debug_assert();
    }
}
