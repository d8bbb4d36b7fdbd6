//! invoice-snap CLI entry point

use std::process::ExitCode;

use clap::Parser;

use invoice_snap::cli::{
    app::{load_merged_config, run_capture, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{CaptureOptions, Cli, Commands},
    config_cmd::handle_config_command,
    logging::init_logging,
    presenter::Presenter,
};
use invoice_snap::domain::capture::FacingMode;
use invoice_snap::domain::config::AppConfig;
use invoice_snap::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let presenter = Presenter::new();

    // Handle subcommands
    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        api_url: cli.api_url.clone(),
        camera: None,
    };

    // Merge config
    let config = load_merged_config(cli_config).await;

    let api_url = config.api_url_or_default();
    if let Err(e) = reqwest::Url::parse(api_url) {
        presenter.error(&format!("Invalid api_url '{}': {}", api_url, e));
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let ready_timeout = match config.ready_timeout() {
        Ok(timeout) => timeout,
        Err(e) => {
            presenter.error(&format!("Invalid camera.ready_timeout: {}", e));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let options = CaptureOptions {
        api_url: api_url.to_string(),
        rear_device: config.device_or_default(FacingMode::Environment).to_string(),
        front_device: config.device_or_default(FacingMode::User).to_string(),
        ready_timeout,
        from_file: cli.from_file,
        save_photo: cli.save_photo,
        auto: cli.auto,
        json: cli.json,
    };

    run_capture(options).await
}
