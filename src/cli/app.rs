//! Main app runner for the capture flow

use std::future::Future;
use std::path::Path;
use std::process::ExitCode;

use tracing::{debug, warn};

use crate::application::ports::{CameraDevice, CaptureError, ConfigStore};
use crate::application::{CaptureFlow, FlowError};
use crate::domain::analysis::AnalysisResult;
use crate::domain::capture::CapturedPhoto;
use crate::domain::config::AppConfig;
use crate::domain::flow::FlowState;
use crate::infrastructure::{
    FfmpegCamera, HttpInvoiceAnalyzer, JpegPhotoEncoder, StillImageCamera, XdgConfigStore,
};

use super::args::CaptureOptions;
use super::presenter::Presenter;
use super::signals::{InputEvent, InputHandler, UserCommand};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

type Flow = CaptureFlow<Box<dyn CameraDevice>, JpegPhotoEncoder, HttpInvoiceAnalyzer>;

/// Why a pending step stopped early
enum Interruption {
    /// `c` while the step allowed cancelling
    Cancelled,
    /// Ctrl+C or SIGTERM
    Interrupted,
}

/// Run the capture flow, interactively or as a single automatic pass
pub async fn run_capture(options: CaptureOptions) -> ExitCode {
    let mut presenter = Presenter::new();
    let flow = build_flow(&options);
    debug!(api_url = %options.api_url, auto = options.auto, "capture flow ready");

    let code = if options.auto {
        run_auto(&flow, &options, &mut presenter).await
    } else {
        run_interactive(&flow, &options, &mut presenter).await
    };

    flow.reset().await;
    ExitCode::from(code)
}

fn build_flow(options: &CaptureOptions) -> Flow {
    let camera: Box<dyn CameraDevice> = match &options.from_file {
        Some(path) => Box::new(StillImageCamera::new(path)),
        None => Box::new(FfmpegCamera::new(
            &options.rear_device,
            &options.front_device,
        )),
    };

    CaptureFlow::new(
        camera,
        JpegPhotoEncoder::new(),
        HttpInvoiceAnalyzer::new(&options.api_url),
    )
}

/// Open, wait for a frame, capture and send, without prompting
async fn run_auto(flow: &Flow, options: &CaptureOptions, presenter: &mut Presenter) -> u8 {
    let outcome = tokio::select! {
        code = auto_pass(flow, options, presenter) => Some(code),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(code) => code,
        None => {
            presenter.stop_spinner();
            flow.reset().await;
            interrupted(presenter)
        }
    }
}

async fn auto_pass(flow: &Flow, options: &CaptureOptions, presenter: &mut Presenter) -> u8 {
    presenter.start_spinner("Requesting camera access...");
    let opened = flow.start_capture().await;
    if !report_open(flow, presenter, opened).await {
        return EXIT_ERROR;
    }

    presenter.start_spinner("Waiting for the first frame...");
    match flow.wait_until_ready(options.ready_timeout).await {
        Ok(true) => presenter.stop_spinner(),
        Ok(false) => {
            presenter.spinner_fail(CaptureError::Unready.user_message());
            return EXIT_ERROR;
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            return EXIT_ERROR;
        }
    }

    if !take_photo(flow, options, presenter).await {
        return EXIT_ERROR;
    }

    presenter.start_spinner("Analyzing invoice...");
    let uploaded = flow.upload_photo().await;
    report_upload(flow, options, presenter, uploaded).await
}

/// Prompt-driven loop. Returns when the user quits, stdin closes or an
/// interrupt arrives.
async fn run_interactive(flow: &Flow, options: &CaptureOptions, presenter: &mut Presenter) -> u8 {
    let mut input = match InputHandler::new() {
        Ok(input) => input,
        Err(e) => {
            presenter.error(&format!("Failed to read input: {}", e));
            return EXIT_ERROR;
        }
    };

    presenter.info("Photograph an invoice to extract its data");
    let mut code = EXIT_SUCCESS;

    loop {
        let state = flow.state().await;
        presenter.prompt(state);

        let command = match input.recv().await {
            InputEvent::Command(command) => command,
            InputEvent::Interrupt => return interrupted(presenter),
            InputEvent::Closed => return code,
        };

        match (state, command) {
            (
                FlowState::Initial | FlowState::Success | FlowState::Error,
                UserCommand::Confirm,
            ) => {
                flow.reset().await;
                if open_camera(flow, presenter, &mut input).await.is_err() {
                    return interrupted(presenter);
                }
            }
            (
                FlowState::Initial | FlowState::Success | FlowState::Error,
                UserCommand::Quit,
            ) => return EXIT_SUCCESS,
            (FlowState::Camera, UserCommand::Confirm) => {
                take_photo(flow, options, presenter).await;
            }
            (FlowState::Camera, UserCommand::Cancel) => match flow.close_camera().await {
                Ok(_) => presenter.info("Camera closed"),
                Err(e) => presenter.warn(&e.to_string()),
            },
            (FlowState::Preview, UserCommand::Send) => {
                presenter.start_spinner("Analyzing invoice...");
                match until_cancelled(flow.upload_photo(), &mut input, false).await {
                    Ok(uploaded) => {
                        report_upload(flow, options, presenter, uploaded).await;
                    }
                    Err(_) => {
                        presenter.stop_spinner();
                        return interrupted(presenter);
                    }
                }
            }
            (FlowState::Preview, UserCommand::Retake) => {
                if let Err(e) = flow.discard_photo().await {
                    presenter.warn(&e.to_string());
                    continue;
                }
                if open_camera(flow, presenter, &mut input).await.is_err() {
                    return interrupted(presenter);
                }
            }
            (_, UserCommand::Unknown(text)) => {
                presenter.warn(&format!("Unknown command '{}'", text));
            }
            (state, command) => {
                debug!(%state, ?command, "command ignored");
            }
        }

        code = match flow.state().await {
            FlowState::Error => EXIT_ERROR,
            FlowState::Success => EXIT_SUCCESS,
            _ => code,
        };
    }
}

/// Request the camera, letting the user cancel with `c`
async fn open_camera(
    flow: &Flow,
    presenter: &mut Presenter,
    input: &mut InputHandler,
) -> Result<(), ()> {
    presenter.start_spinner("Requesting camera access... [c] cancel");

    match until_cancelled(flow.start_capture(), input, true).await {
        Ok(opened) => {
            report_open(flow, presenter, opened).await;
            Ok(())
        }
        Err(Interruption::Cancelled) => {
            flow.reset().await;
            presenter.spinner_fail("Camera request cancelled");
            Ok(())
        }
        Err(Interruption::Interrupted) => {
            presenter.stop_spinner();
            Err(())
        }
    }
}

/// Drive `fut` to completion unless an interrupt (or `c`, when
/// `cancellable`) arrives first. Other input is held for the prompt
/// that follows.
async fn until_cancelled<F: Future>(
    fut: F,
    input: &mut InputHandler,
    cancellable: bool,
) -> Result<F::Output, Interruption> {
    tokio::pin!(fut);

    loop {
        tokio::select! {
            output = &mut fut => return Ok(output),
            event = input.recv_live(), if !input.is_closed() => match event {
                InputEvent::Interrupt => return Err(Interruption::Interrupted),
                InputEvent::Command(UserCommand::Cancel) if cancellable => {
                    return Err(Interruption::Cancelled);
                }
                other => {
                    debug!(?other, "input held while busy");
                    input.hold(other);
                }
            },
        }
    }
}

/// Finish the camera spinner. Returns whether the camera is open.
async fn report_open(
    flow: &Flow,
    presenter: &mut Presenter,
    opened: Result<FlowState, FlowError>,
) -> bool {
    match opened {
        Ok(FlowState::Camera) => {
            presenter.spinner_success("Camera open");
            true
        }
        Ok(FlowState::Initial) => {
            presenter.stop_spinner();
            false
        }
        Ok(_) => {
            presenter.spinner_fail("Camera unavailable");
            show_error(flow, presenter).await;
            false
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            false
        }
    }
}

/// Capture a still. Returns whether a photo is ready to send.
async fn take_photo(flow: &Flow, options: &CaptureOptions, presenter: &Presenter) -> bool {
    match flow.capture_photo().await {
        Ok(FlowState::Preview) => {
            if let Some(photo) = flow.snapshot().await.photo {
                presenter.photo_preview(&photo);
                if let Some(path) = &options.save_photo {
                    save_photo(path, &photo, presenter).await;
                }
            }
            true
        }
        Ok(_) => {
            show_error(flow, presenter).await;
            false
        }
        Err(e) => {
            presenter.warn(&e.to_string());
            false
        }
    }
}

async fn save_photo(path: &Path, photo: &CapturedPhoto, presenter: &Presenter) {
    match tokio::fs::write(path, photo.bytes()).await {
        Ok(()) => presenter.info(&format!("Photo saved to {}", path.display())),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "saving photo failed");
            presenter.warn(&format!("Could not save photo to {}: {}", path.display(), e));
        }
    }
}

/// Finish the upload spinner and print the outcome
async fn report_upload(
    flow: &Flow,
    options: &CaptureOptions,
    presenter: &mut Presenter,
    uploaded: Result<FlowState, FlowError>,
) -> u8 {
    match uploaded {
        Ok(FlowState::Success) => {
            presenter.spinner_success("Invoice analyzed");
            if let Some(result) = flow.snapshot().await.result {
                print_result(&result, options, presenter);
            }
            EXIT_SUCCESS
        }
        Ok(FlowState::Error) => {
            presenter.spinner_fail("Analysis failed");
            show_error(flow, presenter).await;
            EXIT_ERROR
        }
        Ok(_) => {
            presenter.stop_spinner();
            EXIT_ERROR
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            EXIT_ERROR
        }
    }
}

fn print_result(result: &AnalysisResult, options: &CaptureOptions, presenter: &Presenter) {
    if !options.json {
        presenter.analysis_result(result);
        return;
    }

    match serde_json::to_string_pretty(result) {
        Ok(json) => presenter.output(&json),
        Err(e) => presenter.error(&format!("Failed to serialize result: {}", e)),
    }
}

async fn show_error(flow: &Flow, presenter: &Presenter) {
    if let Some(info) = flow.snapshot().await.error {
        presenter.error_panel(&info);
    }
}

fn interrupted(presenter: &Presenter) -> u8 {
    eprintln!();
    presenter.warn("Interrupted");
    EXIT_ERROR
}

/// Load and merge configuration from file and CLI.
/// `INVOICE_API_URL` reaches here through the CLI layer.
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    XdgConfigStore::new().load_layered(cli_config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::{mpsc, oneshot};

    #[tokio::test]
    async fn cancel_stops_a_pending_step() {
        let (tx, rx) = mpsc::channel(4);
        let mut input = InputHandler::with_receiver(rx);
        tx.send(InputEvent::Command(UserCommand::Cancel)).await.unwrap();

        let outcome = until_cancelled(std::future::pending::<()>(), &mut input, true).await;
        assert!(matches!(outcome, Err(Interruption::Cancelled)));
    }

    #[tokio::test]
    async fn interrupt_stops_a_step_that_cannot_be_cancelled() {
        let (tx, rx) = mpsc::channel(4);
        let mut input = InputHandler::with_receiver(rx);
        tx.send(InputEvent::Command(UserCommand::Cancel)).await.unwrap();
        tx.send(InputEvent::Interrupt).await.unwrap();

        let outcome = until_cancelled(std::future::pending::<()>(), &mut input, false).await;
        assert!(matches!(outcome, Err(Interruption::Interrupted)));
        assert_eq!(input.recv().await, InputEvent::Command(UserCommand::Cancel));
    }

    #[tokio::test]
    async fn input_during_a_step_is_replayed_afterwards() {
        let (tx, rx) = mpsc::channel(4);
        let mut input = InputHandler::with_receiver(rx);
        let (done_tx, done_rx) = oneshot::channel::<u8>();

        let typing = tokio::spawn(async move {
            tx.send(InputEvent::Command(UserCommand::Confirm)).await.unwrap();
            tx.send(InputEvent::Command(UserCommand::Send)).await.unwrap();
            tx.send(InputEvent::Closed).await.unwrap();
            // Let the step see all three lines before it finishes
            tokio::task::yield_now().await;
            done_tx.send(7).unwrap();
        });

        let step = async { done_rx.await.unwrap() };
        let outcome = until_cancelled(step, &mut input, true).await;
        typing.await.unwrap();

        assert!(matches!(outcome, Ok(7)));
        assert_eq!(input.recv().await, InputEvent::Command(UserCommand::Confirm));
        assert_eq!(input.recv().await, InputEvent::Command(UserCommand::Send));
        assert_eq!(input.recv().await, InputEvent::Closed);
    }
}
