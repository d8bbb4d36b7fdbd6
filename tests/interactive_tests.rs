//! Interactive runs of the binary, driven by lines on stdin

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn interactive_cmd(home: &Path, api_url: &str, image: &Path, keys: &str) -> Command {
    let mut cmd = Command::cargo_bin("invoice-snap").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("INVOICE_API_URL", api_url)
        .env("NO_COLOR", "1")
        .arg("--from-file")
        .arg(image)
        .write_stdin(keys);
    cmd
}

fn write_png(dir: &Path) -> PathBuf {
    let path = dir.join("invoice.png");
    RgbImage::from_pixel(40, 30, Rgb([250, 250, 245]))
        .save(&path)
        .unwrap();
    path
}

async fn analysis_server(expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data":{"company":"Personal","category":"mobile","totalAmount":"7.300,00"}}"#,
        ))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn open_capture_send_and_quit() {
    let server = analysis_server(1).await;
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());
    let mut cmd = interactive_cmd(dir.path(), &server.uri(), &image, "\n\ns\nq\n");

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("Personal"))
            .stdout(predicate::str::contains("7.300,00"))
            .stderr(predicate::str::contains("Photo captured: 40x30"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn retake_then_send() {
    let server = analysis_server(1).await;
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());
    let mut cmd = interactive_cmd(dir.path(), &server.uri(), &image, "\n\nr\n\ns\nq\n");

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("Personal"))
            .stderr(predicate::function(|err: &str| {
                err.matches("Photo captured").count() == 2
            }));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closing_the_camera_sends_nothing() {
    let server = analysis_server(0).await;
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());
    let mut cmd = interactive_cmd(dir.path(), &server.uri(), &image, "\nc\nq\n");

    tokio::task::spawn_blocking(move || {
        cmd.assert().success().stdout(predicate::str::is_empty());
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn end_of_input_after_rejection_exits_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string(r#"{"error":"The image is not an invoice"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());
    let mut cmd = interactive_cmd(dir.path(), &server.uri(), &image, "\n\ns\n");

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Upload error: The image is not an invoice"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_input_is_reported() {
    let server = analysis_server(0).await;
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());
    let mut cmd = interactive_cmd(dir.path(), &server.uri(), &image, "scan\nq\n");

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .success()
            .stderr(predicate::str::contains("Unknown command 'scan'"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_image_then_end_of_input() {
    let server = analysis_server(0).await;
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nowhere.png");
    let mut cmd = interactive_cmd(dir.path(), &server.uri(), &missing, "\n");

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .code(1)
            .stderr(predicate::str::contains("Camera error: No camera was found on this device."));
    })
    .await
    .unwrap();
}
