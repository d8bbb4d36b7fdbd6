//! End-to-end capture flow tests with real adapters
//!
//! The camera is a still image file and the analysis service a mock server.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use image::{Rgb, RgbImage};
use invoice_snap::application::CaptureFlow;
use invoice_snap::domain::capture::Duration;
use invoice_snap::domain::flow::{ErrorKind, FlowState};
use invoice_snap::infrastructure::{HttpInvoiceAnalyzer, JpegPhotoEncoder, StillImageCamera};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Flow = CaptureFlow<StillImageCamera, JpegPhotoEncoder, HttpInvoiceAnalyzer>;

fn write_invoice_png(dir: &Path) -> PathBuf {
    let path = dir.join("invoice.png");
    RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, 128]))
        .save(&path)
        .unwrap();
    path
}

fn flow(image: PathBuf, server: &MockServer) -> Flow {
    CaptureFlow::new(
        StillImageCamera::new(image),
        JpegPhotoEncoder::new(),
        HttpInvoiceAnalyzer::new(server.uri()),
    )
}

async fn mount_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data":{"company":"Telecom","category":"internet","totalAmount":"12.999,00"}}"#,
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_capture_and_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    mount_success(&server).await;
    let flow = flow(write_invoice_png(dir.path()), &server);

    assert_eq!(flow.start_capture().await.unwrap(), FlowState::Camera);
    assert!(flow.wait_until_ready(Duration::from_secs(1)).await.unwrap());
    assert_eq!(flow.capture_photo().await.unwrap(), FlowState::Preview);

    let preview = flow.snapshot().await;
    assert!(!preview.camera_active);
    let photo = preview.photo.unwrap();
    assert_eq!((photo.width(), photo.height()), (64, 48));
    assert!(photo.data_url().starts_with("data:image/jpeg;base64,"));

    assert_eq!(flow.upload_photo().await.unwrap(), FlowState::Success);

    let done = flow.snapshot().await;
    let result = done.result.unwrap();
    assert_eq!(result.company, "Telecom");
    assert_eq!(result.total_amount.to_string(), "12.999,00");
    assert!(done.error.is_none());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn service_rejection_ends_in_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string(r#"{"error":"The image is not an invoice"}"#),
        )
        .mount(&server)
        .await;
    let flow = flow(write_invoice_png(dir.path()), &server);

    flow.start_capture().await.unwrap();
    flow.capture_photo().await.unwrap();
    assert_eq!(flow.upload_photo().await.unwrap(), FlowState::Error);

    let snapshot = flow.snapshot().await;
    let error = snapshot.error.unwrap();
    assert_eq!(error.kind(), ErrorKind::UploadServerError);
    assert_eq!(error.message(), "The image is not an invoice");
    assert!(snapshot.photo.is_none());

    // Back to the start, then a clean second attempt is possible
    assert_eq!(flow.reset().await, FlowState::Initial);
    assert!(flow.snapshot().await.error.is_none());
    assert_eq!(flow.start_capture().await.unwrap(), FlowState::Camera);
}

#[tokio::test]
async fn missing_image_is_camera_not_found() {
    let server = MockServer::start().await;
    let flow = flow(PathBuf::from("/nonexistent/invoice.png"), &server);

    assert_eq!(flow.start_capture().await.unwrap(), FlowState::Error);

    let error = flow.snapshot().await.error.unwrap();
    assert_eq!(error.kind(), ErrorKind::CameraNotFound);
    assert_eq!(error.message(), "No camera was found on this device.");
}

#[tokio::test]
async fn retake_discards_and_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let flow = flow(write_invoice_png(dir.path()), &server);

    flow.start_capture().await.unwrap();
    flow.capture_photo().await.unwrap();
    assert_eq!(flow.discard_photo().await.unwrap(), FlowState::Initial);
    assert!(flow.snapshot().await.photo.is_none());

    assert_eq!(flow.start_capture().await.unwrap(), FlowState::Camera);
    assert_eq!(flow.capture_photo().await.unwrap(), FlowState::Preview);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reset_during_slow_upload_discards_result() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"{"data":{"company":"Late","category":"x","totalAmount":1}}"#,
                )
                .set_delay(StdDuration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let flow = Arc::new(flow(write_invoice_png(dir.path()), &server));

    flow.start_capture().await.unwrap();
    flow.capture_photo().await.unwrap();

    let upload = {
        let flow = Arc::clone(&flow);
        tokio::spawn(async move { flow.upload_photo().await })
    };

    while flow.state().await != FlowState::Uploading {
        tokio::task::yield_now().await;
    }
    assert_eq!(flow.reset().await, FlowState::Initial);

    assert_eq!(upload.await.unwrap().unwrap(), FlowState::Initial);
    let snapshot = flow.snapshot().await;
    assert_eq!(snapshot.state, FlowState::Initial);
    assert!(snapshot.result.is_none());
}
