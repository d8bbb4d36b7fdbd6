//! FFmpeg-based camera adapter
//!
//! Streams raw RGB frames from a V4L2 (Linux) or AVFoundation (macOS)
//! device through an `ffmpeg` child process.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::application::ports::{CameraDevice, CameraError, CameraSession};
use crate::domain::capture::{
    CameraConstraints, Duration, FacingMode, ReadyState, VideoFrame, VideoTrack,
};

/// How long ffmpeg gets to exit after SIGINT before it is killed
const STOP_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

#[cfg(target_os = "macos")]
const INPUT_FORMAT: &str = "avfoundation";

#[cfg(not(target_os = "macos"))]
const INPUT_FORMAT: &str = "v4l2";

/// FFmpeg camera, one device per facing mode
pub struct FfmpegCamera {
    rear_device: String,
    front_device: String,
    open_timeout: Duration,
}

impl FfmpegCamera {
    /// Create a new FFmpeg camera
    pub fn new(rear_device: impl Into<String>, front_device: impl Into<String>) -> Self {
        Self {
            rear_device: rear_device.into(),
            front_device: front_device.into(),
            open_timeout: Duration::default_open_timeout(),
        }
    }

    fn device_for(&self, facing_mode: FacingMode) -> &str {
        match facing_mode {
            FacingMode::Environment => &self.rear_device,
            FacingMode::User => &self.front_device,
        }
    }

    /// Build FFmpeg args for streaming raw frames to stdout
    fn build_ffmpeg_args(device: &str, constraints: &CameraConstraints) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostats".to_string(),
            "-f".to_string(),
            INPUT_FORMAT.to_string(),
            "-video_size".to_string(),
            format!("{}x{}", constraints.width.ideal, constraints.height.ideal),
            "-i".to_string(),
            device.to_string(),
            "-an".to_string(), // Video only
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgb24".to_string(),
            "-".to_string(),
        ]
    }

    /// Spawn FFmpeg process
    fn spawn_ffmpeg(args: &[String]) -> Result<Child, CameraError> {
        Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CameraError::Unsupported
                } else {
                    CameraError::Unknown(format!("Failed to start ffmpeg: {}", e))
                }
            })
    }

    /// Read stderr until ffmpeg announces its output stream.
    ///
    /// Returns the frame size, or the classified error if ffmpeg exits first.
    async fn probe_output_size(
        lines: &mut Lines<BufReader<ChildStderr>>,
    ) -> Result<(u32, u32), CameraError> {
        let mut log = Vec::new();
        let mut in_output = false;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| CameraError::Unknown(e.to_string()))?
        {
            trace!(target: "ffmpeg", "{}", line);

            if line.starts_with("Output #0") {
                in_output = true;
            } else if in_output && line.contains("Video:") {
                if let Some(size) = parse_stream_size(&line) {
                    return Ok(size);
                }
            }
            log.push(line);
        }

        Err(classify_stderr(&log.join("\n")))
    }
}

#[async_trait]
impl CameraDevice for FfmpegCamera {
    fn is_supported(&self) -> bool {
        cfg!(any(target_os = "linux", target_os = "macos")) && ffmpeg_on_path()
    }

    async fn open(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn CameraSession>, CameraError> {
        let device = self.device_for(constraints.facing_mode);
        let args = Self::build_ffmpeg_args(device, constraints);
        debug!(device, args = ?args, "starting ffmpeg");

        let mut child = Self::spawn_ffmpeg(&args)?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CameraError::Unknown("ffmpeg stderr not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CameraError::Unknown("ffmpeg stdout not captured".to_string()))?;
        let mut lines = BufReader::new(stderr).lines();

        let probe = tokio::time::timeout(
            self.open_timeout.as_std(),
            Self::probe_output_size(&mut lines),
        )
        .await;

        let (width, height) = match probe {
            Ok(Ok(size)) => size,
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                return Err(CameraError::Unknown(format!(
                    "{} did not start streaming within {}",
                    device, self.open_timeout
                )));
            }
        };

        if !constraints.allows(width, height) {
            return Err(CameraError::ConstraintsUnsatisfiable(format!(
                "{} streams {}x{}, limit is {}x{}",
                device, width, height, constraints.width.max, constraints.height.max
            )));
        }

        debug!(device, width, height, "camera streaming");

        Ok(Box::new(FfmpegSession::start(
            child,
            stdout,
            lines,
            VideoTrack {
                label: device.to_string(),
                width,
                height,
            },
        )))
    }
}

/// Live ffmpeg stream
pub struct FfmpegSession {
    child: Option<Child>,
    track: VideoTrack,
    ready: Arc<watch::Sender<ReadyState>>,
    latest: Arc<Mutex<Option<VideoFrame>>>,
    streaming: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl FfmpegSession {
    fn start(
        child: Child,
        stdout: ChildStdout,
        mut stderr: Lines<BufReader<ChildStderr>>,
        track: VideoTrack,
    ) -> Self {
        let (ready, _) = watch::channel(ReadyState::HaveMetadata);
        let ready = Arc::new(ready);
        let latest = Arc::new(Mutex::new(None));
        let streaming = Arc::new(AtomicBool::new(true));

        // Drain stderr so ffmpeg never blocks on a full pipe
        tokio::spawn(async move {
            while let Ok(Some(line)) = stderr.next_line().await {
                trace!(target: "ffmpeg", "{}", line);
            }
        });

        let reader = tokio::spawn(read_frames(
            stdout,
            track.width,
            track.height,
            Arc::clone(&ready),
            Arc::clone(&latest),
            Arc::clone(&streaming),
        ));

        Self {
            child: Some(child),
            track,
            ready,
            latest,
            streaming,
            reader,
        }
    }

    /// Send signal to FFmpeg process
    #[cfg(unix)]
    fn send_signal(child: &Child, sig: Signal) {
        if let Some(id) = child.id() {
            if let Err(e) = signal::kill(Pid::from_raw(id as i32), sig) {
                debug!(error = %e, "signal to ffmpeg failed");
            }
        }
    }

    /// Ask ffmpeg to exit, killing it if it lingers
    fn shutdown(mut child: Child) {
        #[cfg(unix)]
        Self::send_signal(&child, Signal::SIGINT);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if tokio::time::timeout(STOP_GRACE, child.wait()).await.is_err() {
                        warn!("ffmpeg ignored SIGINT, killing");
                        let _ = child.kill().await;
                    }
                });
            }
            Err(_) => {
                let _ = child.start_kill();
            }
        }
    }
}

impl CameraSession for FfmpegSession {
    fn video_tracks(&self) -> Vec<VideoTrack> {
        if self.streaming.load(Ordering::SeqCst) {
            vec![self.track.clone()]
        } else {
            Vec::new()
        }
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready.borrow()
    }

    fn ready_signal(&self) -> watch::Receiver<ReadyState> {
        self.ready.subscribe()
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        self.latest.lock().ok().and_then(|frame| frame.clone())
    }

    fn stop(&mut self) {
        if let Some(child) = self.child.take() {
            self.streaming.store(false, Ordering::SeqCst);
            self.reader.abort();
            Self::shutdown(child);
            debug!(device = %self.track.label, "camera stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for FfmpegSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Copy whole frames off ffmpeg's stdout into the latest-frame slot
async fn read_frames(
    mut stdout: ChildStdout,
    width: u32,
    height: u32,
    ready: Arc<watch::Sender<ReadyState>>,
    latest: Arc<Mutex<Option<VideoFrame>>>,
    streaming: Arc<AtomicBool>,
) {
    let frame_len = VideoFrame::expected_len(width, height);

    loop {
        let mut buf = vec![0u8; frame_len];
        if let Err(e) = stdout.read_exact(&mut buf).await {
            debug!(error = %e, "camera stream ended");
            break;
        }

        if let Ok(mut slot) = latest.lock() {
            *slot = Some(VideoFrame::new(width, height, buf));
        }
        if !ready.borrow().has_current_data() {
            ready.send_replace(ReadyState::HaveCurrentData);
        }
    }

    streaming.store(false, Ordering::SeqCst);
}

/// Pull `WxH` out of an ffmpeg stream description line, e.g.
/// `Stream #0:0: Video: rawvideo (RGB[24] / 0x18424752), rgb24, 1280x720, q=2-31`
fn parse_stream_size(line: &str) -> Option<(u32, u32)> {
    let (_, desc) = line.split_once("Video:")?;

    desc.split(',')
        .filter_map(|part| part.split_whitespace().next())
        .find_map(|token| {
            let (w, h) = token.split_once('x')?;
            let w: u32 = w.parse().ok()?;
            let h: u32 = h.parse().ok()?;
            (w > 0 && h > 0).then_some((w, h))
        })
}

/// Map ffmpeg's failure output to a camera error
pub(crate) fn classify_stderr(stderr: &str) -> CameraError {
    let reason = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("ffmpeg exited before streaming")
        .trim()
        .to_string();

    if stderr.contains("Permission denied") || stderr.contains("Operation not permitted") {
        CameraError::PermissionDenied(reason)
    } else if stderr.contains("No such file or directory") || stderr.contains("No such device") {
        CameraError::NotFound(reason)
    } else if stderr.contains("Device or resource busy") {
        CameraError::Busy(reason)
    } else if stderr.contains("Invalid argument") || stderr.contains("not supported") {
        CameraError::ConstraintsUnsatisfiable(reason)
    } else {
        CameraError::Unknown(reason)
    }
}

fn ffmpeg_on_path() -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join("ffmpeg").is_file()))
        .unwrap_or(false)
}
