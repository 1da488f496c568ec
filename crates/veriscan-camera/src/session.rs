use std::sync::Arc;
use std::time::Duration;

use veriscan_foundation::CameraError;

use crate::traits::{
    CameraPreferences, Facing, MediaDevices, MediaStream, StreamConstraints, VideoDeviceInfo,
    VideoSink,
};

pub const PLAY_MAX_ATTEMPTS: u32 = 3;
pub const PLAY_RETRY_BACKOFF: Duration = Duration::from_millis(200);
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(2500);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One camera session per start/stop cycle. Owns the media stream
/// exclusively; the video sink is borrowed from the host and reset on every
/// attach so no state bleeds over from a previous session.
pub struct CameraSession {
    devices: Arc<dyn MediaDevices>,
    sink: Arc<dyn VideoSink>,
    stream: Option<Arc<dyn MediaStream>>,
}

impl CameraSession {
    pub fn new(devices: Arc<dyn MediaDevices>, sink: Arc<dyn VideoSink>) -> Self {
        Self {
            devices,
            sink,
            stream: None,
        }
    }

    pub fn sink(&self) -> &Arc<dyn VideoSink> {
        &self.sink
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Acquire a camera stream matching the facing preference.
    ///
    /// Enumerates video inputs first; an empty list triggers a best-effort
    /// permission probe (open and immediately stop a temporary stream, which
    /// surfaces the permission prompt and unlocks device labels on some
    /// platforms) followed by a re-enumeration. Selection prefers a device
    /// whose label suggests the requested facing, then the first listed
    /// device, then a facing-only constraint when no device list is usable.
    pub async fn acquire(
        &self,
        prefs: &CameraPreferences,
    ) -> Result<Arc<dyn MediaStream>, CameraError> {
        let mut list = self.devices.enumerate().await?;

        if list.is_empty() {
            match self.devices.open(StreamConstraints::any()).await {
                Ok(probe) => {
                    probe.stop_tracks();
                    list = self.devices.enumerate().await?;
                }
                Err(CameraError::Unavailable) => return Err(CameraError::Unavailable),
                Err(e) => {
                    tracing::debug!("Permission probe failed: {}", e);
                }
            }
        }

        if let Some(device) = select_device(&list, prefs.facing) {
            tracing::info!("Selected camera device: {} ({})", device.label, device.id);
            return self.devices.open(StreamConstraints::device(&device.id)).await;
        }

        tracing::warn!("No usable device list; falling back to facing-only constraint");
        self.devices.open(StreamConstraints::facing(prefs.facing)).await
    }

    /// Attach the stream to the sink and start playback.
    ///
    /// Play is retried up to 3 times on the aborted failure class, backing
    /// off 200 ms x attempt number between retries; any other playback
    /// failure is fatal to the attach.
    pub async fn attach(&mut self, stream: Arc<dyn MediaStream>) -> Result<(), CameraError> {
        self.sink.clear_source();
        self.sink.pause();
        self.sink.set_inline_muted();
        self.sink.set_source(Arc::clone(&stream));
        // Stored before play so a failed attach still releases the tracks.
        self.stream = Some(stream);
        self.play_with_retry().await
    }

    async fn play_with_retry(&self) -> Result<(), CameraError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.sink.play().await {
                Ok(()) => return Ok(()),
                Err(CameraError::PlaybackAborted(detail)) if attempt < PLAY_MAX_ATTEMPTS => {
                    tracing::warn!(
                        "Playback aborted (attempt {}/{}): {}; retrying",
                        attempt,
                        PLAY_MAX_ATTEMPTS,
                        detail
                    );
                    tokio::time::sleep(PLAY_RETRY_BACKOFF * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Wait until the sink reports non-zero dimensions and enough buffered
    /// data, or until the timeout elapses. Some devices never fire the
    /// expected readiness event, so this never blocks indefinitely and never
    /// fails; a not-yet-ready sink just means early ticks get skipped.
    pub async fn wait_until_ready(&self, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let (w, h) = self.sink.dimensions();
            if w > 0 && h > 0 && self.sink.has_enough_data() {
                return;
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!("Video sink not ready after {:?}; continuing anyway", timeout);
                return;
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Reattach the held stream after the sink lost its source, e.g. when
    /// the host reset the sink behind our back. Returns `false` when there
    /// is no live stream to reattach.
    pub async fn reattach(&self) -> Result<bool, CameraError> {
        let Some(stream) = &self.stream else {
            return Ok(false);
        };
        if !stream.is_live() {
            return Ok(false);
        }
        tracing::info!("Sink lost its source; reattaching live stream");
        self.sink.set_source(Arc::clone(stream));
        self.sink.play().await?;
        Ok(true)
    }

    /// Stop every track on the held stream and clear the sink's source.
    /// Idempotent.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop_tracks();
            tracing::info!("Camera stream released");
        }
        self.sink.clear_source();
    }
}

fn select_device(list: &[VideoDeviceInfo], facing: Facing) -> Option<&VideoDeviceInfo> {
    let markers = facing.label_markers();
    list.iter()
        .find(|d| {
            let label = d.label.to_lowercase();
            markers.iter().any(|m| label.contains(m))
        })
        .or_else(|| list.first())
}
