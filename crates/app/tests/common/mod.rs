//! Hand-rolled camera fakes for pipeline integration tests. Unlike the
//! per-method mocks in the camera crate's unit tests, these behave like a
//! small stateful camera stack so whole start/scan/stop cycles can run
//! against them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use veriscan_camera::{
    MediaDevices, MediaStream, StreamConstraints, VideoDeviceInfo, VideoSink,
};
use veriscan_foundation::{CameraError, FrameBuffer};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

pub struct FakeStream {
    id: String,
    stopped: AtomicBool,
}

impl FakeStream {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl MediaStream for FakeStream {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn is_live(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    fn stop_tracks(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

pub struct FakeDevices {
    devices: Vec<VideoDeviceInfo>,
    open_error: Mutex<Option<CameraError>>,
    acquire_delay: Duration,
    pub opens: AtomicU64,
    pub enumerations: AtomicU64,
    pub streams: Mutex<Vec<Arc<FakeStream>>>,
}

impl FakeDevices {
    fn base() -> Self {
        Self {
            devices: vec![VideoDeviceInfo {
                id: "cam-back".into(),
                label: "Back Camera".into(),
            }],
            open_error: Mutex::new(None),
            acquire_delay: Duration::ZERO,
            opens: AtomicU64::new(0),
            enumerations: AtomicU64::new(0),
            streams: Mutex::new(Vec::new()),
        }
    }

    pub fn with_back_camera() -> Arc<Self> {
        Arc::new(Self::base())
    }

    pub fn failing_with(error: CameraError) -> Arc<Self> {
        let devices = Self::base();
        *devices.open_error.lock() = Some(error);
        Arc::new(devices)
    }

    /// Same as [`with_back_camera`], but `open` takes `delay` of virtual
    /// time, leaving a window for a stop to land mid-acquisition.
    ///
    /// [`with_back_camera`]: FakeDevices::with_back_camera
    pub fn slow(delay: Duration) -> Arc<Self> {
        let mut devices = Self::base();
        devices.acquire_delay = delay;
        Arc::new(devices)
    }

    pub fn last_stream(&self) -> Arc<FakeStream> {
        self.streams
            .lock()
            .last()
            .cloned()
            .expect("no stream was opened")
    }
}

#[async_trait]
impl MediaDevices for FakeDevices {
    async fn enumerate(&self) -> Result<Vec<VideoDeviceInfo>, CameraError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        Ok(self.devices.clone())
    }

    async fn open(
        &self,
        _constraints: StreamConstraints,
    ) -> Result<Arc<dyn MediaStream>, CameraError> {
        if !self.acquire_delay.is_zero() {
            tokio::time::sleep(self.acquire_delay).await;
        }
        let n = self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.open_error.lock().clone() {
            return Err(error);
        }
        let stream = FakeStream::new(&format!("fake-stream-{}", n));
        self.streams.lock().push(Arc::clone(&stream));
        Ok(stream)
    }
}

pub struct FakeSink {
    source: Mutex<Option<Arc<dyn MediaStream>>>,
    paused: AtomicBool,
    inline_muted: AtomicBool,
    dimensions: Mutex<(u32, u32)>,
    enough_data: AtomicBool,
    copy_error: Mutex<Option<CameraError>>,
    pub plays: AtomicU64,
}

impl FakeSink {
    pub fn ready() -> Arc<Self> {
        Arc::new(Self {
            source: Mutex::new(None),
            paused: AtomicBool::new(true),
            inline_muted: AtomicBool::new(false),
            dimensions: Mutex::new((640, 480)),
            enough_data: AtomicBool::new(true),
            copy_error: Mutex::new(None),
            plays: AtomicU64::new(0),
        })
    }

    pub fn without_frames() -> Arc<Self> {
        let sink = Self::ready();
        *sink.dimensions.lock() = (0, 0);
        sink.enough_data.store(false, Ordering::SeqCst);
        sink
    }

    pub fn set_dimensions(&self, width: u32, height: u32) {
        *self.dimensions.lock() = (width, height);
        self.enough_data.store(width > 0 && height > 0, Ordering::SeqCst);
    }

    /// Make the next frame grab fail once.
    pub fn fail_next_copy(&self, error: CameraError) {
        *self.copy_error.lock() = Some(error);
    }

    pub fn drop_source(&self) {
        *self.source.lock() = None;
    }

    pub fn is_inline_muted(&self) -> bool {
        self.inline_muted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoSink for FakeSink {
    fn set_source(&self, stream: Arc<dyn MediaStream>) {
        *self.source.lock() = Some(stream);
    }

    fn clear_source(&self) {
        *self.source.lock() = None;
    }

    fn has_source(&self) -> bool {
        self.source.lock().is_some()
    }

    fn set_inline_muted(&self) {
        self.inline_muted.store(true, Ordering::SeqCst);
    }

    async fn play(&self) -> Result<(), CameraError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn dimensions(&self) -> (u32, u32) {
        *self.dimensions.lock()
    }

    fn has_enough_data(&self) -> bool {
        self.enough_data.load(Ordering::SeqCst)
    }

    fn copy_frame(&self, frame: &mut FrameBuffer) -> Result<(), CameraError> {
        if let Some(error) = self.copy_error.lock().take() {
            return Err(error);
        }
        let (width, height) = *self.dimensions.lock();
        debug_assert_eq!((frame.width(), frame.height()), (width, height));
        frame.pixels_mut().fill(0x7F);
        Ok(())
    }
}
