//! Boundary traits for the device-media API, the live stream handle, and
//! the video rendering sink. The pipeline only ever talks to these traits;
//! platform backends (and test fakes) implement them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use veriscan_foundation::{CameraError, FrameBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Environment,
    User,
}

impl Facing {
    /// Label substrings that suggest a device points the requested way.
    pub fn label_markers(self) -> &'static [&'static str] {
        match self {
            Facing::Environment => &["back", "rear", "environment"],
            Facing::User => &["front", "user", "face"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDeviceInfo {
    pub id: String,
    pub label: String,
}

/// Constraints passed to `MediaDevices::open`. Either a specific device, a
/// facing-mode hint, or neither (any camera, used by the permission probe).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConstraints {
    pub device_id: Option<String>,
    pub facing: Option<Facing>,
}

impl StreamConstraints {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn device(id: &str) -> Self {
        Self {
            device_id: Some(id.to_string()),
            facing: None,
        }
    }

    pub fn facing(facing: Facing) -> Self {
        Self {
            device_id: None,
            facing: Some(facing),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraPreferences {
    pub facing: Facing,
}

impl Default for CameraPreferences {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
        }
    }
}

/// Handle to a live camera stream. The owning `CameraSession` is the only
/// holder allowed to stop its tracks.
pub trait MediaStream: Send + Sync {
    fn id(&self) -> String;
    fn is_live(&self) -> bool;
    fn stop_tracks(&self);
}

/// Device-media API: enumeration and constrained stream acquisition.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// List available video input devices. Returns `CameraError::Unavailable`
    /// when the platform has no camera-access capability at all.
    async fn enumerate(&self) -> Result<Vec<VideoDeviceInfo>, CameraError>;

    async fn open(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Arc<dyn MediaStream>, CameraError>;
}

/// Video rendering sink the stream is attached to. Mirrors the readiness
/// and playback signals the decode loop needs to guard its ticks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSink: Send + Sync {
    fn set_source(&self, stream: Arc<dyn MediaStream>);
    fn clear_source(&self);
    fn has_source(&self) -> bool;

    /// Switch the sink into muted, inline playback mode. Required for
    /// autoplay policies on mobile platforms.
    fn set_inline_muted(&self);

    async fn play(&self) -> Result<(), CameraError>;
    fn pause(&self);
    fn is_paused(&self) -> bool;

    /// Native frame dimensions; (0, 0) until the first frame arrives.
    fn dimensions(&self) -> (u32, u32);

    /// Whether enough data is buffered to draw the current frame.
    fn has_enough_data(&self) -> bool;

    /// Draw the current video frame into the caller's raster buffer. The
    /// buffer must already match the sink's native dimensions.
    fn copy_frame(&self, frame: &mut FrameBuffer) -> Result<(), CameraError>;
}
