pub mod session;
pub mod traits;

pub use session::{CameraSession, DEFAULT_READY_TIMEOUT, PLAY_MAX_ATTEMPTS, PLAY_RETRY_BACKOFF};
pub use traits::{
    CameraPreferences, Facing, MediaDevices, MediaStream, StreamConstraints, VideoDeviceInfo,
    VideoSink,
};
