use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Camera permission denied. Please allow camera access and try again.")]
    PermissionDenied,

    #[error("No camera device found on this device.")]
    NoDevice,

    #[error("Camera is already in use by another application.")]
    DeviceBusy,

    #[error("The camera does not support the requested constraints.")]
    ConstraintsUnsupported,

    #[error("Camera access is not supported on this platform.")]
    Unavailable,

    #[error("Camera start was interrupted")]
    Interrupted,

    #[error("Playback start was aborted: {0}")]
    PlaybackAborted(String),

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("Frame grab failed: {0}")]
    FrameGrab(String),

    #[error("Camera acquisition failed: {0}")]
    Acquisition(String),
}

impl CameraError {
    /// Map a platform acquisition error name onto the taxonomy.
    ///
    /// Device-media backends report failures by name rather than by type;
    /// the names here are the stable ones shared across platforms.
    pub fn from_platform_name(name: &str, detail: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                CameraError::PermissionDenied
            }
            "NotFoundError" | "DevicesNotFoundError" => CameraError::NoDevice,
            "NotReadableError" | "TrackStartError" => CameraError::DeviceBusy,
            "OverconstrainedError" | "ConstraintNotSatisfiedError" => {
                CameraError::ConstraintsUnsupported
            }
            "AbortError" => CameraError::Interrupted,
            _ => CameraError::Acquisition(format!("{}: {}", name, detail)),
        }
    }

    /// Whether this error should fail the current start attempt and be
    /// reported to the host. `Interrupted` unwinds silently: the host's own
    /// supervision is expected to retry.
    pub fn is_fatal_to_start(&self) -> bool {
        !matches!(self, CameraError::Interrupted)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("No barcode found in frame")]
    NotFound,

    #[error("Decode timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transient decode error, will retry: {0}")]
    Transient(String),

    #[error("Decode failed: {0}")]
    Fatal(String),
}

impl DecodeError {
    /// Expected misses are looped past without a user-visible error.
    pub fn is_expected_miss(&self) -> bool {
        matches!(self, DecodeError::NotFound | DecodeError::Timeout(_))
    }
}

/// Recognize frame-geometry races that occur when the video's dimensions
/// change between a readiness check and the frame extraction.
///
/// Known fragility: this matches undocumented platform error text. Platforms
/// with typed media errors should map onto `DecodeError::Transient` directly
/// instead of relying on this allow-list.
pub fn is_transient_frame_error(message: &str) -> bool {
    const TRANSIENT_MARKERS: &[&str] = &[
        "IndexSizeError",
        "InvalidStateError",
        "source width is 0",
        "source height is 0",
        "The HTMLVideoElement is in an invalid state",
    ];
    TRANSIENT_MARKERS.iter().any(|m| message.contains(m))
}
