//! Real-time barcode scanning pipeline.
//!
//! A [`ScannerController`] owns a background worker task that runs the whole
//! session lifecycle: camera acquisition, sink attachment, a 2 Hz decode
//! loop, duplicate suppression, and teardown. Hosts drive it with `start` /
//! `stop` and observe it through a broadcast event stream.

pub mod config;
pub mod controller;
pub mod events;
mod worker;

pub use config::ScannerConfig;
pub use controller::ScannerController;
pub use events::ScannerEvent;

pub use veriscan_camera::{CameraPreferences, Facing, MediaDevices, MediaStream, VideoSink};
pub use veriscan_decode::BarcodeDecoder;
pub use veriscan_foundation::{ScannerState, ScannerStateMachine};
pub use veriscan_telemetry::ScannerMetrics;
