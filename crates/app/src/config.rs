use serde::{Deserialize, Serialize};
use std::time::Duration;

use veriscan_camera::CameraPreferences;

/// Scanner pipeline tuning.
///
/// Defaults match the production timings: a 2 Hz decode cadence, a 1.5 s
/// per-frame decode budget, a 2 s duplicate window, and a 2.5 s cap on
/// waiting for the first video frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Interval between decode attempts.
    #[serde(with = "duration_ms")]
    pub tick_interval: Duration,

    /// Budget for a single decode before the attempt is abandoned.
    #[serde(with = "duration_ms")]
    pub decode_timeout: Duration,

    /// Window in which a repeat of the last accepted code is suppressed.
    #[serde(with = "duration_ms")]
    pub duplicate_cooldown: Duration,

    /// Maximum wait for the video sink to report readiness after attach.
    #[serde(with = "duration_ms")]
    pub ready_timeout: Duration,

    pub preferences: CameraPreferences,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            decode_timeout: Duration::from_millis(1500),
            duplicate_cooldown: Duration::from_millis(2000),
            ready_timeout: Duration::from_millis(2500),
            preferences: CameraPreferences::default(),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
