use std::time::Duration;

use veriscan_foundation::{real_clock, SharedClock};

pub const DEFAULT_DUPLICATE_COOLDOWN: Duration = Duration::from_millis(2000);

/// Suppresses repeat detections of the same code.
///
/// A detection is accepted when the code differs from the last accepted one,
/// or when the cooldown has fully elapsed since that acceptance. A different
/// code is always accepted immediately and becomes the new suppression key.
pub struct DetectionDebouncer {
    cooldown: Duration,
    clock: SharedClock,
    last: Option<LastDetection>,
}

struct LastDetection {
    code: String,
    at: std::time::Instant,
}

impl DetectionDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self::with_clock(cooldown, real_clock())
    }

    pub fn with_clock(cooldown: Duration, clock: SharedClock) -> Self {
        Self {
            cooldown,
            clock,
            last: None,
        }
    }

    /// Returns true when the detection should be delivered to the host.
    pub fn accept(&mut self, code: &str) -> bool {
        let now = self.clock.now();
        if let Some(last) = &self.last {
            if last.code == code && now.duration_since(last.at) < self.cooldown {
                tracing::debug!("Suppressing duplicate detection of {:?}", code);
                return false;
            }
        }
        self.last = Some(LastDetection {
            code: code.to_string(),
            at: now,
        });
        true
    }

    /// Forget the suppression state. Called when a session ends so the next
    /// session can re-detect the same code immediately.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for DetectionDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriscan_foundation::test_clock;

    #[test]
    fn suppresses_repeat_within_cooldown() {
        let clock = test_clock();
        let mut debouncer =
            DetectionDebouncer::with_clock(DEFAULT_DUPLICATE_COOLDOWN, clock.clone());

        assert!(debouncer.accept("CODE-1"));
        assert!(!debouncer.accept("CODE-1"));
        clock.advance(Duration::from_millis(1999));
        assert!(!debouncer.accept("CODE-1"));
    }

    #[test]
    fn accepts_again_at_cooldown_boundary() {
        let clock = test_clock();
        let mut debouncer =
            DetectionDebouncer::with_clock(DEFAULT_DUPLICATE_COOLDOWN, clock.clone());

        assert!(debouncer.accept("CODE-1"));
        clock.advance(Duration::from_millis(2000));
        assert!(debouncer.accept("CODE-1"));
    }

    #[test]
    fn different_code_is_always_accepted() {
        let clock = test_clock();
        let mut debouncer =
            DetectionDebouncer::with_clock(DEFAULT_DUPLICATE_COOLDOWN, clock.clone());

        assert!(debouncer.accept("CODE-1"));
        assert!(debouncer.accept("CODE-2"));
        // CODE-2 is now the suppression key; CODE-1 may fire again at once.
        assert!(debouncer.accept("CODE-1"));
        assert!(!debouncer.accept("CODE-1"));
    }

    #[test]
    fn reset_clears_suppression() {
        let clock = test_clock();
        let mut debouncer =
            DetectionDebouncer::with_clock(DEFAULT_DUPLICATE_COOLDOWN, clock.clone());

        assert!(debouncer.accept("CODE-1"));
        debouncer.reset();
        assert!(debouncer.accept("CODE-1"));
    }
}
