use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared metrics for cross-task scanner monitoring.
///
/// Counters are plain relaxed atomics; the decode loop is the only writer
/// for most of them, but the host may read from any thread.
#[derive(Clone)]
pub struct ScannerMetrics {
    // Poll loop
    pub ticks: Arc<AtomicU64>,
    pub skipped_ticks: Arc<AtomicU64>,
    pub tick_fps: Arc<AtomicU64>, // FPS * 10

    // Decode attempts
    pub decode_attempts: Arc<AtomicU64>,
    pub decode_misses: Arc<AtomicU64>,
    pub decode_timeouts: Arc<AtomicU64>,
    pub transient_errors: Arc<AtomicU64>,
    pub scan_errors: Arc<AtomicU64>,

    // Detections
    pub detections: Arc<AtomicU64>,
    pub duplicates_suppressed: Arc<AtomicU64>,
    pub last_detection_time: Arc<RwLock<Option<Instant>>>,

    // Session lifecycle
    pub sessions_started: Arc<AtomicU64>,
    pub sessions_released: Arc<AtomicU64>,
    pub start_failures: Arc<AtomicU64>,
    pub interrupted_starts: Arc<AtomicU64>,
}

impl Default for ScannerMetrics {
    fn default() -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
            skipped_ticks: Arc::new(AtomicU64::new(0)),
            tick_fps: Arc::new(AtomicU64::new(0)),

            decode_attempts: Arc::new(AtomicU64::new(0)),
            decode_misses: Arc::new(AtomicU64::new(0)),
            decode_timeouts: Arc::new(AtomicU64::new(0)),
            transient_errors: Arc::new(AtomicU64::new(0)),
            scan_errors: Arc::new(AtomicU64::new(0)),

            detections: Arc::new(AtomicU64::new(0)),
            duplicates_suppressed: Arc::new(AtomicU64::new(0)),
            last_detection_time: Arc::new(RwLock::new(None)),

            sessions_started: Arc::new(AtomicU64::new(0)),
            sessions_released: Arc::new(AtomicU64::new(0)),
            start_failures: Arc::new(AtomicU64::new(0)),
            interrupted_starts: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl ScannerMetrics {
    pub fn increment_ticks(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_skipped_ticks(&self) {
        self.skipped_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_decode_attempts(&self) {
        self.decode_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_decode_misses(&self) {
        self.decode_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_decode_timeouts(&self) {
        self.decode_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transient_errors(&self) {
        self.transient_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_scan_errors(&self) {
        self.scan_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detection(&self) {
        self.detections.fetch_add(1, Ordering::Relaxed);
        *self.last_detection_time.write() = Some(Instant::now());
    }

    pub fn increment_duplicates_suppressed(&self) {
        self.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sessions_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sessions_released(&self) {
        self.sessions_released.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_start_failures(&self) {
        self.start_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_interrupted_starts(&self) {
        self.interrupted_starts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_tick_fps(&self, fps: f64) {
        self.tick_fps.store((fps * 10.0) as u64, Ordering::Relaxed);
    }
}

#[derive(Debug)]
pub struct FpsTracker {
    last_update: Instant,
    frame_count: u64,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed >= Duration::from_secs(1) {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.last_update = Instant::now();
            self.frame_count = 0;
            Some(fps)
        } else {
            None
        }
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}
