use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

use veriscan_camera::CameraSession;
use veriscan_decode::{BarcodeDecoder, DetectionDebouncer};
use veriscan_foundation::{
    is_transient_frame_error, CameraError, DecodeError, FrameBuffer, ScannerState,
    ScannerStateMachine,
};
use veriscan_telemetry::{FpsTracker, ScannerMetrics};

use crate::config::ScannerConfig;
use crate::events::ScannerEvent;

#[derive(Debug)]
pub(crate) enum Command {
    Start,
    Stop,
}

/// The single task that owns all session state.
///
/// External callers never touch the camera session, the frame buffer, or the
/// debouncer directly; they enqueue commands and the worker processes them in
/// order, interleaved with decode ticks. One owner means no locking in the
/// hot path and no re-entrancy between a tick and a stop.
pub(crate) struct ScannerWorker {
    config: ScannerConfig,
    session: CameraSession,
    decoder: Box<dyn BarcodeDecoder>,
    debouncer: DetectionDebouncer,
    frame: FrameBuffer,
    state: Arc<ScannerStateMachine>,
    stop_requested: Arc<AtomicBool>,
    events: broadcast::Sender<ScannerEvent>,
    metrics: ScannerMetrics,
    fps: FpsTracker,
}

impl ScannerWorker {
    pub(crate) fn new(
        config: ScannerConfig,
        session: CameraSession,
        decoder: Box<dyn BarcodeDecoder>,
        state: Arc<ScannerStateMachine>,
        stop_requested: Arc<AtomicBool>,
        events: broadcast::Sender<ScannerEvent>,
        metrics: ScannerMetrics,
    ) -> Self {
        let debouncer = DetectionDebouncer::new(config.duplicate_cooldown);
        Self {
            config,
            session,
            decoder,
            debouncer,
            frame: FrameBuffer::new(),
            state,
            stop_requested,
            events,
            metrics,
            fps: FpsTracker::new(),
        }
    }

    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(Command::Start) => {
                        self.handle_start().await;
                        // Align the first tick a full interval after start.
                        ticker.reset();
                    }
                    Some(Command::Stop) => self.halt_session(),
                    None => {
                        self.halt_session();
                        tracing::debug!("Scanner worker shutting down");
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if self.state.is_active() {
                        self.tick().await;
                    }
                }
            }
        }
    }

    /// Run the start sequence. The controller has already moved the state
    /// machine to `Starting`, so this task is the sole start in flight.
    async fn handle_start(&mut self) {
        match self.start_session().await {
            Ok(()) => {
                if self.stop_requested.swap(false, Ordering::SeqCst) {
                    // Stop arrived between the last interrupt check and the
                    // transition. Honor it now that resources are held.
                    tracing::info!("Stop requested at start completion; releasing");
                    self.session.release();
                    self.metrics.increment_sessions_released();
                    let _ = self.state.transition(ScannerState::Idle);
                    return;
                }
                if let Err(e) = self.state.transition(ScannerState::Active) {
                    tracing::error!("Start finished in unexpected state: {}", e);
                    self.session.release();
                    return;
                }
                self.metrics.increment_sessions_started();
                let _ = self.events.send(ScannerEvent::StateChange { active: true });
            }
            Err(CameraError::Interrupted) => {
                // Deferred stop or platform abort. Unwind without an error
                // event; the host is expected to retry on its own schedule.
                tracing::info!("Start interrupted; returning to idle");
                self.metrics.increment_interrupted_starts();
                self.session.release();
                let _ = self.state.transition(ScannerState::Idle);
            }
            Err(e) => {
                tracing::warn!("Start failed: {}", e);
                self.metrics.increment_start_failures();
                self.stop_requested.store(false, Ordering::SeqCst);
                self.session.release();
                let _ = self.state.transition(ScannerState::Idle);
                let _ = self.events.send(ScannerEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    async fn start_session(&mut self) -> Result<(), CameraError> {
        let stream = self.session.acquire(&self.config.preferences).await?;
        // The session does not own the stream until attach; stop it here or
        // the tracks leak when the start unwinds.
        if let Err(e) = self.check_interrupted() {
            stream.stop_tracks();
            return Err(e);
        }
        self.session.attach(stream).await?;
        self.check_interrupted()?;
        self.session.wait_until_ready(self.config.ready_timeout).await;
        self.check_interrupted()?;
        Ok(())
    }

    /// The start sequence re-checks the deferred-stop flag after every await
    /// and self-aborts if a stop arrived while it was suspended.
    fn check_interrupted(&self) -> Result<(), CameraError> {
        if self.stop_requested.swap(false, Ordering::SeqCst) {
            return Err(CameraError::Interrupted);
        }
        Ok(())
    }

    /// Release the camera, clear detection memory, and report idle.
    /// A new session starts with fresh duplicate-suppression memory.
    fn halt_session(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.session.release();
        self.debouncer.reset();
        self.metrics.increment_sessions_released();
        let _ = self.state.transition(ScannerState::Idle);
        let _ = self.events.send(ScannerEvent::StateChange { active: false });
    }

    /// One decode attempt. Runs inline in the worker loop, so at most one
    /// decode is ever in flight.
    async fn tick(&mut self) {
        // A stop can land between the start sequence's final checkpoint and
        // the Active transition; that leaves only the flag set, with no stop
        // command in the queue. Consume it before doing any work.
        if self.stop_requested.swap(false, Ordering::SeqCst) {
            self.halt_session();
            return;
        }

        self.metrics.increment_ticks();
        if let Some(fps) = self.fps.tick() {
            self.metrics.update_tick_fps(fps);
        }

        let sink = Arc::clone(self.session.sink());

        // The host may have reset the sink behind us. Reattach the stream we
        // still own and give the video a tick to recover.
        if !sink.has_source() {
            match self.session.reattach().await {
                Ok(true) => {}
                Ok(false) => tracing::warn!("Sink lost its source and no live stream remains"),
                Err(e) => tracing::warn!("Reattach failed: {}", e),
            }
            self.metrics.increment_skipped_ticks();
            return;
        }

        let (width, height) = sink.dimensions();
        if width == 0 || height == 0 || !sink.has_enough_data() {
            self.metrics.increment_skipped_ticks();
            return;
        }

        if sink.is_paused() {
            if let Err(e) = sink.play().await {
                tracing::warn!("Resume after pause failed: {}", e);
            }
            if sink.is_paused() {
                self.metrics.increment_skipped_ticks();
                return;
            }
        }

        self.frame.resize_to(width, height);
        if let Err(e) = sink.copy_frame(&mut self.frame) {
            self.classify_frame_error(e);
            return;
        }

        self.metrics.increment_decode_attempts();
        let outcome = tokio::time::timeout(
            self.config.decode_timeout,
            self.decoder.decode(&self.frame),
        )
        .await;

        match outcome {
            Err(_) => {
                tracing::debug!("Decode exceeded {:?}", self.config.decode_timeout);
                self.metrics.increment_decode_timeouts();
            }
            Ok(Ok(None)) => self.metrics.increment_decode_misses(),
            Ok(Ok(Some(code))) => self.handle_detection(code),
            Ok(Err(e)) if e.is_expected_miss() => self.metrics.increment_decode_misses(),
            Ok(Err(DecodeError::Transient(msg))) => {
                tracing::debug!("Transient decode error, retrying next tick: {}", msg);
                self.metrics.increment_transient_errors();
            }
            Ok(Err(e)) => {
                tracing::warn!("Decode failed: {}", e);
                self.metrics.increment_scan_errors();
                let _ = self.events.send(ScannerEvent::Error {
                    message: format!("Scan error: {}", e),
                });
            }
        }
    }

    fn handle_detection(&mut self, code: String) {
        if !self.debouncer.accept(&code) {
            self.metrics.increment_duplicates_suppressed();
            return;
        }
        self.metrics.record_detection();
        tracing::info!("Barcode detected: {:?}", code);
        // Single-shot: stop the session first so the handler observes an
        // inactive scanner when the detection arrives.
        self.halt_session();
        let _ = self.events.send(ScannerEvent::Detected { code });
    }

    /// Frame grabs race against the video element resizing; the known
    /// geometry races are logged and retried, anything else is surfaced.
    fn classify_frame_error(&mut self, error: CameraError) {
        let message = error.to_string();
        if is_transient_frame_error(&message) {
            tracing::debug!("Transient frame grab error, retrying next tick: {}", message);
            self.metrics.increment_transient_errors();
        } else {
            tracing::warn!("Frame grab failed: {}", message);
            self.metrics.increment_scan_errors();
            let _ = self.events.send(ScannerEvent::Error {
                message: format!("Scan error: {}", message),
            });
        }
    }
}
