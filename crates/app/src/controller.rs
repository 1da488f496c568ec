use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use veriscan_camera::{CameraSession, MediaDevices, VideoSink};
use veriscan_decode::BarcodeDecoder;
use veriscan_foundation::{ScannerState, ScannerStateMachine};
use veriscan_telemetry::ScannerMetrics;

use crate::config::ScannerConfig;
use crate::events::ScannerEvent;
use crate::worker::{Command, ScannerWorker};

const COMMAND_QUEUE_DEPTH: usize = 16;
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Host-facing handle to the scanner pipeline.
///
/// Spawns the worker task at construction and keeps only what the host
/// needs: the command queue, the state machine for guards, and the event
/// broadcaster. Dropping the controller (or calling [`shutdown`]) closes the
/// queue, which makes the worker release any live session and exit.
///
/// [`shutdown`]: ScannerController::shutdown
pub struct ScannerController {
    cmd_tx: mpsc::Sender<Command>,
    state: Arc<ScannerStateMachine>,
    stop_requested: Arc<AtomicBool>,
    events: broadcast::Sender<ScannerEvent>,
    metrics: ScannerMetrics,
    handle: JoinHandle<()>,
}

impl ScannerController {
    pub fn spawn(
        config: ScannerConfig,
        devices: Arc<dyn MediaDevices>,
        sink: Arc<dyn VideoSink>,
        decoder: Box<dyn BarcodeDecoder>,
    ) -> Self {
        let state = Arc::new(ScannerStateMachine::new());
        let stop_requested = Arc::new(AtomicBool::new(false));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let metrics = ScannerMetrics::default();

        let worker = ScannerWorker::new(
            config,
            CameraSession::new(devices, sink),
            decoder,
            Arc::clone(&state),
            Arc::clone(&stop_requested),
            events.clone(),
            metrics.clone(),
        );
        let handle = tokio::spawn(worker.run(cmd_rx));

        Self {
            cmd_tx,
            state,
            stop_requested,
            events,
            metrics,
            handle,
        }
    }

    /// Begin a scanning session. No-op while one is already starting or
    /// active; the state machine's compare-and-set guard makes overlapping
    /// triggers collapse into a single acquisition.
    pub async fn start(&self) {
        if !self.state.try_begin_start() {
            return;
        }
        // A deferred stop aimed at an earlier session must not abort this one.
        self.stop_requested.store(false, Ordering::SeqCst);
        if self.cmd_tx.send(Command::Start).await.is_err() {
            tracing::error!("Scanner worker is gone; cannot start");
            let _ = self.state.transition(ScannerState::Idle);
        }
    }

    /// End the session and release the camera.
    ///
    /// While a start is mid-acquisition this only records the request; the
    /// start sequence notices the flag at its next checkpoint and unwinds
    /// itself, so a half-acquired session is never torn down from outside.
    pub async fn stop(&self) {
        if self.state.is_starting() {
            tracing::debug!("Stop requested during start; deferring");
            self.stop_requested.store(true, Ordering::SeqCst);
            // The start may have finished (and consumed nothing) between the
            // state read and the store above. Re-read: if the scanner went
            // Active in that window, the flag alone would only be noticed at
            // the next tick, so send the stop explicitly as well.
            if self.state.is_active() && self.cmd_tx.send(Command::Stop).await.is_err() {
                tracing::error!("Scanner worker is gone; cannot stop");
            }
            return;
        }
        if !self.state.is_active() {
            return;
        }
        if self.cmd_tx.send(Command::Stop).await.is_err() {
            tracing::error!("Scanner worker is gone; cannot stop");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScannerEvent> {
        self.events.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn state(&self) -> ScannerState {
        self.state.current()
    }

    pub fn metrics(&self) -> &ScannerMetrics {
        &self.metrics
    }

    /// Stop any live session and wait for the worker task to exit.
    pub async fn shutdown(self) {
        drop(self.cmd_tx);
        if let Err(e) = self.handle.await {
            tracing::error!("Scanner worker panicked: {}", e);
        }
    }
}
