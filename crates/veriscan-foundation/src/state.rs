use crate::error::ScanError;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Starting,
    Active,
}

/// Guarded lifecycle state machine: `Idle -> Starting -> Active -> Idle`,
/// with `Starting -> Idle` for aborted starts. `Starting` is reachable only
/// from `Idle`, which makes double-start structurally impossible.
pub struct ScannerStateMachine {
    state: Arc<RwLock<ScannerState>>,
    state_tx: Sender<ScannerState>,
    state_rx: Receiver<ScannerState>,
}

impl Default for ScannerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScannerStateMachine {
    pub fn new() -> Self {
        let (state_tx, state_rx) = crossbeam_channel::unbounded();
        Self {
            state: Arc::new(RwLock::new(ScannerState::Idle)),
            state_tx,
            state_rx,
        }
    }

    /// Compare-and-set start guard: succeeds only from `Idle`.
    ///
    /// Returns `false` when already starting or active, so overlapping
    /// auto-start and manual-retry triggers collapse into one acquisition.
    pub fn try_begin_start(&self) -> bool {
        let mut current = self.state.write();
        if *current != ScannerState::Idle {
            tracing::debug!("start ignored, scanner is {:?}", *current);
            return false;
        }
        *current = ScannerState::Starting;
        let _ = self.state_tx.send(ScannerState::Starting);
        tracing::info!("State transition: Idle -> Starting");
        true
    }

    pub fn transition(&self, new_state: ScannerState) -> Result<(), ScanError> {
        let mut current = self.state.write();

        let valid = matches!(
            (&*current, &new_state),
            (ScannerState::Idle, ScannerState::Starting)
                | (ScannerState::Starting, ScannerState::Active)
                | (ScannerState::Starting, ScannerState::Idle)
                | (ScannerState::Active, ScannerState::Idle)
        );

        if !valid {
            return Err(ScanError::InvalidTransition(format!(
                "{:?} -> {:?}",
                *current, new_state
            )));
        }

        tracing::info!("State transition: {:?} -> {:?}", *current, new_state);
        *current = new_state;
        let _ = self.state_tx.send(new_state);
        Ok(())
    }

    pub fn current(&self) -> ScannerState {
        *self.state.read()
    }

    pub fn is_active(&self) -> bool {
        *self.state.read() == ScannerState::Active
    }

    pub fn is_starting(&self) -> bool {
        *self.state.read() == ScannerState::Starting
    }

    pub fn subscribe(&self) -> Receiver<ScannerState> {
        self.state_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begins_idle() {
        let sm = ScannerStateMachine::new();
        assert_eq!(sm.current(), ScannerState::Idle);
        assert!(!sm.is_active());
        assert!(!sm.is_starting());
    }

    #[test]
    fn try_begin_start_is_single_winner() {
        let sm = ScannerStateMachine::new();
        assert!(sm.try_begin_start());
        assert!(!sm.try_begin_start());
        assert_eq!(sm.current(), ScannerState::Starting);
    }

    #[test]
    fn full_cycle_transitions() {
        let sm = ScannerStateMachine::new();
        assert!(sm.try_begin_start());
        sm.transition(ScannerState::Active).unwrap();
        assert!(sm.is_active());
        sm.transition(ScannerState::Idle).unwrap();
        assert_eq!(sm.current(), ScannerState::Idle);
    }

    #[test]
    fn aborted_start_returns_to_idle() {
        let sm = ScannerStateMachine::new();
        assert!(sm.try_begin_start());
        sm.transition(ScannerState::Idle).unwrap();
        assert_eq!(sm.current(), ScannerState::Idle);
        // A fresh start is possible after the abort.
        assert!(sm.try_begin_start());
    }

    #[test]
    fn rejects_invalid_transitions() {
        let sm = ScannerStateMachine::new();
        assert!(sm.transition(ScannerState::Active).is_err());
        assert!(sm.try_begin_start());
        sm.transition(ScannerState::Active).unwrap();
        assert!(sm.transition(ScannerState::Starting).is_err());
        assert!(sm.transition(ScannerState::Active).is_err());
    }

    #[test]
    fn subscribers_observe_transitions() {
        let sm = ScannerStateMachine::new();
        let rx = sm.subscribe();
        sm.try_begin_start();
        sm.transition(ScannerState::Active).unwrap();
        assert_eq!(rx.try_recv().unwrap(), ScannerState::Starting);
        assert_eq!(rx.try_recv().unwrap(), ScannerState::Active);
    }
}
