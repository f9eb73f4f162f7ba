//! Per-capture lifecycle

use serde::{Deserialize, Serialize};

use crate::error::{ClipError, ClipResult};

/// Where a capture is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureState {
    Idle,
    SelectionRequested,
    ContentReceived,
    AwaitingDestination,
    Saving,
    Done,
    Failed,
}

impl CaptureState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, CaptureState::Done | CaptureState::Failed)
    }

    #[must_use]
    pub fn can_transition_to(self, next: CaptureState) -> bool {
        use CaptureState::*;
        match (self, next) {
            (Idle, SelectionRequested) => true,
            // quick-save skips the picker
            (ContentReceived, AwaitingDestination | Saving) => true,
            (SelectionRequested, ContentReceived) => true,
            (AwaitingDestination, Saving) => true,
            (Saving, Done) => true,
            (from, Failed) => !from.is_terminal() && from != Idle,
            _ => false,
        }
    }
}

/// One capture's state, traced on every transition
#[derive(Debug)]
pub struct CaptureLifecycle {
    id: u64,
    state: CaptureState,
}

impl CaptureLifecycle {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: CaptureState::Idle,
        }
    }

    /// Pick a capture back up after the destination picker answered
    #[must_use]
    pub fn resume(id: u64, state: CaptureState) -> Self {
        Self { id, state }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn transition(&mut self, next: CaptureState) -> ClipResult<()> {
        if !self.state.can_transition_to(next) {
            tracing::error!(capture_id = self.id, from = ?self.state, to = ?next, "invalid capture transition");
            return Err(ClipError::Unknown(format!(
                "capture {} cannot move from {:?} to {next:?}",
                self.id, self.state
            )));
        }
        tracing::debug!(capture_id = self.id, from = ?self.state, state = ?next, "capture transition");
        self.state = next;
        Ok(())
    }

    /// Move to `Failed` unless already terminal
    pub fn fail(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        tracing::info!(capture_id = self.id, from = ?self.state, state = ?CaptureState::Failed, "capture failed");
        self.state = CaptureState::Failed;
    }
}
