//! Picker context handoff
//!
//! A capture that waits for the destination picker parks its context here.
//! The picker gets back a ticket; only the latest ticket is honoured and it
//! can be claimed once.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::ClipConfig;
use crate::error::{ClipError, ClipResult};
use crate::selection::{PageInfo, SelectedContent};
use crate::utils::constants::PICKER_PREVIEW_MAX_BYTES;
use crate::utils::ensure_markdown_name;
use crate::utils::string_utils::safe_truncate_bytes;

/// Everything needed to finish a capture once the destination is known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerContext {
    pub capture_id: u64,
    pub selected_content: SelectedContent,
    pub page: PageInfo,
    /// Settings as read when the capture started
    pub config: ClipConfig,
}

impl PickerContext {
    /// What the destination picker needs to render, independent of selection size
    #[must_use]
    pub fn summary(&self) -> PickerSummary {
        let text = self.selected_content.text.trim();
        let preview = safe_truncate_bytes(text, PICKER_PREVIEW_MAX_BYTES);
        let title = self.page.title.trim();

        PickerSummary {
            capture_id: self.capture_id,
            page: self.page.clone(),
            config: self.config.clone(),
            suggested_file_name: ensure_markdown_name(if title.is_empty() {
                "untitled"
            } else {
                title
            }),
            text_preview: preview.to_string(),
            text_truncated: preview.len() < text.len(),
            image_count: self.selected_content.images.len(),
        }
    }
}

/// Bounded view of a parked context for the destination picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerSummary {
    pub capture_id: u64,
    pub page: PageInfo,
    pub config: ClipConfig,
    /// Default for "create new"
    pub suggested_file_name: String,
    pub text_preview: String,
    pub text_truncated: bool,
    pub image_count: usize,
}

/// Claim check for a parked context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextTicket {
    pub generation: u64,
}

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    current: Option<(u64, PickerContext)>,
}

/// Holds at most one live [`PickerContext`]
#[derive(Debug, Default)]
pub struct PickerContextSlot {
    state: Mutex<SlotState>,
}

impl PickerContextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a context, superseding whatever was there
    pub async fn store(&self, context: PickerContext) -> ContextTicket {
        let mut state = self.state.lock().await;
        state.generation += 1;
        let generation = state.generation;

        if let Some((old, superseded)) = state.current.replace((generation, context)) {
            tracing::info!(
                capture_id = superseded.capture_id,
                generation = old,
                "picker context superseded"
            );
        }

        ContextTicket { generation }
    }

    /// Read the context without consuming it
    pub async fn peek(&self, ticket: ContextTicket) -> ClipResult<PickerContext> {
        let state = self.state.lock().await;
        match &state.current {
            Some((generation, context)) if *generation == ticket.generation => Ok(context.clone()),
            _ => Err(stale(ticket)),
        }
    }

    /// Take the context out; a second claim with the same ticket fails
    pub async fn claim(&self, ticket: ContextTicket) -> ClipResult<PickerContext> {
        let mut state = self.state.lock().await;
        match state.current.take() {
            Some((generation, context)) if generation == ticket.generation => Ok(context),
            other => {
                state.current = other;
                Err(stale(ticket))
            }
        }
    }

    /// Drop the context if `ticket` is still current
    pub async fn discard(&self, ticket: ContextTicket) -> bool {
        let mut state = self.state.lock().await;
        if matches!(&state.current, Some((generation, _)) if *generation == ticket.generation) {
            state.current = None;
            true
        } else {
            false
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.current.is_none()
    }
}

fn stale(ticket: ContextTicket) -> ClipError {
    ClipError::InvalidInput(format!(
        "capture {} was superseded or already saved",
        ticket.generation
    ))
}
