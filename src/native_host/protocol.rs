//! Messages exchanged with the browser extension

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::error::{ClipError, ErrorKind};
use crate::file_store::FileSelection;
use crate::orchestrator::{CaptureTrigger, ContextTicket, MenuItem, Notification, SaveReport};
use crate::selection::{PageInfo, SelectedContent};

/// A request from the extension, tagged by `action`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetConfig,
    /// Partial settings, merged over the stored ones
    SaveConfig { config: Map<String, Value> },
    SetFolder { path: PathBuf },
    GetFolder,
    GetMarkdownFiles,
    Capture {
        trigger: CaptureTrigger,
        page: PageInfo,
        /// Absent when the page script did not answer
        #[serde(default)]
        selection: Option<SelectedContent>,
    },
    GetPickerContext { ticket: ContextTicket },
    SaveToFile {
        ticket: ContextTicket,
        #[serde(rename = "fileSelection")]
        file_selection: FileSelection,
    },
    CancelPicker { ticket: ContextTicket },
    RefreshMenu,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ClipError> for ErrorBody {
    fn from(error: &ClipError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Reply to one request, carrying whatever the core asked the browser to do
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Value>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub notifications: Vec<Notification>,
    /// Replacement capture menu, when it was rebuilt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<Vec<MenuItem>>,
    pub open_settings: bool,
    /// Open the destination picker for this ticket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_picker: Option<ContextTicket>,
}

impl Response {
    #[must_use]
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(error: &ClipError) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Failure standing in for a reply that exceeded the outbound limit.
    ///
    /// Notifications, menu and surface requests raised while handling the
    /// request still reach the extension.
    #[must_use]
    pub fn too_large(self, len: usize) -> Self {
        Self {
            request_id: self.request_id,
            notifications: self.notifications,
            menu: self.menu,
            open_settings: self.open_settings,
            open_picker: self.open_picker,
            ..Self::failure(&ClipError::InvalidInput(format!(
                "response too large ({len} bytes)"
            )))
        }
    }
}

/// `data` of a `capture` response
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CaptureData {
    Saved(SaveReport),
    AwaitingDestination { ticket: ContextTicket },
    NothingSelected,
}
