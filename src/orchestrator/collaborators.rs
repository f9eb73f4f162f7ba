//! Interfaces to the browser-side surfaces the orchestrator drives

use async_trait::async_trait;
use thiserror::Error;

use super::context::ContextTicket;
use super::menu::MenuItem;
use crate::error::ClipResult;
use crate::selection::SelectedContent;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The page-side script is not running in the tab
    #[error("page script is not loaded")]
    NotLoaded,

    #[error("{0}")]
    Failed(String),
}

/// Page-side extractor for one tab
#[async_trait]
pub trait SelectionSource: Send + Sync {
    async fn get_selection(&self) -> Result<SelectedContent, SelectionError>;

    /// Load the extractor into the page
    async fn inject(&self) -> Result<(), SelectionError>;
}

pub trait SettingsSurface: Send + Sync {
    fn open_settings(&self);
}

/// Popup where the user picks "new file" or an existing note
pub trait DestinationSurface: Send + Sync {
    fn open_picker(&self, ticket: ContextTicket) -> ClipResult<()>;
}

pub trait MenuSurface: Send + Sync {
    fn rebuild(&self, items: Vec<MenuItem>);
}
