//! Capture menu model
//!
//! The browser side renders these items verbatim; clicks come back as the
//! item id and are turned into a [`CaptureTrigger`].

use serde::{Deserialize, Serialize};

use crate::file_store::FileDescriptor;
use crate::utils::constants::QUICK_SAVE_MENU_LIMIT;

pub const MENU_ROOT_ID: &str = "saveToNotes";
pub const MENU_NEW_FILE_ID: &str = "newFile";
pub const MENU_SEPARATOR_ID: &str = "separator";
pub const MENU_MORE_FILES_ID: &str = "moreFiles";
pub const MENU_NO_FILES_ID: &str = "noFiles";
const MENU_FILE_PREFIX: &str = "file_";

/// What started a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CaptureTrigger {
    /// Ask the user for a destination
    SaveSelection,
    /// New note named after the page title
    QuickSaveNew,
    /// Append to the n-th most recently modified note
    QuickSaveExisting { index: usize },
}

impl CaptureTrigger {
    /// Map a clicked menu id back to a trigger
    #[must_use]
    pub fn from_menu_id(id: &str) -> Option<Self> {
        match id {
            MENU_ROOT_ID => Some(CaptureTrigger::SaveSelection),
            MENU_NEW_FILE_ID => Some(CaptureTrigger::QuickSaveNew),
            _ => id
                .strip_prefix(MENU_FILE_PREFIX)
                .and_then(|index| index.parse().ok())
                .map(|index| CaptureTrigger::QuickSaveExisting { index }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    Normal,
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub title: String,
    pub kind: MenuItemKind,
    pub enabled: bool,
}

impl MenuItem {
    fn root() -> Self {
        Self {
            id: MENU_ROOT_ID.to_string(),
            parent_id: None,
            title: "Save to notes".to_string(),
            kind: MenuItemKind::Normal,
            enabled: true,
        }
    }

    fn child(id: impl Into<String>, title: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(MENU_ROOT_ID.to_string()),
            title: title.into(),
            kind: MenuItemKind::Normal,
            enabled,
        }
    }

    fn separator() -> Self {
        Self {
            id: MENU_SEPARATOR_ID.to_string(),
            parent_id: Some(MENU_ROOT_ID.to_string()),
            title: String::new(),
            kind: MenuItemKind::Separator,
            enabled: true,
        }
    }
}

/// Build the menu for the current mode.
///
/// `files` must already be sorted most recent first.
#[must_use]
pub fn build_menu(quick_save_mode: bool, files: &[FileDescriptor]) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::root()];
    if !quick_save_mode {
        return items;
    }

    items.push(MenuItem::child(MENU_NEW_FILE_ID, "New file...", true));
    items.push(MenuItem::separator());

    if files.is_empty() {
        items.push(MenuItem::child(MENU_NO_FILES_ID, "(no files yet)", false));
        return items;
    }

    items.extend(
        files
            .iter()
            .take(QUICK_SAVE_MENU_LIMIT)
            .enumerate()
            .map(|(index, file)| {
                MenuItem::child(format!("{MENU_FILE_PREFIX}{index}"), file.name.clone(), true)
            }),
    );

    if files.len() > QUICK_SAVE_MENU_LIMIT {
        items.push(MenuItem::child(
            MENU_MORE_FILES_ID,
            format!("... and {} more files", files.len() - QUICK_SAVE_MENU_LIMIT),
            false,
        ));
    }

    items
}
