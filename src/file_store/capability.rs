//! Capability repository
//!
//! Folder handles are kept apart from plain settings: a handle is a grant, not
//! a preference, and it is looked up by a fixed logical id.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::handle::{FolderHandle, PermissionState};
use crate::config::store::{read_json_object, write_json_object};
use crate::config::{ClipConfig, ConfigStore};
use crate::error::{ClipError, ClipResult};
use crate::utils::TARGET_FOLDER_ID;

/// Storage for folder capabilities
#[async_trait]
pub trait CapabilityStore: Send + Sync {
    async fn put(&self, id: &str, handle: FolderHandle) -> ClipResult<()>;
    async fn get(&self, id: &str) -> ClipResult<Option<FolderHandle>>;
}

/// Capabilities persisted as `{ id: { path, name } }` in a JSON file
pub struct JsonCapabilityStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonCapabilityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl CapabilityStore for JsonCapabilityStore {
    async fn put(&self, id: &str, handle: FolderHandle) -> ClipResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut all: Map<String, Value> = read_json_object(&self.path).await?;
        all.insert(id.to_string(), serde_json::to_value(&handle)?);
        write_json_object(&self.path, &all).await
    }

    async fn get(&self, id: &str) -> ClipResult<Option<FolderHandle>> {
        let mut all = read_json_object(&self.path).await?;
        match all.remove(id) {
            Some(value) => match serde_json::from_value::<FolderHandle>(value) {
                Ok(handle) => Ok(Some(handle)),
                Err(e) => {
                    log::warn!("Ignoring unreadable capability record '{id}': {e}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}

/// In-memory capability store
#[derive(Default)]
pub struct MemoryCapabilityStore {
    handles: Mutex<HashMap<String, FolderHandle>>,
}

impl MemoryCapabilityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CapabilityStore for MemoryCapabilityStore {
    async fn put(&self, id: &str, handle: FolderHandle) -> ClipResult<()> {
        self.handles.lock().await.insert(id.to_string(), handle);
        Ok(())
    }

    async fn get(&self, id: &str) -> ClipResult<Option<FolderHandle>> {
        Ok(self.handles.lock().await.get(id).cloned())
    }
}

/// One-shot interactive folder chooser; `None` means the user cancelled
#[async_trait]
pub trait FolderPicker: Send + Sync {
    async fn pick_folder(&self) -> Option<PathBuf>;
}

/// Picker that always answers with a path chosen elsewhere
pub struct FixedFolderPicker(pub PathBuf);

#[async_trait]
impl FolderPicker for FixedFolderPicker {
    async fn pick_folder(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Let the user choose the notes folder and remember it.
///
/// Returns `Ok(None)` when the picker was cancelled.
pub async fn select_target_folder(
    picker: &dyn FolderPicker,
    capabilities: &dyn CapabilityStore,
    config_store: &dyn ConfigStore,
) -> ClipResult<Option<FolderHandle>> {
    let Some(path) = picker.pick_folder().await else {
        log::info!("Folder selection cancelled");
        return Ok(None);
    };

    if !path.is_absolute() {
        return Err(ClipError::InvalidInput(format!(
            "folder path must be absolute: {}",
            path.display()
        )));
    }

    let handle = FolderHandle::new(path);
    if handle.request_access().await != PermissionState::Granted {
        return Err(ClipError::PermissionDenied(format!(
            "cannot write to folder '{}'",
            handle.name()
        )));
    }

    capabilities.put(TARGET_FOLDER_ID, handle.clone()).await?;

    let mut config = ClipConfig::load(config_store).await;
    config.folder_name = Some(handle.name().to_string());
    config.save(config_store).await?;

    log::info!("Target folder set to {}", handle.path().display());
    Ok(Some(handle))
}

/// The configured notes folder, if any
pub async fn target_folder(capabilities: &dyn CapabilityStore) -> ClipResult<Option<FolderHandle>> {
    capabilities.get(TARGET_FOLDER_ID).await
}
