//! The folder capability
//!
//! A [`FolderHandle`] grants access to exactly one directory. Access can be
//! taken away behind our back (folder deleted, permissions changed), so it is
//! re-validated before every use rather than trusted from when it was stored.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::{ClipError, ClipResult};

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    /// Access is unknown or lapsed; asking again may succeed
    Prompt,
    Denied,
}

/// Read/write capability for one notes folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderHandle {
    path: PathBuf,
    name: String,
}

impl FolderHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name of the folder
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve an immediate child of the folder.
    ///
    /// Anything that would escape the folder or reach into a subfolder is rejected.
    pub fn child(&self, file_name: &str) -> ClipResult<PathBuf> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.path.join(file_name)),
            _ => Err(ClipError::InvalidInput(format!(
                "'{file_name}' is not a plain file name"
            ))),
        }
    }

    /// Passive check: is the folder still there and writable?
    pub async fn check_access(&self) -> PermissionState {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_dir() => {
                if meta.permissions().readonly() {
                    PermissionState::Denied
                } else {
                    PermissionState::Granted
                }
            }
            Ok(_) => PermissionState::Prompt,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                PermissionState::Denied
            }
            Err(_) => PermissionState::Prompt,
        }
    }

    /// Active check: prove write access by creating and removing a probe file
    pub async fn request_access(&self) -> PermissionState {
        let path = self.path.clone();
        let probe = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".clipper-probe-")
                .tempfile_in(&path)
                .and_then(|file| file.close())
        })
        .await;

        match probe {
            Ok(Ok(())) => PermissionState::Granted,
            Ok(Err(e)) => {
                log::warn!("Write probe in {} failed: {e}", self.path.display());
                PermissionState::Denied
            }
            Err(e) => {
                log::error!("Write probe task failed: {e}");
                PermissionState::Denied
            }
        }
    }

    /// Check access, asking again if it lapsed
    pub async fn ensure_access(&self) -> ClipResult<()> {
        if self.check_access().await == PermissionState::Granted {
            return Ok(());
        }
        match self.request_access().await {
            PermissionState::Granted => Ok(()),
            _ => Err(ClipError::PermissionDenied(format!(
                "access to folder '{}' was refused, choose it again in the settings",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_child_accepts_plain_names_only() {
        let handle = FolderHandle::new("/notes");
        assert_eq!(handle.child("a.md").unwrap(), PathBuf::from("/notes/a.md"));
        assert!(handle.child("../a.md").is_err());
        assert!(handle.child("sub/a.md").is_err());
        assert!(handle.child("/etc/passwd").is_err());
        assert!(handle.child("").is_err());
    }

    #[test]
    fn test_name_is_last_component() {
        assert_eq!(FolderHandle::new("/home/me/Vault").name(), "Vault");
    }

    #[tokio::test]
    async fn test_existing_folder_is_granted() {
        let dir = TempDir::new().unwrap();
        let handle = FolderHandle::new(dir.path());
        assert_eq!(handle.check_access().await, PermissionState::Granted);
        assert_eq!(handle.request_access().await, PermissionState::Granted);
        assert!(handle.ensure_access().await.is_ok());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0, "probe removed");
    }

    #[tokio::test]
    async fn test_vanished_folder_needs_prompt_then_fails() {
        let dir = TempDir::new().unwrap();
        let handle = FolderHandle::new(dir.path().join("gone"));
        assert_eq!(handle.check_access().await, PermissionState::Prompt);
        let err = handle.ensure_access().await.unwrap_err();
        assert!(err.needs_settings());
    }
}
