//! Scoped atomic file writes
//!
//! Content is written to a temporary file next to the target and then moved
//! into place, so a failed write never leaves a truncated note or image behind.
//! All file I/O runs on the blocking pool to keep the async runtime free.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{ClipError, ClipResult};

/// How the final rename treats an existing target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail if the target already exists
    CreateNew,
    /// Replace the target, keeping its permissions
    Replace,
}

/// Write `content` to `target` atomically.
pub async fn write_atomically(target: PathBuf, content: Vec<u8>, mode: WriteMode) -> ClipResult<()> {
    let label = target.display().to_string();
    let task = tokio::task::spawn_blocking(move || write_blocking(&target, &content, mode));

    match task.await {
        Ok(result) => result,
        Err(e) => Err(ClipError::Unknown(format!(
            "write task for {label} failed: {e}"
        ))),
    }
}

fn write_blocking(target: &Path, content: &[u8], mode: WriteMode) -> ClipResult<()> {
    let name = display_name(target);
    let dir = target
        .parent()
        .ok_or_else(|| ClipError::InvalidInput(format!("{name} has no parent directory")))?;

    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| ClipError::from_io(e, &format!("cannot write {name}")))?;

    if let Err(e) = temp.write_all(content).and_then(|()| temp.as_file().sync_all()) {
        release_after_failure(temp);
        return Err(ClipError::from_io(e, &format!("writing {name} failed")));
    }

    let persisted = match mode {
        WriteMode::CreateNew => temp.persist_noclobber(target),
        WriteMode::Replace => {
            if let Ok(meta) = std::fs::metadata(target) {
                if let Err(e) = temp.as_file().set_permissions(meta.permissions()) {
                    log::warn!("Could not carry permissions over to {name}: {e}");
                }
            }
            temp.persist(target)
        }
    };

    match persisted {
        Ok(_) => Ok(()),
        Err(e) => {
            let kind = e.error.kind();
            release_after_failure(e.file);
            if kind == std::io::ErrorKind::AlreadyExists {
                Err(ClipError::InvalidInput(format!("{name} already exists")))
            } else {
                Err(ClipError::from_io(e.error, &format!("saving {name} failed")))
            }
        }
    }
}

/// Remove the temporary file after a failed write.
///
/// A failure here is logged and swallowed; the caller reports the primary error.
fn release_after_failure(temp: NamedTempFile) {
    let path = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        log::warn!(
            "Failed to remove temporary file {} after write error: {e}",
            path.display()
        );
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_create_new_writes_content() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("note.md");

        write_atomically(target.clone(), b"hello".to_vec(), WriteMode::CreateNew)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
        assert_eq!(file_count(dir.path()), 1);
    }

    #[tokio::test]
    async fn test_create_new_refuses_existing_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("note.md");
        std::fs::write(&target, "original").unwrap();

        let err = write_atomically(target.clone(), b"other".to_vec(), WriteMode::CreateNew)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "original");
        assert_eq!(file_count(dir.path()), 1, "temp file must not linger");
    }

    #[tokio::test]
    async fn test_replace_overwrites() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("note.md");
        std::fs::write(&target, "old").unwrap();

        write_atomically(target.clone(), b"new".to_vec(), WriteMode::Replace)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("gone").join("note.md");

        let err = write_atomically(target, b"x".to_vec(), WriteMode::CreateNew)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
