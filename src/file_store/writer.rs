//! Creating and appending to notes

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::atomic_write::{WriteMode, write_atomically};
use super::handle::FolderHandle;
use crate::error::{ClipError, ClipResult};
use crate::utils::{APPEND_SEPARATOR, ensure_markdown_name, with_timestamp_suffix};

/// Where a capture should land
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileSelection {
    /// Create a note with this (unsanitized) name
    New {
        #[serde(rename = "fileName")]
        file_name: String,
    },
    /// Append to a note that already exists
    Existing {
        #[serde(rename = "fileName")]
        file_name: String,
    },
}

/// What a save actually did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub file_name: String,
    pub was_appended: bool,
}

/// Create a new note, resolving name conflicts by policy.
///
/// * `add_timestamp` always suffixes `-<epoch-ms>` and skips the existence check.
/// * Otherwise an existing note is appended to when `append_on_conflict` is set,
///   or a timestamped sibling is created when it is not.
pub async fn create_new_file(
    folder: &FolderHandle,
    name: &str,
    content: &str,
    add_timestamp: bool,
    append_on_conflict: bool,
) -> ClipResult<SaveResult> {
    let mut file_name = ensure_markdown_name(name);

    if add_timestamp {
        file_name = with_timestamp_suffix(&file_name, Utc::now().timestamp_millis());
        log::debug!("Adding timestamp to file name: {file_name}");
    } else if note_exists(folder, &file_name).await? {
        if append_on_conflict {
            log::info!("{file_name} exists, appending");
            append_to_file(folder, &file_name, content).await?;
            return Ok(SaveResult {
                file_name,
                was_appended: true,
            });
        }
        file_name = with_timestamp_suffix(&file_name, Utc::now().timestamp_millis());
        log::info!("Name taken, using {file_name}");
    }

    let target = folder.child(&file_name)?;
    write_atomically(target, content.as_bytes().to_vec(), WriteMode::CreateNew).await?;

    log::info!("Created {file_name}");
    Ok(SaveResult {
        file_name,
        was_appended: false,
    })
}

/// Append `content` to an existing note behind a `---` separator.
///
/// This is a read-modify-write of the whole file, not an in-place append.
pub async fn append_to_file(folder: &FolderHandle, name: &str, content: &str) -> ClipResult<()> {
    let target = folder.child(name)?;

    let meta = tokio::fs::metadata(&target)
        .await
        .map_err(|e| ClipError::from_io(e, &format!("cannot open {name}")))?;
    if !meta.is_file() {
        return Err(ClipError::InvalidInput(format!("{name} is not a file")));
    }
    if meta.permissions().readonly() {
        return Err(ClipError::Locked(format!("{name} is read-only")));
    }

    let existing = tokio::fs::read_to_string(&target)
        .await
        .map_err(|e| ClipError::from_io(e, &format!("cannot read {name}")))?;

    let combined = append_content(&existing, content);

    // the file may have been moved or deleted while we were reading it
    if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
        return Err(ClipError::NotFound(format!(
            "{name} disappeared before it could be written"
        )));
    }

    write_atomically(target, combined.into_bytes(), WriteMode::Replace).await?;

    log::info!("Appended {} bytes to {name}", content.len());
    Ok(())
}

/// Join existing note text and new content with a separator.
///
/// The existing text is topped up to end in a blank line so the `---` rule
/// never sits directly under a line of text.
#[must_use]
pub fn append_content(existing: &str, content: &str) -> String {
    let trailing_newlines = existing
        .bytes()
        .rev()
        .take_while(|&b| b == b'\n')
        .take(2)
        .count();

    // APPEND_SEPARATOR is "\n\n---\n\n"; skip the newlines already present
    let separator = &APPEND_SEPARATOR[trailing_newlines..];

    let mut combined = String::with_capacity(existing.len() + separator.len() + content.len());
    combined.push_str(existing);
    combined.push_str(separator);
    combined.push_str(content);
    combined
}

/// Carry out a destination choice
pub async fn save_to_destination(
    folder: &FolderHandle,
    selection: &FileSelection,
    content: &str,
    add_timestamp: bool,
    append_on_conflict: bool,
) -> ClipResult<SaveResult> {
    match selection {
        FileSelection::New { file_name } => {
            create_new_file(folder, file_name, content, add_timestamp, append_on_conflict).await
        }
        FileSelection::Existing { file_name } => {
            append_to_file(folder, file_name, content).await?;
            Ok(SaveResult {
                file_name: file_name.clone(),
                was_appended: true,
            })
        }
    }
}

async fn note_exists(folder: &FolderHandle, file_name: &str) -> ClipResult<bool> {
    let path = folder.child(file_name)?;
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Ok(true),
        Ok(_) => Err(ClipError::InvalidInput(format!(
            "{file_name} exists but is not a file"
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ClipError::from_io(e, &format!("cannot check {file_name}"))),
    }
}
