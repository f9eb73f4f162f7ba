//! Markdown file enumeration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::handle::FolderHandle;
use crate::error::ClipResult;
use crate::utils::MARKDOWN_EXTENSION;

/// One note in the target folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
}

/// List the `.md` files directly inside the folder, most recently modified first.
///
/// Access problems are errors. Problems while walking the folder are not:
/// unreadable entries are skipped, and a failed enumeration yields an empty
/// list so the caller can still offer to create a new file.
pub async fn list_markdown_files(folder: &FolderHandle) -> ClipResult<Vec<FileDescriptor>> {
    folder.ensure_access().await?;

    let mut files = match collect_markdown_files(folder).await {
        Ok(files) => files,
        Err(e) => {
            log::warn!(
                "Listing {} failed, returning an empty file list: {e}",
                folder.path().display()
            );
            return Ok(Vec::new());
        }
    };

    sort_most_recent_first(&mut files);
    log::debug!(
        "Found {} markdown files in {}",
        files.len(),
        folder.path().display()
    );
    Ok(files)
}

async fn collect_markdown_files(folder: &FolderHandle) -> std::io::Result<Vec<FileDescriptor>> {
    let mut entries = tokio::fs::read_dir(folder.path()).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                log::debug!("Skipping non-UTF-8 entry {raw:?}");
                continue;
            }
        };
        if !name.ends_with(MARKDOWN_EXTENSION) {
            continue;
        }

        // follows symlinks, like opening the file would
        let meta = match tokio::fs::metadata(entry.path()).await {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Cannot read {name}, skipping: {e}");
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }

        let last_modified = match meta.modified() {
            Ok(time) => DateTime::<Utc>::from(time),
            Err(e) => {
                log::warn!("No modification time for {name}, skipping: {e}");
                continue;
            }
        };

        files.push(FileDescriptor {
            name,
            last_modified,
        });
    }

    Ok(files)
}

/// Newest first; ties broken by name for a stable menu
pub fn sort_most_recent_first(files: &mut [FileDescriptor]) {
    files.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.name.cmp(&b.name))
    });
}
