//! Folder capability and note file operations

pub mod atomic_write;
mod capability;
mod handle;
mod listing;
mod writer;

pub use capability::{
    CapabilityStore, FixedFolderPicker, FolderPicker, JsonCapabilityStore, MemoryCapabilityStore,
    select_target_folder, target_folder,
};
pub use handle::{FolderHandle, PermissionState};
pub use listing::{FileDescriptor, list_markdown_files, sort_most_recent_first};
pub use writer::{
    FileSelection, SaveResult, append_content, append_to_file, create_new_file,
    save_to_destination,
};
