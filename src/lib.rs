pub mod config;
pub mod error;
pub mod file_store;
pub mod image_pipeline;
pub mod markdown_formatter;
pub mod native_host;
pub mod orchestrator;
pub mod selection;
pub mod utils;

pub use config::{ClipConfig, ConfigStore, ImageMode, JsonFileStore, MemoryStore};
pub use error::{ClipError, ClipResult, ErrorKind};
pub use file_store::{
    CapabilityStore, FileDescriptor, FileSelection, FolderHandle, FolderPicker,
    JsonCapabilityStore, MemoryCapabilityStore, PermissionState, SaveResult,
};
pub use image_pipeline::{ImageDownloader, ImageSaveResult};
pub use markdown_formatter::{convert_html_to_markdown, format_markdown_content};
pub use native_host::{NativeHost, Request, Response};
pub use orchestrator::{
    CaptureOrchestrator, CaptureOutcome, CaptureState, CaptureTrigger, ContextTicket,
    Notification, PickerContext, SaveReport, Severity, Surfaces,
};
pub use selection::{ImageRef, PageInfo, SelectedContent};
pub use utils::sanitize_file_name;
