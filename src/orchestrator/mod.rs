//! Capture orchestration
//!
//! Ties selection, formatting, images and the file store together and keeps
//! the browser-side menu and notifications in step.

mod capture;
mod collaborators;
mod context;
mod menu;
mod notifications;
mod state;

pub use capture::{CaptureOrchestrator, CaptureOutcome, SaveReport, Surfaces, is_injectable};
pub use collaborators::{
    DestinationSurface, MenuSurface, SelectionError, SelectionSource, SettingsSurface,
};
pub use context::{ContextTicket, PickerContext, PickerContextSlot, PickerSummary};
pub use menu::{
    CaptureTrigger, MENU_MORE_FILES_ID, MENU_NEW_FILE_ID, MENU_NO_FILES_ID, MENU_ROOT_ID,
    MENU_SEPARATOR_ID, MenuItem, MenuItemKind, build_menu,
};
pub use notifications::{LogNotifier, Notification, Notifier, Severity, save_summary};
pub use state::{CaptureLifecycle, CaptureState};
