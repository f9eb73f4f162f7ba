//! The capture orchestrator
//!
//! Drives one capture from the menu click to the written note:
//! configuration and folder checks, selection acquisition, the destination
//! choice, formatting, optional image download and the file write.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::collaborators::{
    DestinationSurface, MenuSurface, SelectionError, SelectionSource, SettingsSurface,
};
use super::context::{ContextTicket, PickerContext, PickerContextSlot};
use super::menu::{CaptureTrigger, MenuItem, build_menu};
use super::notifications::{Notification, Notifier, save_summary};
use super::state::{CaptureLifecycle, CaptureState};
use crate::config::{ClipConfig, ConfigStore, ImageMode};
use crate::error::{ClipError, ClipResult};
use crate::file_store::{
    CapabilityStore, FileDescriptor, FileSelection, FolderHandle, FolderPicker, PermissionState,
    list_markdown_files, save_to_destination, select_target_folder, target_folder,
};
use crate::image_pipeline::{ImageDownloader, ImageSaveResult, replace_image_references};
use crate::markdown_formatter::format_markdown_content;
use crate::selection::{PageInfo, SelectedContent};
use crate::utils::constants::{
    INJECTION_SETTLE_DELAY, NON_INJECTABLE_PREFIXES, QUICK_SAVE_MENU_LIMIT,
};
use crate::utils::sanitize_file_name;

/// Browser-side surfaces the orchestrator reports to
#[derive(Clone)]
pub struct Surfaces {
    pub notifier: Arc<dyn Notifier>,
    pub settings: Arc<dyn SettingsSurface>,
    pub destination: Arc<dyn DestinationSurface>,
    pub menu: Arc<dyn MenuSurface>,
}

/// What a successful save did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub capture_id: u64,
    pub file_name: String,
    pub was_appended: bool,
    pub image_mode: ImageMode,
    pub image_count: usize,
    /// Empty unless images were downloaded
    pub image_results: Vec<ImageSaveResult>,
}

#[derive(Debug)]
pub enum CaptureOutcome {
    Saved(SaveReport),
    /// Waiting for the destination picker to answer with this ticket
    AwaitingDestination(ContextTicket),
    /// Empty selection, a warning was shown
    NothingSelected,
    /// A failure notification was shown
    Failed(ClipError),
}

pub struct CaptureOrchestrator {
    config_store: Arc<dyn ConfigStore>,
    capabilities: Arc<dyn CapabilityStore>,
    downloader: ImageDownloader,
    surfaces: Surfaces,
    picker_slot: PickerContextSlot,
    // one save at a time so read-modify-write appends never interleave
    save_lock: Mutex<()>,
    next_capture_id: AtomicU64,
    settle_delay: Duration,
}

impl CaptureOrchestrator {
    pub fn new(
        config_store: Arc<dyn ConfigStore>,
        capabilities: Arc<dyn CapabilityStore>,
        downloader: ImageDownloader,
        surfaces: Surfaces,
    ) -> Self {
        Self {
            config_store,
            capabilities,
            downloader,
            surfaces,
            picker_slot: PickerContextSlot::new(),
            save_lock: Mutex::new(()),
            next_capture_id: AtomicU64::new(0),
            settle_delay: INJECTION_SETTLE_DELAY,
        }
    }

    /// Override the pause between injecting the page script and retrying
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Run a capture triggered from the menu.
    ///
    /// Every terminal failure has already been reported through the notifier
    /// when this returns.
    pub async fn capture(
        &self,
        trigger: CaptureTrigger,
        page: PageInfo,
        source: &dyn SelectionSource,
    ) -> CaptureOutcome {
        let id = self.next_capture_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut lifecycle = CaptureLifecycle::new(id);
        tracing::info!(capture_id = id, ?trigger, url = %page.url, "capture started");

        match self.run_capture(&mut lifecycle, trigger, page, source).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report_failure(&mut lifecycle, &e);
                CaptureOutcome::Failed(e)
            }
        }
    }

    async fn run_capture(
        &self,
        lifecycle: &mut CaptureLifecycle,
        trigger: CaptureTrigger,
        page: PageInfo,
        source: &dyn SelectionSource,
    ) -> ClipResult<CaptureOutcome> {
        lifecycle.transition(CaptureState::SelectionRequested)?;

        let config = ClipConfig::load(self.config_store.as_ref()).await;
        let folder = self.authorized_folder().await?;

        let selection = self.acquire_selection(&page, source).await?;
        if selection.is_empty() {
            self.surfaces.notifier.notify(Notification::warning(
                "Nothing selected",
                "Select some text or images and try again",
            ));
            lifecycle.fail();
            return Ok(CaptureOutcome::NothingSelected);
        }

        lifecycle.transition(CaptureState::ContentReceived)?;
        tracing::debug!(
            capture_id = lifecycle.id(),
            text_len = selection.text.len(),
            images = selection.images.len(),
            "selection received"
        );

        let context = PickerContext {
            capture_id: lifecycle.id(),
            selected_content: selection,
            page,
            config,
        };

        let destination = match trigger {
            CaptureTrigger::SaveSelection => {
                lifecycle.transition(CaptureState::AwaitingDestination)?;
                let ticket = self.picker_slot.store(context).await;
                if let Err(e) = self.surfaces.destination.open_picker(ticket) {
                    self.picker_slot.discard(ticket).await;
                    return Err(e);
                }
                return Ok(CaptureOutcome::AwaitingDestination(ticket));
            }
            CaptureTrigger::QuickSaveNew => {
                let title = context.page.title.trim();
                FileSelection::New {
                    file_name: sanitize_file_name(if title.is_empty() { "untitled" } else { title }),
                }
            }
            CaptureTrigger::QuickSaveExisting { index } => {
                if index >= QUICK_SAVE_MENU_LIMIT {
                    return Err(ClipError::InvalidInput(format!(
                        "quick save offers only the {QUICK_SAVE_MENU_LIMIT} most recent files, got #{}",
                        index + 1
                    )));
                }
                let files = list_markdown_files(&folder).await?;
                let file = files.get(index).ok_or_else(|| {
                    ClipError::NotFound(format!(
                        "file #{} is no longer in the folder, refresh the menu and try again",
                        index + 1
                    ))
                })?;
                FileSelection::Existing {
                    file_name: file.name.clone(),
                }
            }
        };

        lifecycle.transition(CaptureState::Saving)?;
        let report = self.save(lifecycle, &context, &folder, &destination).await?;
        Ok(CaptureOutcome::Saved(report))
    }

    /// Finish a capture parked for the destination picker.
    ///
    /// The context is consumed whether the save succeeds or not.
    pub async fn complete_with_destination(
        &self,
        ticket: ContextTicket,
        selection: FileSelection,
    ) -> ClipResult<SaveReport> {
        let context = match self.picker_slot.claim(ticket).await {
            Ok(context) => context,
            Err(e) => {
                self.surfaces
                    .notifier
                    .notify(Notification::error("Save failed", e.to_string()));
                return Err(e);
            }
        };

        let mut lifecycle =
            CaptureLifecycle::resume(context.capture_id, CaptureState::AwaitingDestination);

        match self.finish_from_picker(&mut lifecycle, &context, &selection).await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.report_failure(&mut lifecycle, &e);
                Err(e)
            }
        }
    }

    async fn finish_from_picker(
        &self,
        lifecycle: &mut CaptureLifecycle,
        context: &PickerContext,
        selection: &FileSelection,
    ) -> ClipResult<SaveReport> {
        let folder = self.configured_folder().await?;
        lifecycle.transition(CaptureState::Saving)?;
        self.save(lifecycle, context, &folder, selection).await
    }

    /// The popup was closed without choosing
    pub async fn cancel_picker(&self, ticket: ContextTicket) -> bool {
        let discarded = self.picker_slot.discard(ticket).await;
        tracing::info!(generation = ticket.generation, discarded, "picker closed without saving");
        discarded
    }

    /// Context for the popup to render its choices
    pub async fn picker_context(&self, ticket: ContextTicket) -> ClipResult<PickerContext> {
        self.picker_slot.peek(ticket).await
    }

    async fn save(
        &self,
        lifecycle: &mut CaptureLifecycle,
        context: &PickerContext,
        folder: &FolderHandle,
        destination: &FileSelection,
    ) -> ClipResult<SaveReport> {
        let report = {
            let _guard = self.save_lock.lock().await;
            folder.ensure_access().await?;

            let config = &context.config;
            let content: &SelectedContent = &context.selected_content;

            let mut markdown = format_markdown_content(
                &context.page,
                &config.prefix_text,
                &config.suffix_text,
                content,
            );

            let mut image_results = Vec::new();
            if !content.images.is_empty() && config.image_mode == ImageMode::Download {
                image_results = self
                    .downloader
                    .download_and_save_images(&content.images, folder)
                    .await;
                markdown = replace_image_references(&markdown, &image_results);

                let saved = image_results.iter().filter(|r| r.success).count();
                tracing::info!(
                    capture_id = lifecycle.id(),
                    saved,
                    total = image_results.len(),
                    "images processed"
                );
            }

            let saved = save_to_destination(
                folder,
                destination,
                &markdown,
                config.add_timestamp,
                config.append_on_conflict,
            )
            .await?;

            lifecycle.transition(CaptureState::Done)?;
            tracing::info!(
                capture_id = lifecycle.id(),
                file = %saved.file_name,
                appended = saved.was_appended,
                "capture saved"
            );

            SaveReport {
                capture_id: lifecycle.id(),
                file_name: saved.file_name,
                was_appended: saved.was_appended,
                image_mode: config.image_mode,
                image_count: content.images.len(),
                image_results,
            }
        };

        self.surfaces.notifier.notify(Notification::success(
            "Saved",
            save_summary(
                &report.file_name,
                report.was_appended,
                report.image_mode,
                report.image_count,
                &report.image_results,
            ),
        ));

        // the freshest-files list just changed
        let current = ClipConfig::load(self.config_store.as_ref()).await;
        if current.quick_save_mode {
            self.refresh_menu().await;
        }

        Ok(report)
    }

    async fn acquire_selection(
        &self,
        page: &PageInfo,
        source: &dyn SelectionSource,
    ) -> ClipResult<SelectedContent> {
        match source.get_selection().await {
            Ok(content) => return Ok(content),
            Err(SelectionError::NotLoaded) => {}
            Err(SelectionError::Failed(message)) => {
                return Err(ClipError::Unknown(format!(
                    "could not read the selection ({message}), reload the page and try again"
                )));
            }
        }

        if !is_injectable(&page.url) {
            return Err(ClipError::InvalidInput(
                "browser-internal pages cannot be clipped".to_string(),
            ));
        }

        log::info!("Page script not loaded, injecting into {}", page.url);
        source.inject().await.map_err(|e| {
            ClipError::Unknown(format!(
                "could not load the page script ({e}), reload the page and try again"
            ))
        })?;

        tokio::time::sleep(self.settle_delay).await;

        source.get_selection().await.map_err(|e| {
            ClipError::Unknown(format!(
                "could not read the selection ({e}), reload the page and try again"
            ))
        })
    }

    /// Folder for a new capture; a lapsed permission is not re-requested here
    async fn authorized_folder(&self) -> ClipResult<FolderHandle> {
        let folder = self.configured_folder().await?;
        match folder.check_access().await {
            PermissionState::Granted => Ok(folder),
            state => Err(ClipError::PermissionDenied(format!(
                "access to {} is {state:?}",
                folder.name()
            ))),
        }
    }

    async fn configured_folder(&self) -> ClipResult<FolderHandle> {
        target_folder(self.capabilities.as_ref())
            .await?
            .ok_or(ClipError::NotConfigured)
    }

    fn report_failure(&self, lifecycle: &mut CaptureLifecycle, error: &ClipError) {
        lifecycle.fail();
        tracing::warn!(
            capture_id = lifecycle.id(),
            kind = ?error.kind(),
            "capture failed: {error}"
        );

        let notification = match error {
            ClipError::NotConfigured => Notification::warning(
                "No target folder",
                "Choose a notes folder in the settings first",
            ),
            ClipError::PermissionDenied(_) => Notification::error(
                "Folder access failed",
                "Choose the notes folder again in the settings",
            ),
            other => Notification::error("Save failed", other.to_string()),
        };
        self.surfaces.notifier.notify(notification);

        if error.needs_settings() {
            self.surfaces.settings.open_settings();
        }
    }

    /// Current settings
    pub async fn config(&self) -> ClipConfig {
        ClipConfig::load(self.config_store.as_ref()).await
    }

    /// Store new settings, rebuilding the menu when quick-save was toggled
    pub async fn save_config(&self, config: &ClipConfig) -> ClipResult<()> {
        let previous = self.config().await;
        config.save(self.config_store.as_ref()).await?;

        if previous.quick_save_mode != config.quick_save_mode {
            log::info!("Quick save mode changed, rebuilding menu");
            self.refresh_menu().await;
        }
        Ok(())
    }

    /// Let the user choose the notes folder
    pub async fn select_folder(&self, picker: &dyn FolderPicker) -> ClipResult<Option<FolderHandle>> {
        let selected = select_target_folder(
            picker,
            self.capabilities.as_ref(),
            self.config_store.as_ref(),
        )
        .await?;

        if selected.is_some() {
            self.refresh_menu().await;
        }
        Ok(selected)
    }

    pub async fn current_folder(&self) -> ClipResult<Option<FolderHandle>> {
        target_folder(self.capabilities.as_ref()).await
    }

    /// Notes in the target folder, most recent first
    pub async fn list_files(&self) -> ClipResult<Vec<FileDescriptor>> {
        let folder = self.configured_folder().await?;
        list_markdown_files(&folder).await
    }

    /// Rebuild the capture menu and hand it to the menu surface
    pub async fn refresh_menu(&self) -> Vec<MenuItem> {
        let config = self.config().await;

        let files = if config.quick_save_mode {
            self.list_files().await.unwrap_or_else(|e| {
                log::warn!("Could not list notes for the menu: {e}");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        let items = build_menu(config.quick_save_mode, &files);
        self.surfaces.menu.rebuild(items.clone());
        items
    }
}

/// Whether the page-side script can be injected into `url`
#[must_use]
pub fn is_injectable(url: &str) -> bool {
    !NON_INJECTABLE_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_pages_not_injectable() {
        assert!(!is_injectable("chrome://settings"));
        assert!(!is_injectable("about:blank"));
        assert!(!is_injectable("chrome-extension://abc/options.html"));
        assert!(!is_injectable("edge://flags"));
        assert!(is_injectable("https://example.com"));
    }
}
