//! Request dispatch for the native messaging host

use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncRead, AsyncWrite};

use super::framing::{FramingError, read_frame, write_message};
use super::protocol::{CaptureData, Request, Response};
use crate::config::{CONFIG_KEYS, ClipConfig, ConfigStore, JsonFileStore, initialize_defaults};
use crate::error::{ClipError, ClipResult};
use crate::file_store::{CapabilityStore, FixedFolderPicker, JsonCapabilityStore};
use crate::image_pipeline::ImageDownloader;
use crate::orchestrator::{
    CaptureOrchestrator, CaptureOutcome, ContextTicket, DestinationSurface, MenuItem, MenuSurface,
    Notification, Notifier, SelectionError, SelectionSource, SettingsSurface, Surfaces,
};
use crate::selection::SelectedContent;
use crate::utils::constants::{CAPABILITIES_FILE_NAME, SETTINGS_FILE_NAME};

#[derive(Debug, Default)]
struct Pending {
    notifications: Vec<Notification>,
    menu: Option<Vec<MenuItem>>,
    open_settings: bool,
    open_picker: Option<ContextTicket>,
}

/// Collects what the core asks of the browser during one request
#[derive(Debug, Default)]
pub struct HostSurfaces {
    pending: Mutex<Pending>,
}

impl HostSurfaces {
    fn with_pending<T>(&self, f: impl FnOnce(&mut Pending) -> T) -> T {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut pending)
    }

    /// Move everything collected so far into `response`
    fn drain_into(&self, response: &mut Response) {
        let pending = self.with_pending(std::mem::take);
        response.notifications = pending.notifications;
        response.menu = pending.menu;
        response.open_settings = pending.open_settings;
        response.open_picker = pending.open_picker;
    }
}

impl Notifier for HostSurfaces {
    fn notify(&self, notification: Notification) {
        self.with_pending(|p| p.notifications.push(notification));
    }
}

impl SettingsSurface for HostSurfaces {
    fn open_settings(&self) {
        self.with_pending(|p| p.open_settings = true);
    }
}

impl DestinationSurface for HostSurfaces {
    fn open_picker(&self, ticket: ContextTicket) -> ClipResult<()> {
        self.with_pending(|p| p.open_picker = Some(ticket));
        Ok(())
    }
}

impl MenuSurface for HostSurfaces {
    fn rebuild(&self, items: Vec<MenuItem>) {
        self.with_pending(|p| p.menu = Some(items));
    }
}

/// Selection the extension read before sending the capture.
///
/// The host cannot reach into the tab, so injection always fails here and the
/// user is told to reload the page.
struct ForwardedSelection(Option<SelectedContent>);

#[async_trait]
impl SelectionSource for ForwardedSelection {
    async fn get_selection(&self) -> Result<SelectedContent, SelectionError> {
        self.0.clone().ok_or(SelectionError::NotLoaded)
    }

    async fn inject(&self) -> Result<(), SelectionError> {
        Err(SelectionError::Failed(
            "the page script is not running in this tab".to_string(),
        ))
    }
}

/// The clipper behind the native messaging port
pub struct NativeHost {
    orchestrator: CaptureOrchestrator,
    config_store: Arc<dyn ConfigStore>,
    surfaces: Arc<HostSurfaces>,
}

impl NativeHost {
    pub fn new(
        config_store: Arc<dyn ConfigStore>,
        capabilities: Arc<dyn CapabilityStore>,
        downloader: ImageDownloader,
    ) -> Self {
        let surfaces = Arc::new(HostSurfaces::default());
        let orchestrator = CaptureOrchestrator::new(
            config_store.clone(),
            capabilities,
            downloader,
            Surfaces {
                notifier: surfaces.clone(),
                settings: surfaces.clone(),
                destination: surfaces.clone(),
                menu: surfaces.clone(),
            },
        );

        Self {
            orchestrator,
            config_store,
            surfaces,
        }
    }

    /// Host backed by `settings.json` and `capabilities.json` in `config_dir`
    pub fn open(config_dir: &Path) -> ClipResult<Self> {
        let config_store = Arc::new(JsonFileStore::new(config_dir.join(SETTINGS_FILE_NAME)));
        let capabilities = Arc::new(JsonCapabilityStore::new(
            config_dir.join(CAPABILITIES_FILE_NAME),
        ));
        Ok(Self::new(config_store, capabilities, ImageDownloader::new()?))
    }

    /// First-run defaults and the initial menu
    pub async fn initialize(&self) -> ClipResult<Vec<MenuItem>> {
        initialize_defaults(self.config_store.as_ref()).await?;
        Ok(self.orchestrator.refresh_menu().await)
    }

    /// Serve requests until the browser closes the port
    pub async fn serve<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<(), FramingError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        while let Some(body) = read_frame(reader).await? {
            let response = self.handle_message(&body).await;

            let written = write_message(writer, &response).await;
            match written {
                Err(FramingError::TooLarge { len, limit }) => {
                    log::warn!("Response of {len} bytes over the {limit} byte limit");
                    write_message(writer, &response.too_large(len)).await?;
                }
                other => other?,
            }
        }

        log::info!("Browser closed the connection");
        Ok(())
    }

    /// Decode and answer one raw message
    pub async fn handle_message(&self, body: &[u8]) -> Response {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => return Response::failure(&ClipError::from(e)),
        };
        let request_id = value.get("requestId").cloned();

        let mut response = match serde_json::from_value::<Request>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                log::warn!("Rejected request: {e}");
                Response::failure(&ClipError::InvalidInput(format!("unknown request: {e}")))
            }
        };
        response.request_id = request_id;
        response
    }

    /// Answer one request
    pub async fn handle(&self, request: Request) -> Response {
        log::debug!("Handling {request:?}");

        let mut response = match self.dispatch(request).await {
            Ok(data) => Response::ok(data),
            Err(e) => {
                log::warn!("Request failed: {e}");
                Response::failure(&e)
            }
        };
        self.surfaces.drain_into(&mut response);
        response
    }

    async fn dispatch(&self, request: Request) -> ClipResult<Option<Value>> {
        let orchestrator = &self.orchestrator;

        match request {
            Request::GetConfig => Ok(Some(serde_json::to_value(orchestrator.config().await)?)),

            Request::SaveConfig { config } => {
                let mut stored = orchestrator.config().await.to_stored();
                stored.extend(
                    config
                        .into_iter()
                        .filter(|(key, _)| CONFIG_KEYS.contains(&key.as_str())),
                );
                orchestrator
                    .save_config(&ClipConfig::from_stored(&stored))
                    .await?;
                Ok(None)
            }

            Request::SetFolder { path } => {
                let folder = orchestrator
                    .select_folder(&FixedFolderPicker(path))
                    .await?;
                Ok(Some(serde_json::to_value(folder)?))
            }

            Request::GetFolder => match orchestrator.current_folder().await? {
                Some(folder) => {
                    let permission = folder.check_access().await;
                    Ok(Some(json!({ "folder": folder, "permission": permission })))
                }
                None => Ok(Some(json!({ "folder": null }))),
            },

            Request::GetMarkdownFiles => {
                let files = orchestrator.list_files().await?;
                Ok(Some(serde_json::to_value(files)?))
            }

            Request::Capture {
                trigger,
                page,
                selection,
            } => {
                let source = ForwardedSelection(selection);
                let data = match orchestrator.capture(trigger, page, &source).await {
                    CaptureOutcome::Saved(report) => CaptureData::Saved(report),
                    CaptureOutcome::AwaitingDestination(ticket) => {
                        CaptureData::AwaitingDestination { ticket }
                    }
                    CaptureOutcome::NothingSelected => CaptureData::NothingSelected,
                    CaptureOutcome::Failed(e) => return Err(e),
                };
                Ok(Some(serde_json::to_value(data)?))
            }

            Request::GetPickerContext { ticket } => {
                let context = orchestrator.picker_context(ticket).await?;
                Ok(Some(serde_json::to_value(context.summary())?))
            }

            Request::SaveToFile {
                ticket,
                file_selection,
            } => {
                let report = orchestrator
                    .complete_with_destination(ticket, file_selection)
                    .await?;
                Ok(Some(serde_json::to_value(report)?))
            }

            Request::CancelPicker { ticket } => {
                let discarded = orchestrator.cancel_picker(ticket).await;
                Ok(Some(json!({ "discarded": discarded })))
            }

            Request::RefreshMenu => {
                orchestrator.refresh_menu().await;
                Ok(None)
            }
        }
    }
}
