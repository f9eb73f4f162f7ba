//! Test utilities and helper functions for the clipper test suite

use anyhow::Result;
use async_trait::async_trait;
use kodegen_tools_clipper::config::{ConfigStore, MemoryStore};
use kodegen_tools_clipper::error::ClipResult;
use kodegen_tools_clipper::file_store::{
    CapabilityStore, FolderHandle, MemoryCapabilityStore,
};
use kodegen_tools_clipper::image_pipeline::ImageDownloader;
use kodegen_tools_clipper::orchestrator::{
    CaptureOrchestrator, ContextTicket, DestinationSurface, MenuItem, MenuSurface, Notification,
    Notifier, SelectionError, SelectionSource, SettingsSurface, Surfaces,
};
use kodegen_tools_clipper::selection::{ImageRef, SelectedContent};
use mockito::{Mock, Server};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Creates a temporary notes folder and a handle to it
#[allow(dead_code)]
pub fn create_notes_folder() -> Result<(TempDir, FolderHandle)> {
    let dir = TempDir::new()?;
    let handle = FolderHandle::new(dir.path());
    Ok((dir, handle))
}

/// Writes a note and pins its modification time `age_secs` into the past
#[allow(dead_code)]
pub fn write_note(dir: &Path, name: &str, content: &str, age_secs: u64) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    let file = std::fs::File::options().write(true).open(&path)?;
    file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))?;
    Ok(())
}

/// Reads a note from the folder
#[allow(dead_code)]
pub fn read_note(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name))
        .unwrap_or_else(|e| panic!("cannot read {name}: {e}"))
}

/// Names of the `.md` files currently in `dir`, sorted
#[allow(dead_code)]
pub fn note_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read notes dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".md"))
        .collect();
    names.sort();
    names
}

/// Sets up a mock HTTP server
#[allow(dead_code)]
pub async fn setup_mock_server() -> mockito::ServerGuard {
    Server::new_async().await
}

/// Creates a mock endpoint serving image bytes
#[allow(dead_code)]
pub async fn create_image_mock(
    server: &mut Server,
    path: &str,
    body: &[u8],
    content_type: &str,
) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", content_type)
        .with_body(body)
        .create_async()
        .await
}

/// Creates a mock endpoint that returns an error status
#[allow(dead_code)]
pub async fn create_error_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body("Error")
        .create_async()
        .await
}

/// Helper to create test URLs
#[allow(dead_code)]
pub fn test_url(server: &Server, path: &str) -> String {
    format!("{}{}", server.url(), path)
}

/// A few bytes that look enough like a PNG
#[allow(dead_code)]
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

/// Selection with the given text and images
#[allow(dead_code)]
pub fn selection(text: &str, images: &[&str]) -> SelectedContent {
    SelectedContent {
        text: text.to_string(),
        html: String::new(),
        images: images
            .iter()
            .enumerate()
            .map(|(i, src)| ImageRef::new(*src, format!("img{i}"), i))
            .collect(),
    }
}

/// Everything the orchestrator told the browser to do
#[derive(Default)]
pub struct RecordingSurfaces {
    pub notifications: Mutex<Vec<Notification>>,
    pub settings_opened: AtomicUsize,
    pub pickers: Mutex<Vec<ContextTicket>>,
    pub menus: Mutex<Vec<Vec<MenuItem>>>,
}

#[allow(dead_code)]
impl RecordingSurfaces {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn last_notification(&self) -> Notification {
        self.notifications
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("a notification was sent")
    }

    pub fn settings_opened(&self) -> usize {
        self.settings_opened.load(Ordering::SeqCst)
    }

    pub fn last_menu(&self) -> Option<Vec<MenuItem>> {
        self.menus.lock().unwrap().last().cloned()
    }

    pub fn menu_rebuilds(&self) -> usize {
        self.menus.lock().unwrap().len()
    }
}

impl Notifier for RecordingSurfaces {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

impl SettingsSurface for RecordingSurfaces {
    fn open_settings(&self) {
        self.settings_opened.fetch_add(1, Ordering::SeqCst);
    }
}

impl DestinationSurface for RecordingSurfaces {
    fn open_picker(&self, ticket: ContextTicket) -> ClipResult<()> {
        self.pickers.lock().unwrap().push(ticket);
        Ok(())
    }
}

impl MenuSurface for RecordingSurfaces {
    fn rebuild(&self, items: Vec<MenuItem>) {
        self.menus.lock().unwrap().push(items);
    }
}

/// Page-side collaborator answering from a script of responses
pub struct ScriptedSelection {
    responses: Mutex<Vec<Result<SelectedContent, SelectionError>>>,
    pub injections: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedSelection {
    /// Always answers with `content`
    pub fn ready(content: SelectedContent) -> Self {
        Self::script(vec![Ok(content)])
    }

    /// Not loaded until injected, then answers with `content`
    pub fn needs_injection(content: SelectedContent) -> Self {
        Self::script(vec![Err(SelectionError::NotLoaded), Ok(content)])
    }

    /// Answers in order; the last answer repeats
    pub fn script(responses: Vec<Result<SelectedContent, SelectionError>>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            injections: AtomicUsize::new(0),
        }
    }

    pub fn injections(&self) -> usize {
        self.injections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SelectionSource for ScriptedSelection {
    async fn get_selection(&self) -> Result<SelectedContent, SelectionError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop().expect("non-empty script")
        } else {
            responses
                .last()
                .cloned()
                .unwrap_or(Err(SelectionError::NotLoaded))
        }
    }

    async fn inject(&self) -> Result<(), SelectionError> {
        self.injections.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Orchestrator wired to in-memory stores and recording surfaces
pub struct TestHarness {
    pub orchestrator: CaptureOrchestrator,
    pub surfaces: Arc<RecordingSurfaces>,
    pub config_store: Arc<MemoryStore>,
    pub capabilities: Arc<MemoryCapabilityStore>,
}

#[allow(dead_code)]
impl TestHarness {
    pub fn new() -> Self {
        let surfaces = Arc::new(RecordingSurfaces::default());
        let config_store = Arc::new(MemoryStore::new());
        let capabilities = Arc::new(MemoryCapabilityStore::new());
        let downloader = ImageDownloader::new().expect("HTTP client builds");

        let orchestrator = CaptureOrchestrator::new(
            config_store.clone(),
            capabilities.clone(),
            downloader,
            Surfaces {
                notifier: surfaces.clone(),
                settings: surfaces.clone(),
                destination: surfaces.clone(),
                menu: surfaces.clone(),
            },
        )
        .with_settle_delay(Duration::from_millis(1));

        Self {
            orchestrator,
            surfaces,
            config_store,
            capabilities,
        }
    }

    /// Harness with `folder` already chosen as the target
    pub async fn with_folder(folder: &FolderHandle) -> Self {
        let harness = Self::new();
        harness
            .capabilities
            .put("targetFolder", folder.clone())
            .await
            .expect("store folder");
        harness
    }

    /// Store raw settings values
    pub async fn set_config(&self, values: serde_json::Value) {
        let map = values.as_object().cloned().expect("settings object");
        self.config_store.set(map).await.expect("store settings");
    }
}
