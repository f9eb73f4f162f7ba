//! Persistent key-value storage for settings
//!
//! The store is crash-consistent per write (the whole file is replaced
//! atomically) but not transactional across separate `set` calls.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{ClipError, ClipResult};
use crate::file_store::atomic_write::{WriteMode, write_atomically};

/// Key-value storage used for [`ClipConfig`](super::ClipConfig)
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch the requested keys; absent keys are simply missing from the map
    async fn get(&self, keys: &[&str]) -> ClipResult<Map<String, Value>>;

    /// Merge `entries` into the store
    async fn set(&self, entries: Map<String, Value>) -> ClipResult<()>;
}

/// Settings kept as one JSON object in a file
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> ClipResult<Map<String, Value>> {
        read_json_object(&self.path).await
    }
}

#[async_trait]
impl ConfigStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> ClipResult<Map<String, Value>> {
        let all = self.read_all().await?;
        Ok(all
            .into_iter()
            .filter(|(key, _)| keys.contains(&key.as_str()))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> ClipResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.read_all().await?;
        all.extend(entries);

        write_json_object(&self.path, &all).await
    }
}

/// In-memory store, handy for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Map<String, Value>) -> Self {
        Self {
            values: Mutex::new(values),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> ClipResult<Map<String, Value>> {
        let values = self.values.lock().await;
        Ok(values
            .iter()
            .filter(|(key, _)| keys.contains(&key.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> ClipResult<()> {
        self.values.lock().await.extend(entries);
        Ok(())
    }
}

/// Read a JSON object file; a missing file is an empty object
pub(crate) async fn read_json_object(path: &Path) -> ClipResult<Map<String, Value>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => {
            return Err(ClipError::from_io(
                e,
                &format!("reading {}", path.display()),
            ));
        }
    };

    if raw.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => Ok(map),
        other => Err(ClipError::InvalidInput(format!(
            "{} does not hold a JSON object (found {})",
            path.display(),
            type_name(&other)
        ))),
    }
}

/// Atomically replace a JSON object file, creating its directory if needed
pub(crate) async fn write_json_object(path: &Path, map: &Map<String, Value>) -> ClipResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| ClipError::InvalidInput(format!("{} has no parent", path.display())))?;
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| ClipError::from_io(e, &format!("creating {}", parent.display())))?;

    let body = serde_json::to_vec_pretty(map)?;
    write_atomically(path.to_path_buf(), body, WriteMode::Replace).await?;

    log::debug!("Wrote {}", path.display());
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
