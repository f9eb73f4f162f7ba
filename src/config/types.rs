//! Core configuration types for clipping
//!
//! `ClipConfig` is read once at the start of every capture and never changes
//! for the lifetime of that capture.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::store::ConfigStore;
use crate::error::ClipResult;

pub const KEY_PREFIX_TEXT: &str = "prefixText";
pub const KEY_SUFFIX_TEXT: &str = "suffixText";
pub const KEY_ADD_TIMESTAMP: &str = "addTimestamp";
pub const KEY_APPEND_ON_CONFLICT: &str = "appendOnConflict";
pub const KEY_IMAGE_MODE: &str = "imageMode";
pub const KEY_QUICK_SAVE_MODE: &str = "quickSaveMode";
pub const KEY_FOLDER_NAME: &str = "folderName";

/// Every key the configuration occupies in the key-value store
pub const CONFIG_KEYS: &[&str] = &[
    KEY_FOLDER_NAME,
    KEY_PREFIX_TEXT,
    KEY_SUFFIX_TEXT,
    KEY_ADD_TIMESTAMP,
    KEY_APPEND_ON_CONFLICT,
    KEY_IMAGE_MODE,
    KEY_QUICK_SAVE_MODE,
];

/// How images in a selection end up in the note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Keep the remote URL
    #[default]
    Url,
    /// Download into `images/` and link locally
    Download,
}

impl ImageMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMode::Url => "url",
            ImageMode::Download => "download",
        }
    }
}

/// User settings for clipping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipConfig {
    pub prefix_text: String,
    pub suffix_text: String,
    /// Always suffix new file names with `-<epoch-ms>`
    pub add_timestamp: bool,
    /// Append instead of creating a timestamped file when the name is taken
    pub append_on_conflict: bool,
    pub image_mode: ImageMode,
    /// Offer destination files directly in the capture menu
    pub quick_save_mode: bool,
    /// Display name of the chosen folder, informational only
    pub folder_name: Option<String>,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            prefix_text: String::new(),
            suffix_text: String::new(),
            add_timestamp: false,
            append_on_conflict: true,
            image_mode: ImageMode::Url,
            quick_save_mode: true,
            folder_name: None,
        }
    }
}

impl ClipConfig {
    /// Load settings from the store, filling anything missing with defaults.
    ///
    /// A store that cannot be read yields the defaults.
    pub async fn load(store: &dyn ConfigStore) -> Self {
        match store.get(CONFIG_KEYS).await {
            Ok(values) => Self::from_stored(&values),
            Err(e) => {
                log::error!("Failed to read configuration, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Interpret a partial map of stored values.
    ///
    /// Flags that default to on stay on unless explicitly stored as `false`.
    #[must_use]
    pub fn from_stored(values: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            values
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let flag = |key: &str| values.get(key).and_then(Value::as_bool);

        let image_mode = match values.get(KEY_IMAGE_MODE).and_then(Value::as_str) {
            Some("download") => ImageMode::Download,
            _ => ImageMode::Url,
        };

        let folder_name = values
            .get(KEY_FOLDER_NAME)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Self {
            prefix_text: text(KEY_PREFIX_TEXT),
            suffix_text: text(KEY_SUFFIX_TEXT),
            add_timestamp: flag(KEY_ADD_TIMESTAMP) == Some(true),
            append_on_conflict: flag(KEY_APPEND_ON_CONFLICT) != Some(false),
            image_mode,
            quick_save_mode: flag(KEY_QUICK_SAVE_MODE) != Some(false),
            folder_name,
        }
    }

    /// The stored representation of these settings
    #[must_use]
    pub fn to_stored(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(KEY_PREFIX_TEXT.into(), Value::from(self.prefix_text.clone()));
        map.insert(KEY_SUFFIX_TEXT.into(), Value::from(self.suffix_text.clone()));
        map.insert(KEY_ADD_TIMESTAMP.into(), Value::from(self.add_timestamp));
        map.insert(
            KEY_APPEND_ON_CONFLICT.into(),
            Value::from(self.append_on_conflict),
        );
        map.insert(KEY_IMAGE_MODE.into(), Value::from(self.image_mode.as_str()));
        map.insert(KEY_QUICK_SAVE_MODE.into(), Value::from(self.quick_save_mode));
        if let Some(name) = &self.folder_name {
            map.insert(KEY_FOLDER_NAME.into(), Value::from(name.clone()));
        }
        map
    }

    /// Persist these settings
    pub async fn save(&self, store: &dyn ConfigStore) -> ClipResult<()> {
        store.set(self.to_stored()).await
    }
}

/// Write defaults for any setting that has never been stored.
///
/// Returns the keys that were written.
pub async fn initialize_defaults(store: &dyn ConfigStore) -> ClipResult<Vec<String>> {
    let existing = store.get(CONFIG_KEYS).await?;
    let defaults = ClipConfig::default().to_stored();

    let missing: Map<String, Value> = defaults
        .into_iter()
        .filter(|(key, _)| !existing.contains_key(key))
        .collect();

    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let written: Vec<String> = missing.keys().cloned().collect();
    store.set(missing).await?;
    log::info!("Default configuration initialized: {written:?}");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_store_gives_defaults() {
        let config = ClipConfig::from_stored(&Map::new());
        assert_eq!(config, ClipConfig::default());
        assert!(config.append_on_conflict);
        assert!(config.quick_save_mode);
        assert!(!config.add_timestamp);
        assert_eq!(config.image_mode, ImageMode::Url);
    }

    #[test]
    fn test_lenient_reads() {
        let stored = json!({
            "prefixText": "> clipped",
            "addTimestamp": "yes",
            "appendOnConflict": false,
            "imageMode": "carrier-pigeon",
            "quickSaveMode": null,
            "folderName": ""
        });
        let config = ClipConfig::from_stored(stored.as_object().unwrap());

        assert_eq!(config.prefix_text, "> clipped");
        assert_eq!(config.suffix_text, "");
        assert!(!config.add_timestamp);
        assert!(!config.append_on_conflict);
        assert_eq!(config.image_mode, ImageMode::Url);
        assert!(config.quick_save_mode);
        assert_eq!(config.folder_name, None);
    }

    #[test]
    fn test_stored_round_trip_uses_camel_case_keys() {
        let config = ClipConfig {
            image_mode: ImageMode::Download,
            folder_name: Some("Vault".into()),
            ..ClipConfig::default()
        };
        let stored = config.to_stored();
        assert_eq!(stored.get("imageMode"), Some(&json!("download")));
        assert_eq!(stored.get("folderName"), Some(&json!("Vault")));
        assert_eq!(ClipConfig::from_stored(&stored), config);
    }
}
