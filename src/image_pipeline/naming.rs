//! Image URL validation and local file naming

use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::utils::constants::{ALLOWED_IMAGE_EXTENSIONS, DEFAULT_IMAGE_EXTENSION};

static EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.([a-zA-Z0-9]+)$").expect("EXTENSION_RE: hardcoded regex is valid")
});

/// Only `http`/`https` URLs with a host are downloaded
#[must_use]
pub fn validate_image_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        log::warn!("Invalid image URL: {url}");
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        log::warn!("Unsupported image URL scheme: {}", parsed.scheme());
        return false;
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        log::warn!("Image URL has no host: {url}");
        return false;
    }

    true
}

/// Extension at the end of a path, lowercased, if it is one we keep
#[must_use]
pub fn extract_image_extension(path: &str) -> Option<String> {
    let ext = EXTENSION_RE.captures(path)?.get(1)?.as_str().to_ascii_lowercase();
    ALLOWED_IMAGE_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

/// `image-<epoch-ms>-<index>.<ext>`, falling back to `png`
#[must_use]
pub fn generate_image_file_name(url: &str, index: usize) -> String {
    generate_image_file_name_at(url, index, Utc::now().timestamp_millis())
}

#[must_use]
pub fn generate_image_file_name_at(url: &str, index: usize, now_ms: i64) -> String {
    let extension = Url::parse(url)
        .ok()
        .and_then(|parsed| extract_image_extension(parsed.path()))
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());

    format!("image-{now_ms}-{index}.{extension}")
}
