//! Shared configuration constants for the clipper
//!
//! This module contains default values and limits used throughout the
//! codebase to ensure consistency and avoid magic numbers.

use std::time::Duration;

/// Per-image download timeout: 30 seconds
///
/// Covers connect, headers and body. A slow image never blocks the note
/// from being written, it just keeps its remote URL.
pub const IMAGE_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum accepted image payload: 10MB
pub const MAX_IMAGE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum file name length, extension included
///
/// Most filesystems cap a single path component at 255 bytes.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Character substituted for `< > : " / \ | ? *` in file names
pub const FILE_NAME_PLACEHOLDER: &str = "-";

/// Extension given to every note file
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Separator inserted between an existing note and appended content
pub const APPEND_SEPARATOR: &str = "\n\n---\n\n";

/// Number of freshest files offered in the quick-save menu
pub const QUICK_SAVE_MENU_LIMIT: usize = 10;

/// Capability-store key for the chosen notes folder
pub const TARGET_FOLDER_ID: &str = "targetFolder";

/// Subfolder that receives downloaded images
pub const IMAGES_DIR_NAME: &str = "images";

/// Image extensions kept as-is; anything else is saved as `png`
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp"];

/// Fallback image extension
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Longest selection text preview handed to the destination picker
pub const PICKER_PREVIEW_MAX_BYTES: usize = 4 * 1024;

/// Pause between injecting the page-side collaborator and asking it again
pub const INJECTION_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// URL prefixes of browser-internal pages that cannot be injected
pub const NON_INJECTABLE_PREFIXES: &[&str] =
    &["chrome://", "about:", "chrome-extension://", "edge://"];

/// Chrome user agent string for image downloads
///
/// Some image CDNs refuse requests without a browser user agent.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Accept header sent with image downloads
pub const IMAGE_ACCEPT_HEADER: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";

/// Settings file name inside the config directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Capability file name inside the config directory
pub const CAPABILITIES_FILE_NAME: &str = "capabilities.json";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "CLIPPER_CONFIG_DIR";

/// Config directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "kodegen-clipper";
