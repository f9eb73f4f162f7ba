//! Filesystem-safe note names.
//!
//! Names typed by the user or taken from page titles go through
//! [`sanitize_file_name`] before they touch the disk.

use chrono::Utc;

use super::constants::{FILE_NAME_PLACEHOLDER, MARKDOWN_EXTENSION, MAX_FILE_NAME_LEN};
use super::string_utils::{safe_truncate_bytes, split_extension};

/// Sanitize a candidate file name.
///
/// Replaces `< > : " / \ | ? *` and control characters with `-`, trims
/// surrounding whitespace and dots, and caps the result at 255 bytes by
/// shortening the stem. Input that leaves nothing meaningful behind becomes
/// `untitled-<epoch-ms>.md`.
#[must_use]
pub fn sanitize_file_name(raw: &str) -> String {
    sanitize_file_name_at(raw, Utc::now().timestamp_millis())
}

/// [`sanitize_file_name`] with an explicit clock, for deterministic callers.
#[must_use]
pub fn sanitize_file_name_at(raw: &str, now_ms: i64) -> String {
    let options = sanitize_filename::Options {
        windows: false,
        truncate: false,
        replacement: FILE_NAME_PLACEHOLDER,
    };
    let replaced = sanitize_filename::sanitize_with_options(raw, options);

    let trimmed = replaced.trim().trim_matches('.');

    if is_placeholder_only(trimmed) {
        return format!("untitled-{now_ms}{MARKDOWN_EXTENSION}");
    }

    truncate_to_limit(trimmed)
}

/// Sanitize, then make sure the name ends in `.md`.
#[must_use]
pub fn ensure_markdown_name(name: &str) -> String {
    let sanitized = sanitize_file_name(name);
    if sanitized.ends_with(MARKDOWN_EXTENSION) {
        sanitized
    } else {
        sanitize_file_name(&format!("{sanitized}{MARKDOWN_EXTENSION}"))
    }
}

/// Turn `note.md` into `note-<ms>.md`, staying within the length cap.
#[must_use]
pub fn with_timestamp_suffix(file_name: &str, now_ms: i64) -> String {
    let stem = file_name
        .strip_suffix(MARKDOWN_EXTENSION)
        .unwrap_or(file_name);
    let suffix = format!("-{now_ms}{MARKDOWN_EXTENSION}");
    let budget = MAX_FILE_NAME_LEN.saturating_sub(suffix.len());
    format!("{}{suffix}", safe_truncate_bytes(stem, budget))
}

fn is_placeholder_only(name: &str) -> bool {
    if name.is_empty() || name == MARKDOWN_EXTENSION {
        return true;
    }
    let stem = name
        .strip_suffix(MARKDOWN_EXTENSION)
        .unwrap_or(name)
        .trim();
    stem.is_empty()
        || stem
            .chars()
            .all(|c| FILE_NAME_PLACEHOLDER.contains(c) || c == '.' || c.is_whitespace())
}

fn truncate_to_limit(name: &str) -> String {
    if name.len() <= MAX_FILE_NAME_LEN {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    let budget = MAX_FILE_NAME_LEN.saturating_sub(ext.len());
    let stem = safe_truncate_bytes(stem, budget).trim_end();
    format!("{stem}{ext}")
}
