//! User-facing notifications

use serde::{Deserialize, Serialize};

use crate::config::ImageMode;
use crate::image_pipeline::ImageSaveResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Success)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Warning)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Error)
    }

    fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Delivers notifications to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => log::info!("{}: {}", notification.title, notification.message),
            Severity::Warning => log::warn!("{}: {}", notification.title, notification.message),
            Severity::Error => log::error!("{}: {}", notification.title, notification.message),
        }
    }
}

/// Body of the success notification.
///
/// `image_count` is the number of images in the selection; `results` is empty
/// unless images were downloaded.
#[must_use]
pub fn save_summary(
    file_name: &str,
    was_appended: bool,
    image_mode: ImageMode,
    image_count: usize,
    results: &[ImageSaveResult],
) -> String {
    let mut message = if was_appended {
        format!("Appended to: {file_name}")
    } else {
        format!("Saved to: {file_name}")
    };

    if image_count == 0 {
        return message;
    }

    message.push('\n');
    match image_mode {
        ImageMode::Url => {
            message.push_str(&format!("{image_count} {} linked by URL", plural(image_count)));
        }
        ImageMode::Download => {
            let saved = results.iter().filter(|r| r.success).count();
            let failed = image_count.saturating_sub(saved);
            if failed == 0 {
                message.push_str(&format!("All {image_count} {} saved", plural(image_count)));
            } else if saved > 0 {
                message.push_str(&format!(
                    "Images: {saved}/{image_count} saved, {failed} failed"
                ));
            } else {
                message.push_str(&format!(
                    "All {image_count} {} failed (original URLs kept)",
                    plural(image_count)
                ));
            }
        }
    }
    message
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "image" } else { "images" }
}
