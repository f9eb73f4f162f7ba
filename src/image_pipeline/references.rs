//! Rewriting remote image links to saved local copies

use regex::{NoExpand, Regex};

use super::downloader::ImageSaveResult;
use crate::utils::constants::IMAGES_DIR_NAME;

/// Point every `![alt](originalUrl)` of a saved image at `![[images/<file>]]`.
///
/// Images that failed keep their remote URL.
#[must_use]
pub fn replace_image_references(markdown: &str, results: &[ImageSaveResult]) -> String {
    let mut updated = markdown.to_string();

    for result in results {
        let Some(file_name) = result.file_name.as_deref().filter(|_| result.success) else {
            log::debug!("Keeping original URL for {}", result.original_url);
            continue;
        };

        let pattern = format!(r"!\[[^\]]*\]\({}\)", regex::escape(&result.original_url));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                log::warn!("Cannot match image reference {}: {e}", result.original_url);
                continue;
            }
        };

        let local = format!("![[{IMAGES_DIR_NAME}/{file_name}]]");
        updated = re.replace_all(&updated, NoExpand(&local)).into_owned();
    }

    updated
}
