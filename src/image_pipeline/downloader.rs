//! Image downloads and the batch save into `images/`

use futures::StreamExt;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::errors::ImageDownloadError;
use super::naming::{generate_image_file_name, validate_image_url};
use crate::error::{ClipError, ClipResult};
use crate::file_store::FolderHandle;
use crate::file_store::atomic_write::{WriteMode, write_atomically};
use crate::selection::ImageRef;
use crate::utils::constants::{
    CHROME_USER_AGENT, IMAGE_ACCEPT_HEADER, IMAGE_DOWNLOAD_TIMEOUT, IMAGES_DIR_NAME,
    MAX_IMAGE_SIZE_BYTES,
};

/// A fetched image that has not been written yet
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub original_url: String,
}

/// Outcome for one input image, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSaveResult {
    pub original_url: String,
    pub file_name: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageSaveResult {
    fn saved(original_url: &str, file_name: String) -> Self {
        Self {
            original_url: original_url.to_string(),
            file_name: Some(file_name),
            success: true,
            error: None,
        }
    }

    fn failed(original_url: &str, error: impl Into<String>) -> Self {
        Self {
            original_url: original_url.to_string(),
            file_name: None,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Downloads images with a shared HTTP client
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    timeout: Duration,
    max_size: usize,
}

impl ImageDownloader {
    pub fn new() -> ClipResult<Self> {
        let client = Client::builder()
            .user_agent(CHROME_USER_AGENT)
            .build()
            .map_err(|e| ClipError::Unknown(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client))
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: IMAGE_DOWNLOAD_TIMEOUT,
            max_size: MAX_IMAGE_SIZE_BYTES,
        }
    }

    /// Override the per-image timeout and size cap
    #[must_use]
    pub fn with_limits(mut self, timeout: Duration, max_size: usize) -> Self {
        self.timeout = timeout;
        self.max_size = max_size;
        self
    }

    /// Fetch one image
    pub async fn download_image(
        &self,
        url: &str,
        index: usize,
    ) -> Result<DownloadedImage, ImageDownloadError> {
        if !validate_image_url(url) {
            return Err(ImageDownloadError::InvalidUrl(url.to_string()));
        }

        log::debug!("Downloading image {}: {url}", index + 1);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", CHROME_USER_AGENT)
            .header("Accept", IMAGE_ACCEPT_HEADER)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageDownloadError::from_status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/*");
        if !content_type.starts_with("image/") {
            // some servers mislabel images, keep going
            log::warn!("Unexpected content type for image {url}: {content_type}");
        }

        // Enforce the cap before reading the body when the server tells us the size
        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > self.max_size as u64 {
            return Err(ImageDownloadError::SizeExceeded {
                size: expected_size,
                limit: self.max_size,
            });
        }

        let mut buffer = Vec::with_capacity(expected_size as usize);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                if e.is_timeout() {
                    ImageDownloadError::Timeout(self.timeout.as_secs())
                } else {
                    ImageDownloadError::Read(e.to_string())
                }
            })?;

            let new_total = buffer.len() + chunk.len();
            if new_total > self.max_size {
                return Err(ImageDownloadError::SizeExceeded {
                    size: new_total as u64,
                    limit: self.max_size,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        if buffer.is_empty() {
            return Err(ImageDownloadError::Empty);
        }

        let file_name = generate_image_file_name(url, index);
        log::info!(
            "Image downloaded: {file_name} ({:.2}KB)",
            buffer.len() as f64 / 1024.0
        );

        Ok(DownloadedImage {
            bytes: buffer,
            file_name,
            original_url: url.to_string(),
        })
    }

    /// Download every image concurrently, then save the successes one by one
    /// into the folder's `images/` subfolder.
    ///
    /// Always returns one result per input image, in input order. Nothing in
    /// here fails the enclosing save.
    pub async fn download_and_save_images(
        &self,
        images: &[ImageRef],
        folder: &FolderHandle,
    ) -> Vec<ImageSaveResult> {
        if images.is_empty() {
            return Vec::new();
        }

        log::info!("Starting batch download of {} images", images.len());

        let images_dir = match ensure_images_dir(folder).await {
            Ok(dir) => dir,
            Err(e) => {
                log::error!("Failed to prepare images folder: {e}");
                let message = format!("Cannot access the images folder: {e}");
                return images
                    .iter()
                    .map(|img| ImageSaveResult::failed(&img.src, message.clone()))
                    .collect();
            }
        };

        let downloads = join_all(
            images
                .iter()
                .enumerate()
                .map(|(index, img)| self.download_image(&img.src, index)),
        )
        .await;

        let mut results = Vec::with_capacity(images.len());
        for (img, downloaded) in images.iter().zip(downloads) {
            let result = match downloaded {
                Ok(image) => {
                    let target = images_dir.join(&image.file_name);
                    match write_atomically(target, image.bytes, WriteMode::CreateNew).await {
                        Ok(()) => {
                            log::debug!("Image saved: {}", image.file_name);
                            ImageSaveResult::saved(&img.src, image.file_name)
                        }
                        Err(e) => {
                            log::error!("Failed to save image {}: {e}", image.file_name);
                            ImageSaveResult::failed(&img.src, e.to_string())
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Failed to download image from {}: {e}", img.src);
                    ImageSaveResult::failed(&img.src, e.to_string())
                }
            };
            results.push(result);
        }

        results
    }

    fn transport_error(&self, error: &reqwest::Error) -> ImageDownloadError {
        if error.is_timeout() {
            ImageDownloadError::Timeout(self.timeout.as_secs())
        } else {
            ImageDownloadError::Network(error.to_string())
        }
    }
}

/// Open `images/` under the folder, creating it when absent
pub async fn ensure_images_dir(folder: &FolderHandle) -> ClipResult<PathBuf> {
    let dir = folder.child(IMAGES_DIR_NAME)?;

    match tokio::fs::metadata(&dir).await {
        Ok(meta) if meta.is_dir() => Ok(dir),
        Ok(_) => Err(ClipError::InvalidInput(format!(
            "{IMAGES_DIR_NAME} exists but is not a folder"
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tokio::fs::create_dir(&dir)
                .await
                .map_err(|e| ClipError::from_io(e, &format!("cannot create {IMAGES_DIR_NAME}")))?;
            log::info!("Created {}", dir.display());
            Ok(dir)
        }
        Err(e) => Err(ClipError::from_io(e, &format!("cannot open {IMAGES_DIR_NAME}"))),
    }
}
