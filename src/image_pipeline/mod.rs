//! Image download pipeline
//!
//! Used only when images are saved locally: validate each URL, download all of
//! them concurrently, store the successes under `images/` and rewrite the
//! note's image links to point at the local copies.

mod downloader;
mod errors;
mod naming;
mod references;

pub use downloader::{DownloadedImage, ImageDownloader, ImageSaveResult, ensure_images_dir};
pub use errors::ImageDownloadError;
pub use naming::{
    extract_image_extension, generate_image_file_name, generate_image_file_name_at,
    validate_image_url,
};
pub use references::replace_image_references;
