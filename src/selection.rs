//! Data captured from the page
//!
//! These types mirror what the page-side extractor sends: plain text, the
//! selection's HTML fragment and the absolute URLs of images inside it.

use serde::{Deserialize, Serialize};

/// An image found inside the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Absolute URL
    pub src: String,
    #[serde(default)]
    pub alt: String,
    /// Order of appearance within the selection
    #[serde(default)]
    pub position: usize,
}

impl ImageRef {
    pub fn new(src: impl Into<String>, alt: impl Into<String>, position: usize) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            position,
        }
    }
}

/// Everything the user selected on the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedContent {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

impl SelectedContent {
    /// Nothing worth saving: no text and no images
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.images.is_empty()
    }
}

/// The page a selection came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl PageInfo {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}
