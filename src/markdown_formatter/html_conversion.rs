//! Image-preserving HTML to Markdown conversion
//!
//! This is deliberately shallow: images become Markdown image directives at
//! their original position, paragraph and line breaks become newlines, and
//! every other tag is dropped.

use regex::Regex;
use std::sync::LazyLock;

use crate::selection::ImageRef;

static IMG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<img[^>]*>").expect("IMG_TAG_RE: hardcoded regex is valid")
});

// requires a separator before `src` so `data-src` does not match
static SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)[\s"']src\s*=\s*["']([^"']+)["']"#)
        .expect("SRC_ATTR_RE: hardcoded regex is valid")
});

static ALT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)[\s"']alt\s*=\s*["']([^"']+)["']"#)
        .expect("ALT_ATTR_RE: hardcoded regex is valid")
});

static BR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("BR_RE: hardcoded regex is valid"));

static P_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p>").expect("P_CLOSE_RE: hardcoded regex is valid"));

static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("ANY_TAG_RE: hardcoded regex is valid"));

/// Convert an HTML fragment to Markdown, keeping images where they were.
///
/// `images` carries the absolute URLs recorded at selection time; inline `src`
/// values (often relative or cache-busted) are mapped back onto them.
#[must_use]
pub fn convert_html_to_markdown(html: &str, images: &[ImageRef]) -> String {
    let with_images = IMG_TAG_RE.replace_all(html, |caps: &regex::Captures<'_>| {
        let tag = &caps[0];
        // attribute text stays raw; entities are decoded once, after tags are stripped
        let Some(src) = SRC_ATTR_RE
            .captures(tag)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
        else {
            return String::new();
        };
        let alt = ALT_ATTR_RE
            .captures(tag)
            .and_then(|c| c.get(1))
            .map_or("", |m| m.as_str());

        let resolved = resolve_image_src(src, images).unwrap_or(src);
        format!("![{alt}]({resolved})")
    });

    let with_breaks = BR_RE.replace_all(&with_images, "\n");
    let with_paragraphs = P_CLOSE_RE.replace_all(&with_breaks, "\n\n");
    let text_only = ANY_TAG_RE.replace_all(&with_paragraphs, "");
    let decoded = decode_entities(&text_only);

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Find the captured absolute URL for an inline `src`.
///
/// Preference order: exact match, then a captured URL containing `src`, then a
/// captured URL whose file name appears in `src`.
#[must_use]
pub fn resolve_image_src<'a>(src: &str, images: &'a [ImageRef]) -> Option<&'a str> {
    if src.is_empty() {
        return None;
    }

    images
        .iter()
        .find(|img| img.src == src)
        .or_else(|| images.iter().find(|img| img.src.contains(src)))
        .or_else(|| {
            images.iter().find(|img| {
                let file_name = img.src.rsplit('/').next().unwrap_or_default();
                !file_name.is_empty() && src.contains(file_name)
            })
        })
        .map(|img| img.src.as_str())
}

/// Decode the handful of entities a selection fragment realistically carries
#[must_use]
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
