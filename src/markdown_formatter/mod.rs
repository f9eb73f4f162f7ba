//! Markdown note assembly
//!
//! A note is made of up to four blocks separated by blank lines: a link back
//! to the source page, the prefix, the selected content and the suffix.

pub mod html_conversion;

pub use html_conversion::{convert_html_to_markdown, decode_entities, resolve_image_src};

use crate::selection::{ImageRef, PageInfo, SelectedContent};

/// Build the Markdown body for a captured selection.
///
/// Content is taken from the HTML fragment when the selection contains
/// images (so they stay in place), otherwise from the plain text with any
/// images listed after it, and only as a last resort from the raw HTML.
#[must_use]
pub fn format_markdown_content(
    page: &PageInfo,
    prefix: &str,
    suffix: &str,
    content: &SelectedContent,
) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(4);

    if let Some(link) = source_link(page) {
        blocks.push(link);
    }

    let prefix = prefix.trim();
    if !prefix.is_empty() {
        blocks.push(prefix.to_string());
    }

    let body = content_block(content);
    if !body.is_empty() {
        blocks.push(body);
    }

    let suffix = suffix.trim();
    if !suffix.is_empty() {
        blocks.push(suffix.to_string());
    }

    blocks.join("\n\n")
}

fn source_link(page: &PageInfo) -> Option<String> {
    let url = page.url.trim();
    if url.is_empty() {
        return None;
    }
    let title = page.title.trim();
    if title.is_empty() {
        Some(url.to_string())
    } else {
        Some(format!("[{title}]({url})"))
    }
}

fn content_block(content: &SelectedContent) -> String {
    let html = content.html.trim();
    let text = content.text.trim();

    if !html.is_empty() && !content.images.is_empty() {
        return convert_html_to_markdown(html, &content.images);
    }

    if !text.is_empty() {
        if content.images.is_empty() {
            return text.to_string();
        }
        let mut parts = vec![text.to_string()];
        parts.extend(content.images.iter().map(image_line));
        return parts.join("\n\n");
    }

    html.to_string()
}

fn image_line(image: &ImageRef) -> String {
    format!("![{}]({})", image.alt, image.src)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageInfo {
        PageInfo::new("https://a.test", "T")
    }

    fn text(t: &str) -> SelectedContent {
        SelectedContent {
            text: t.to_string(),
            ..SelectedContent::default()
        }
    }

    #[test]
    fn test_plain_text_with_title() {
        let md = format_markdown_content(&page(), "", "", &text("hi"));
        assert_eq!(md, "[T](https://a.test)\n\nhi");
    }

    #[test]
    fn test_untitled_page_uses_bare_url() {
        let md = format_markdown_content(
            &PageInfo::new("https://a.test", "  "),
            "",
            "",
            &text("hi"),
        );
        assert_eq!(md, "https://a.test\n\nhi");
    }

    #[test]
    fn test_prefix_and_suffix_are_trimmed_blocks() {
        let md = format_markdown_content(&page(), "  > clip \n", "\n#inbox ", &text("  body  "));
        assert_eq!(md, "[T](https://a.test)\n\n> clip\n\nbody\n\n#inbox");
    }

    #[test]
    fn test_blank_prefix_and_suffix_omitted() {
        let md = format_markdown_content(&page(), "   ", "\n", &text("x"));
        assert_eq!(md, "[T](https://a.test)\n\nx");
        assert!(!md.contains("\n\n\n"));
    }

    #[test]
    fn test_html_with_images_preserves_position() {
        let content = SelectedContent {
            text: "Before After".into(),
            html: r#"<p>Before</p><img src="/i.png" alt="pic"><p>After</p>"#.into(),
            images: vec![ImageRef::new("https://a.test/i.png", "pic", 0)],
        };
        let md = format_markdown_content(&page(), "", "", &content);
        assert_eq!(
            md,
            "[T](https://a.test)\n\nBefore\n\n![pic](https://a.test/i.png)After"
        );
    }

    #[test]
    fn test_text_with_images_but_no_html_lists_images() {
        let content = SelectedContent {
            text: "caption".into(),
            html: String::new(),
            images: vec![
                ImageRef::new("https://a.test/1.png", "one", 0),
                ImageRef::new("https://a.test/2.png", "", 1),
            ],
        };
        let md = format_markdown_content(&page(), "", "", &content);
        assert_eq!(
            md,
            "[T](https://a.test)\n\ncaption\n\n![one](https://a.test/1.png)\n\n![](https://a.test/2.png)"
        );
    }

    #[test]
    fn test_html_fallback_when_text_is_blank() {
        let content = SelectedContent {
            text: "  ".into(),
            html: " <b>raw</b> ".into(),
            images: Vec::new(),
        };
        let md = format_markdown_content(&page(), "", "", &content);
        assert_eq!(md, "[T](https://a.test)\n\n<b>raw</b>");
    }

    #[test]
    fn test_no_url_no_leading_link() {
        let md = format_markdown_content(&PageInfo::default(), "p", "", &text("x"));
        assert_eq!(md, "p\n\nx");
    }
}
