//! UTF-8-safe string truncation utilities
//!
//! File name limits are counted in bytes, so truncation has to land on a
//! character boundary to avoid splitting multi-byte characters.

/// Safely truncate a string to at most `max_bytes` bytes.
///
/// The cut is moved back to the nearest character boundary, so the result is
/// always valid UTF-8 and never longer than `max_bytes`.
///
/// # Examples
/// ```
/// # use kodegen_tools_clipper::utils::string_utils::safe_truncate_bytes;
/// assert_eq!(safe_truncate_bytes("Hello, World!", 5), "Hello");
///
/// // "é" is two bytes, the cut backs off instead of splitting it
/// assert_eq!(safe_truncate_bytes("café", 4), "caf");
///
/// assert_eq!(safe_truncate_bytes("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Split a file name into stem and extension (with its dot).
///
/// Only a short alphanumeric suffix counts as an extension; `"a.b c"` has none.
///
/// # Examples
/// ```
/// # use kodegen_tools_clipper::utils::string_utils::split_extension;
/// assert_eq!(split_extension("note.md"), ("note", ".md"));
/// assert_eq!(split_extension("archive"), ("archive", ""));
/// assert_eq!(split_extension("v1.2 draft"), ("v1.2 draft", ""));
/// ```
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext = &name[idx + 1..];
            if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            {
                (&name[..idx], &name[idx..])
            } else {
                (name, "")
            }
        }
        _ => (name, ""),
    }
}
