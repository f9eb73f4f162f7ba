pub mod constants;
pub mod filename;
pub mod string_utils;

pub use constants::*;
pub use filename::{ensure_markdown_name, sanitize_file_name, with_timestamp_suffix};
