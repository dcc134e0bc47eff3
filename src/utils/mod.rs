pub mod constants;
pub mod string_utils;

pub use constants::*;
pub use string_utils::{format_display_ids, sanitize_file_name};
