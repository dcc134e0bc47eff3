//! File-name and display-list string helpers
//!
//! Sanitization mirrors what file managers reject: the characters that are
//! invalid in Windows file names are replaced so a document title can be
//! used verbatim as a folder and file-name component.

/// Characters that may not appear in a file or folder name component.
const FORBIDDEN: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replace every forbidden file-name character in `name` with `_`.
///
/// The input is otherwise preserved, including whitespace and Unicode,
/// so titles stay recognizable in the output directory.
///
/// # Examples
/// ```
/// # use tilegrab::utils::sanitize_file_name;
/// assert_eq!(sanitize_file_name("Report: Q3/Q4?"), "Report_ Q3_Q4_");
/// assert_eq!(sanitize_file_name("plain title"), "plain title");
/// ```
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect()
}

/// Render a list of display page numbers for status output.
///
/// Returns `"-"` for an empty list, matching the waiting-pages status
/// contract where a dash means "nothing outstanding".
#[must_use]
pub fn format_display_ids(ids: &[u32]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
