//! Best-effort page-count detection
//!
//! Document viewers usually surface the page total somewhere in their
//! chrome as "<current> of <total>" - a tooltip on the scroll position,
//! a status bar entry. This heuristic scrapes those spots. It is not part
//! of the capture protocol: when it fails, the caller must supply an
//! explicit total.

use chromiumoxide::Page;
use once_cell::sync::Lazy;
use regex::Regex;

use super::error::CaptureError;

static PAGE_OF_TOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+\s+of\s+(\d+)").expect("PAGE_OF_TOTAL: hardcoded regex is valid")
});

const CANDIDATE_TEXT_SCRIPT: &str = r#"(() => {
    const texts = [];
    for (const el of document.querySelectorAll('div[class*="jfk-tooltip-content"]')) {
        if (el.textContent) texts.push(el.textContent);
    }
    for (const el of document.querySelectorAll('.docs-status-container *')) {
        if (el.textContent) texts.push(el.textContent);
    }
    return texts;
})()"#;

/// Try to read the document's total page count from viewer chrome.
///
/// Returns `Ok(None)` when nothing on the page looks like a page total.
///
/// # Errors
/// Propagates browser/script failures; a page without the expected
/// elements is not an error.
pub async fn detect_page_count(page: &Page) -> Result<Option<u32>, CaptureError> {
    let candidates: Vec<String> = page.evaluate(CANDIDATE_TEXT_SCRIPT).await?.into_value()?;
    Ok(extract_total(&candidates))
}

/// Pull the first "<n> of <total>" total out of candidate texts.
fn extract_total(candidates: &[String]) -> Option<u32> {
    candidates.iter().find_map(|text| {
        PAGE_OF_TOTAL
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_total_in_tooltip_text() {
        let candidates = vec!["3 of 42".to_string()];
        assert_eq!(extract_total(&candidates), Some(42));
    }

    #[test]
    fn is_case_insensitive_and_skips_noise() {
        let candidates = vec![
            "Loading…".to_string(),
            "Page 1 OF 7".to_string(),
        ];
        assert_eq!(extract_total(&candidates), Some(7));
    }

    #[test]
    fn none_when_no_candidate_matches() {
        let candidates = vec!["saving".to_string(), "v1 of-doc".to_string()];
        assert_eq!(extract_total(&candidates), None);
    }

    #[test]
    fn none_on_empty_candidates() {
        assert_eq!(extract_total(&[]), None);
    }
}
