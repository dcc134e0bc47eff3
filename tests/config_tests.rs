//! Tests for the type-safe configuration builder pattern

use std::path::PathBuf;
use tilegrab::config::CaptureConfig;

#[test]
fn builder_requires_output_dir_and_start_url() {
    // These should not compile if uncommented - compile-time guarantees:
    // let config = CaptureConfig::builder().build();
    // let config = CaptureConfig::builder().output_dir("/tmp").build();

    let config = CaptureConfig::builder()
        .output_dir("/tmp/pages")
        .start_url("https://docs.example.com/document/d/abc")
        .build()
        .expect("both required fields provided");

    assert_eq!(config.output_dir(), &PathBuf::from("/tmp/pages"));
    assert_eq!(config.start_url(), "https://docs.example.com/document/d/abc");
}

#[test]
fn optional_fields_have_defaults() {
    let config = CaptureConfig::builder()
        .output_dir("/tmp/pages")
        .start_url("https://example.com/doc")
        .build()
        .expect("valid config");

    assert_eq!(config.total_pages(), None);
    assert_eq!(config.tile_selector(), "canvas.kix-canvas-tile-content");
    assert_eq!(config.scroll_delay_ms(), 1000);
    assert_eq!(config.max_stall_cycles(), 30);
    assert!(config.headless());
    assert_eq!(config.navigation_timeout_secs(), 30);
    assert!(config.event_bus().is_none());
    assert!(config.chrome_data_dir().is_none());
}

#[test]
fn start_url_without_scheme_is_normalized_to_https() {
    let config = CaptureConfig::builder()
        .output_dir("/tmp/pages")
        .start_url("docs.example.com/document/d/abc")
        .build()
        .expect("valid config");

    assert_eq!(
        config.start_url(),
        "https://docs.example.com/document/d/abc"
    );
}

#[test]
fn unparseable_url_is_rejected() {
    let result = CaptureConfig::builder()
        .output_dir("/tmp/pages")
        .start_url("https://")
        .build();
    assert!(result.is_err());
}

#[test]
fn zero_total_pages_is_rejected() {
    let result = CaptureConfig::builder()
        .output_dir("/tmp/pages")
        .start_url("https://example.com/doc")
        .total_pages(Some(0))
        .build();
    assert!(result.is_err());
}

#[test]
fn zero_stall_bound_is_rejected() {
    let result = CaptureConfig::builder()
        .output_dir("/tmp/pages")
        .start_url("https://example.com/doc")
        .max_stall_cycles(0)
        .build();
    assert!(result.is_err());
}

#[test]
fn overrides_are_applied() {
    let config = CaptureConfig::builder()
        .output_dir("/tmp/pages")
        .start_url("https://example.com/doc")
        .total_pages(Some(17))
        .tile_selector("canvas.page-tile")
        .scroll_delay_ms(250)
        .max_stall_cycles(5)
        .headless(false)
        .navigation_timeout_secs(60)
        .build()
        .expect("valid config");

    assert_eq!(config.total_pages(), Some(17));
    assert_eq!(config.tile_selector(), "canvas.page-tile");
    assert_eq!(config.scroll_delay_ms(), 250);
    assert_eq!(config.max_stall_cycles(), 5);
    assert!(!config.headless());
    assert_eq!(config.navigation_timeout_secs(), 60);
}
