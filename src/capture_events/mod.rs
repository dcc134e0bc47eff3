//! Event system for tracking and reporting capture-run progress
//!
//! This module provides the event bus used to publish run status to
//! observers (the CLI, embedders, tests), with support for metrics and
//! filtered subscriptions.

// Sub-modules
pub mod bus;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod streaming;
pub mod types;

// Re-exports for public API
pub use bus::CaptureEventBus;
pub use config::EventBusConfig;
pub use errors::EventBusError;
pub use metrics::EventBusMetrics;
pub use streaming::FilteredReceiver;
pub use types::{CaptureEvent, ShutdownReason};
