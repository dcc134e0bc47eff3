//! Configuration for capture sessions
//!
//! `CaptureConfig` is built through a typestate builder that makes the
//! two required fields - output directory and document URL - impossible
//! to omit at compile time.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::CaptureConfigBuilder;
pub use types::CaptureConfig;
