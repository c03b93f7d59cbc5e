//! Cross-crate journey tests for Leadtrail
//!
//! The tests live under `tests/`; this library only re-exports the member
//! crates they exercise.

pub use leadtrail_config;
pub use leadtrail_core;
pub use leadtrail_funnels;
pub use leadtrail_tracking;
