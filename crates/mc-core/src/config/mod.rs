//! Pure data module: configuration DTOs only.
//!
//! No validation, no policy. Empty values are facts, not errors.

pub mod app_config;

pub use app_config::{AppConfig, DEFAULT_API_BASE_URL, DEFAULT_REALTIME_PATH, DEFAULT_TIMEOUT_SECS};
