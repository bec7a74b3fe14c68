//! # mc-platform
//!
//! Platform-facing adapters: where application data lives on this machine
//! and the websocket transport behind the realtime channel port.

pub mod app_dirs;
pub mod realtime;

pub use app_dirs::DirsAppDirsAdapter;
pub use realtime::{RealtimeError, WebSocketRealtimeChannel};
