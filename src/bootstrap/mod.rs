pub mod config;
pub mod realtime;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use run::run_command;
pub use wiring::{resolve_config, wire_console, Console};
