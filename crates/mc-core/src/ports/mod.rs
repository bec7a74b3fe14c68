//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. This follows Hexagonal Architecture
//! principles, allowing the core business logic to remain independent of
//! the backend, the local store and the realtime transport.

pub mod app_dirs;
pub mod auth_api;
pub mod connect_api;
pub mod errors;
pub mod key_value_store;
pub mod realtime;
pub mod status_cache;
pub mod token_store;

pub use app_dirs::AppDirsPort;
pub use auth_api::AuthApiPort;
pub use connect_api::ConnectApiPort;
pub use errors::{ApiError, AppDirsError};
pub use key_value_store::KeyValueStorePort;
pub use realtime::RealtimeChannelPort;
pub use status_cache::StatusCachePort;
pub use token_store::TokenStorePort;
