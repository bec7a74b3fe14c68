//! # mc-core
//!
//! Core domain models and ports for the Merchant Console.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

pub mod app_dirs;
pub mod auth;
pub mod config;
pub mod connect;
pub mod lifecycle;
pub mod ports;
pub mod realtime;

// Re-export commonly used types at the crate root
pub use auth::{AuthSnapshot, AuthTokens, LoginCredentials, User};
pub use config::AppConfig;
pub use connect::{ConnectProjection, ConnectStatus, OnboardingPrompt, OnboardingState, StatusUpdatedEvent};
pub use lifecycle::{LifecycleAction, LifecycleEvent, LifecycleState, LifecycleStateMachine};
pub use realtime::{ChannelState, RealtimeEvent, ReconnectPolicy};
