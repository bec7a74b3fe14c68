//! Merchant Console application layer
//!
//! Use cases and the Connect session container that screens read from.

pub mod usecases;

pub use usecases::auth::AuthSession;
pub use usecases::connect::{ConnectProvider, ConnectProviderDeps, ConnectState, ConnectStatusStore};
