//! Connect session lifecycle.
//!
//! This module defines the state machine that decides when the Connect
//! status is fetched or torn down relative to authentication.

pub mod state_machine;

pub use state_machine::{LifecycleAction, LifecycleEvent, LifecycleState, LifecycleStateMachine};
