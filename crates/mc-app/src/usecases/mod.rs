//! Business logic use cases
//!
//! auth     -> publishes AuthSnapshot
//!   |
//! connect  -> lifecycle coordinator -> refresh status
//!             realtime subscriber   -> merge events
//!             start / continue onboarding

pub mod auth;
pub mod connect;
