//! Merchant console client
//!
//! Composition root: configuration, logging, dependency wiring and the
//! command-line front end over the `mc-*` crates.

pub mod bootstrap;
pub mod cli;
