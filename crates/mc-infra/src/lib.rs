//! Infrastructure adapters for the Merchant Console
//!
//! - `http`: the backend REST client and the Connect / auth API ports on top of it
//! - `storage`: the persisted key-value store and the status cache and token
//!   store built on it

pub mod http;
pub mod storage;

pub use http::{ApiClient, HttpAuthApi, HttpConnectApi};
pub use storage::{
    FileKeyValueStore, InMemoryKeyValueStore, KeyValueStatusCache, KeyValueTokenStore,
};
