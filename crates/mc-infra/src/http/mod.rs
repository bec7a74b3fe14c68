mod auth_api;
mod client;
mod connect_api;

pub use auth_api::HttpAuthApi;
pub use client::{ApiClient, DEFAULT_TIMEOUT};
pub use connect_api::HttpConnectApi;
