mod file_kv;
mod memory_kv;
mod status_cache;
mod token_store;

pub use file_kv::{FileKeyValueStore, DEFAULT_STORAGE_FILE};
pub use memory_kv::InMemoryKeyValueStore;
pub use status_cache::{KeyValueStatusCache, CONNECT_STATUS_KEY};
pub use token_store::{KeyValueTokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
