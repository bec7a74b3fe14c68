//! Connect status cache over the key-value store
//!
//! Only statuses with a connected account are kept; anything unreadable is
//! treated as a miss and removed.

use std::sync::Arc;

use async_trait::async_trait;
use mc_core::connect::ConnectStatus;
use mc_core::ports::{KeyValueStorePort, StatusCachePort};
use tracing::warn;

pub const CONNECT_STATUS_KEY: &str = "stripeConnectStatus";

pub struct KeyValueStatusCache {
    store: Arc<dyn KeyValueStorePort>,
}

impl KeyValueStatusCache {
    pub fn new(store: Arc<dyn KeyValueStorePort>) -> Self {
        Self { store }
    }

    async fn discard(&self) {
        if let Err(err) = self.store.remove(CONNECT_STATUS_KEY).await {
            warn!(error = %err, "failed to remove corrupt connect status cache");
        }
    }
}

#[async_trait]
impl StatusCachePort for KeyValueStatusCache {
    async fn read(&self) -> Option<ConnectStatus> {
        let raw = match self.store.get(CONNECT_STATUS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed to read connect status cache");
                return None;
            }
        };

        match serde_json::from_str::<ConnectStatus>(&raw) {
            Ok(status) => Some(status),
            Err(err) => {
                warn!(error = %err, "discarding unreadable connect status cache");
                self.discard().await;
                None
            }
        }
    }

    async fn write(&self, status: Option<&ConnectStatus>) -> anyhow::Result<()> {
        match status.filter(|s| s.has_connected_account) {
            Some(status) => {
                let json = serde_json::to_string(status)?;
                self.store.set(CONNECT_STATUS_KEY, json).await
            }
            None => self.store.remove(CONNECT_STATUS_KEY).await,
        }
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(CONNECT_STATUS_KEY).await
    }
}
