use std::sync::Arc;

use async_trait::async_trait;
use mc_core::auth::{AuthTokens, User};
use mc_core::ports::{KeyValueStorePort, TokenStorePort};
use tracing::warn;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

/// Session credentials kept under their own keys of the key-value store.
pub struct KeyValueTokenStore {
    store: Arc<dyn KeyValueStorePort>,
}

impl KeyValueTokenStore {
    pub fn new(store: Arc<dyn KeyValueStorePort>) -> Self {
        Self { store }
    }

    async fn get_or_warn(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(err) => {
                warn!(error = %err, key, "failed to read stored session value");
                None
            }
        }
    }
}

#[async_trait]
impl TokenStorePort for KeyValueTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.get_or_warn(ACCESS_TOKEN_KEY).await
    }

    async fn refresh_token(&self) -> Option<String> {
        self.get_or_warn(REFRESH_TOKEN_KEY).await
    }

    async fn save_tokens(&self, tokens: &AuthTokens) -> anyhow::Result<()> {
        self.store
            .set(ACCESS_TOKEN_KEY, tokens.access_token.clone())
            .await?;
        self.store
            .set(REFRESH_TOKEN_KEY, tokens.refresh_token.clone())
            .await
    }

    async fn user(&self) -> Option<User> {
        let raw = self.get_or_warn(USER_KEY).await?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable stored user");
                None
            }
        }
    }

    async fn save_user(&self, user: &User) -> anyhow::Result<()> {
        self.store.set(USER_KEY, serde_json::to_string(user)?).await
    }

    async fn clear(&self) -> anyhow::Result<()> {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            self.store.remove(key).await?;
        }
        Ok(())
    }
}
