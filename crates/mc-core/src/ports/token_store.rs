use async_trait::async_trait;

use crate::auth::{AuthTokens, User};

/// Persisted session credentials.
#[async_trait]
pub trait TokenStorePort: Send + Sync {
    async fn access_token(&self) -> Option<String>;

    async fn refresh_token(&self) -> Option<String>;

    async fn save_tokens(&self, tokens: &AuthTokens) -> anyhow::Result<()>;

    async fn user(&self) -> Option<User>;

    async fn save_user(&self, user: &User) -> anyhow::Result<()>;

    /// Forget tokens and user.
    async fn clear(&self) -> anyhow::Result<()>;
}
