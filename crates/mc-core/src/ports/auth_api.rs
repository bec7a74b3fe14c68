use async_trait::async_trait;

use crate::auth::{LoginCredentials, LoginResponse, User};
use crate::ports::errors::ApiError;

#[async_trait]
pub trait AuthApiPort: Send + Sync {
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginResponse, ApiError>;

    /// Invalidate a refresh token server-side.
    async fn logout(&self, refresh_token: String) -> Result<(), ApiError>;

    /// `GET /auth/me`
    async fn me(&self) -> Result<User, ApiError>;
}
