use std::sync::Arc;

use async_trait::async_trait;
use mc_core::auth::{LoginCredentials, LoginResponse, User};
use mc_core::ports::{ApiError, AuthApiPort};
use serde_json::json;

use super::client::ApiClient;

/// `/auth/*` endpoints over the shared REST client.
pub struct HttpAuthApi {
    client: Arc<ApiClient>,
}

impl HttpAuthApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthApiPort for HttpAuthApi {
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginResponse, ApiError> {
        self.client.post("/auth/login", &credentials).await
    }

    async fn logout(&self, refresh_token: String) -> Result<(), ApiError> {
        self.client
            .post_unit("/auth/logout", &json!({ "refreshToken": refresh_token }))
            .await
    }

    async fn me(&self) -> Result<User, ApiError> {
        self.client.get("/auth/me").await
    }
}
