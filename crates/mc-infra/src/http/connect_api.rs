use std::sync::Arc;

use async_trait::async_trait;
use mc_core::connect::{
    ConnectStatus, CreateAccountParams, CreateAccountResponse, OnboardingLinkResponse,
    RefreshStatusResponse,
};
use mc_core::ports::{ApiError, ConnectApiPort};
use serde_json::json;

use super::client::ApiClient;

/// `/stripe/connect/*` endpoints over the shared REST client.
pub struct HttpConnectApi {
    client: Arc<ApiClient>,
}

impl HttpConnectApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConnectApiPort for HttpConnectApi {
    async fn get_status(&self) -> Result<ConnectStatus, ApiError> {
        self.client.get("/stripe/connect/status").await
    }

    async fn create_account(
        &self,
        params: CreateAccountParams,
    ) -> Result<CreateAccountResponse, ApiError> {
        self.client
            .post("/stripe/connect/create-account", &params)
            .await
    }

    async fn get_onboarding_link(&self) -> Result<OnboardingLinkResponse, ApiError> {
        self.client
            .post("/stripe/connect/onboarding-link", &json!({}))
            .await
    }

    async fn refresh_status(&self) -> Result<RefreshStatusResponse, ApiError> {
        self.client
            .post("/stripe/connect/refresh-status", &json!({}))
            .await
    }
}
