//! Connect backend port
//!
//! The `/stripe/connect/*` endpoints, implemented by the HTTP adapter.

use async_trait::async_trait;

use crate::connect::{
    ConnectStatus, CreateAccountParams, CreateAccountResponse, OnboardingLinkResponse,
    RefreshStatusResponse,
};
use crate::ports::errors::ApiError;

#[async_trait]
pub trait ConnectApiPort: Send + Sync {
    /// `GET /stripe/connect/status`
    async fn get_status(&self) -> Result<ConnectStatus, ApiError>;

    /// `POST /stripe/connect/create-account`
    async fn create_account(
        &self,
        params: CreateAccountParams,
    ) -> Result<CreateAccountResponse, ApiError>;

    /// `POST /stripe/connect/onboarding-link`
    async fn get_onboarding_link(&self) -> Result<OnboardingLinkResponse, ApiError>;

    /// `POST /stripe/connect/refresh-status`
    async fn refresh_status(&self) -> Result<RefreshStatusResponse, ApiError>;
}
