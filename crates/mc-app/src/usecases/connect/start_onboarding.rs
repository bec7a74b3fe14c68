use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};

use mc_core::connect::CreateAccountParams;
use mc_core::ports::ConnectApiPort;

use super::refresh_status::RefreshConnectStatus;
use super::store::ConnectStatusStore;

const START_FAILED: &str = "Failed to start onboarding";

/// Use case for creating the connected account.
///
/// Returns the hosted onboarding URL, or `None` when the account could not
/// be created (the message lands in the shared `error` slot).
pub struct StartOnboarding {
    api: Arc<dyn ConnectApiPort>,
    store: Arc<ConnectStatusStore>,
    refresh: Arc<RefreshConnectStatus>,
}

impl StartOnboarding {
    pub fn new(
        api: Arc<dyn ConnectApiPort>,
        store: Arc<ConnectStatusStore>,
        refresh: Arc<RefreshConnectStatus>,
    ) -> Self {
        Self {
            api,
            store,
            refresh,
        }
    }

    pub async fn execute(&self, params: CreateAccountParams) -> Option<String> {
        let span = info_span!(
            "usecase.connect.start_onboarding",
            country = params.country.as_deref().unwrap_or("")
        );
        async {
            self.store.clear_error();
            match self.api.create_account(params).await {
                Ok(response) => {
                    info!(account_id = %response.account_id, "connected account created");
                    self.refresh.execute().await;
                    Some(response.onboarding_url)
                }
                Err(err) => {
                    error!(error = %err, "failed to start onboarding");
                    self.store.set_error(err.user_message(START_FAILED));
                    None
                }
            }
        }
        .instrument(span)
        .await
    }
}
