use std::sync::Arc;

use tracing::{error, info_span, Instrument};

use mc_core::ports::ConnectApiPort;

use super::store::ConnectStatusStore;

const CONTINUE_FAILED: &str = "Failed to get onboarding link";

/// Use case for resuming onboarding on an existing account.
///
/// No refresh follows: the merchant leaves for the hosted flow and the
/// status comes back through the realtime channel or the next start.
pub struct ContinueOnboarding {
    api: Arc<dyn ConnectApiPort>,
    store: Arc<ConnectStatusStore>,
}

impl ContinueOnboarding {
    pub fn new(api: Arc<dyn ConnectApiPort>, store: Arc<ConnectStatusStore>) -> Self {
        Self { api, store }
    }

    pub async fn execute(&self) -> Option<String> {
        async {
            self.store.clear_error();
            match self.api.get_onboarding_link().await {
                Ok(response) => Some(response.onboarding_url),
                Err(err) => {
                    error!(error = %err, "failed to get onboarding link");
                    self.store.set_error(err.user_message(CONTINUE_FAILED));
                    None
                }
            }
        }
        .instrument(info_span!("usecase.connect.continue_onboarding"))
        .await
    }
}
