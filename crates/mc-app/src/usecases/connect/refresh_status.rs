use std::sync::Arc;

use tracing::{debug, error, info, info_span, Instrument};

use mc_core::connect::ConnectStatus;
use mc_core::ports::ConnectApiPort;

use super::store::ConnectStatusStore;

const FETCH_FAILED: &str = "Failed to fetch Stripe Connect status";

/// Use case for fetching the authoritative Connect status.
///
/// On failure the store still ends up with a usable (never-onboarded)
/// status so gated screens keep rendering.
pub struct RefreshConnectStatus {
    api: Arc<dyn ConnectApiPort>,
    store: Arc<ConnectStatusStore>,
}

impl RefreshConnectStatus {
    pub fn new(api: Arc<dyn ConnectApiPort>, store: Arc<ConnectStatusStore>) -> Self {
        Self { api, store }
    }

    pub async fn execute(&self) {
        self.execute_in(self.store.session()).await
    }

    /// Fetch on behalf of `session`. The result is dropped if that session
    /// has been cleared by the time the backend answers.
    pub(crate) async fn execute_in(&self, session: u64) {
        let span = info_span!("usecase.connect.refresh_status", session);
        async {
            if self.store.session() != session {
                debug!("session already ended, skipping status fetch");
                return;
            }
            if !self.store.is_authenticated() {
                self.store.clear_session().await;
                return;
            }

            self.store.begin_fetch(session);
            let committed = match self.api.get_status().await {
                Ok(status) => {
                    info!(
                        state = %status.onboarding_state,
                        has_account = status.has_connected_account,
                        "connect status fetched"
                    );
                    self.store.commit(session, status).await
                }
                Err(err) => {
                    error!(error = %err, "failed to fetch connect status");
                    self.store
                        .commit_fallback(
                            session,
                            ConnectStatus::not_connected(),
                            err.user_message(FETCH_FAILED),
                        )
                        .await
                }
            };
            if !committed {
                debug!("session ended while fetching, status discarded");
            }
            self.store.finish_fetch(session);
        }
        .instrument(span)
        .await
    }
}
