//! Keeps the realtime channel in step with the auth session.
//!
//! Signed in with a stored access token: connect. Signed out: disconnect.
//! Without a token the channel is left disconnected.

use std::sync::Arc;

use mc_core::auth::AuthSnapshot;
use mc_core::ports::TokenStorePort;
use mc_platform::WebSocketRealtimeChannel;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct RealtimeConnector {
    channel: Arc<WebSocketRealtimeChannel>,
    tokens: Arc<dyn TokenStorePort>,
}

impl RealtimeConnector {
    pub fn new(channel: Arc<WebSocketRealtimeChannel>, tokens: Arc<dyn TokenStorePort>) -> Self {
        Self { channel, tokens }
    }

    pub async fn apply(&self, auth: AuthSnapshot) {
        if auth.loading {
            return;
        }
        if !auth.authenticated {
            self.channel.disconnect().await;
            return;
        }

        let Some(token) = self.tokens.access_token().await else {
            warn!("signed in without an access token, realtime channel stays disconnected");
            self.channel.disconnect().await;
            return;
        };
        match self.channel.connect(&token).await {
            Ok(()) => info!(endpoint = %self.channel.endpoint(), "realtime channel starting"),
            Err(err) => warn!(error = %err, "realtime channel could not start"),
        }
    }

    /// Follow `auth` until it closes or `cancel` fires, then disconnect.
    pub async fn run(&self, mut auth: watch::Receiver<AuthSnapshot>, cancel: CancellationToken) {
        let mut last = None;
        loop {
            let snapshot = *auth.borrow_and_update();
            // Reconnect only when the resolved sign-in state flips.
            let resolved = (!snapshot.loading).then_some(snapshot.authenticated);
            if resolved.is_some() && resolved != last {
                self.apply(snapshot).await;
                last = resolved;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = auth.changed() => {
                    if changed.is_err() {
                        debug!("auth channel closed, realtime connector stopping");
                        break;
                    }
                }
            }
        }
        self.channel.disconnect().await;
    }
}
