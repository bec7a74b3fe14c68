//! Realtime Connect status subscriber.
//!
//! Patches the held status from `connect:status_updated` events. Never
//! touches the loading flag or the error slot.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mc_core::connect::StatusUpdatedEvent;
use mc_core::ports::RealtimeChannelPort;
use mc_core::realtime::RealtimeEvent;

use super::store::ConnectStatusStore;

pub struct ConnectStatusSubscriber {
    channel: Arc<dyn RealtimeChannelPort>,
    store: Arc<ConnectStatusStore>,
}

impl ConnectStatusSubscriber {
    pub fn new(channel: Arc<dyn RealtimeChannelPort>, store: Arc<ConnectStatusStore>) -> Self {
        Self { channel, store }
    }

    /// Merge one raw event payload. Returns whether the status changed hands.
    ///
    /// Events that arrive after sign-out are dropped.
    pub async fn apply(&self, payload: serde_json::Value) -> bool {
        if !self.store.is_authenticated() {
            debug!("ignoring connect status event while signed out");
            return false;
        }

        let event = match serde_json::from_value::<StatusUpdatedEvent>(payload) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "ignoring malformed connect status event");
                return false;
            }
        };

        let applied = self.store.apply_event(&event).await;
        if applied {
            info!(
                organization_id = %event.organization_id,
                state = %event.onboarding_state,
                "connect status updated from realtime event"
            );
        } else {
            debug!(timestamp = ?event.timestamp, "dropping stale connect status event");
        }
        applied
    }

    /// Subscribe while the channel is connected, until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut channel_state = self.channel.state();

        loop {
            while !channel_state.borrow_and_update().is_connected() {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    changed = channel_state.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }

            let mut events = self.channel.subscribe(RealtimeEvent::ConnectStatusUpdated);
            debug!("subscribed to connect status updates");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    changed = channel_state.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        if !channel_state.borrow_and_update().is_connected() {
                            debug!("realtime channel disconnected, unsubscribing");
                            break;
                        }
                    }
                    received = events.recv() => match received {
                        Ok(payload) => {
                            self.apply(payload).await;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "connect status subscriber lagged");
                        }
                        Err(RecvError::Closed) => return,
                    },
                }
            }
        }
    }
}
