//! Realtime channel port
//!
//! A persistent, authenticated, auto-reconnecting event channel. Delivery is
//! at-least-once and may reorder across reconnects.

use tokio::sync::{broadcast, watch};

use crate::realtime::{ChannelState, RealtimeEvent};

pub trait RealtimeChannelPort: Send + Sync {
    /// Current and future connection states.
    fn state(&self) -> watch::Receiver<ChannelState>;

    /// Receive payloads of one event. Dropping the receiver unsubscribes.
    fn subscribe(&self, event: RealtimeEvent) -> broadcast::Receiver<serde_json::Value>;
}
