//! Realtime channel vocabulary.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Named events pushed by the backend over the realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealtimeEvent {
    ConnectStatusUpdated,
    OrderCreated,
    OrderUpdated,
    PaymentReceived,
}

impl RealtimeEvent {
    pub const ALL: [RealtimeEvent; 4] = [
        RealtimeEvent::ConnectStatusUpdated,
        RealtimeEvent::OrderCreated,
        RealtimeEvent::OrderUpdated,
        RealtimeEvent::PaymentReceived,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::ConnectStatusUpdated => "connect:status_updated",
            RealtimeEvent::OrderCreated => "order:created",
            RealtimeEvent::OrderUpdated => "order:updated",
            RealtimeEvent::PaymentReceived => "payment:received",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ChannelState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ChannelState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ChannelState::Connected)
    }
}

/// Fixed-delay reconnection budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(1000),
        }
    }
}

/// One text frame on the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeFrame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}
