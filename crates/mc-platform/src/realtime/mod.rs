mod channel;
mod error;

pub use channel::WebSocketRealtimeChannel;
pub use error::RealtimeError;
