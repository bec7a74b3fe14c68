use thiserror::Error;

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("invalid realtime endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("invalid access token for realtime handshake")]
    InvalidToken,

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
