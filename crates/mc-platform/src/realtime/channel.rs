//! WebSocket realtime channel
//!
//! One authenticated connection per session. Text frames are
//! `{"event": "<name>", "data": {...}}` and fan out to per-event broadcast
//! senders; dropped connections are retried with a fixed delay until the
//! reconnect budget runs out.

use std::sync::Arc;

use futures::StreamExt;
use mc_core::ports::RealtimeChannelPort;
use mc_core::realtime::{ChannelState, RealtimeEvent, RealtimeFrame, ReconnectPolicy};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::error::RealtimeError;

const EVENT_BUFFER: usize = 64;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct EventSenders {
    connect_status_updated: broadcast::Sender<Value>,
    order_created: broadcast::Sender<Value>,
    order_updated: broadcast::Sender<Value>,
    payment_received: broadcast::Sender<Value>,
}

impl EventSenders {
    fn new() -> Self {
        Self {
            connect_status_updated: broadcast::channel(EVENT_BUFFER).0,
            order_created: broadcast::channel(EVENT_BUFFER).0,
            order_updated: broadcast::channel(EVENT_BUFFER).0,
            payment_received: broadcast::channel(EVENT_BUFFER).0,
        }
    }

    fn get(&self, event: RealtimeEvent) -> &broadcast::Sender<Value> {
        match event {
            RealtimeEvent::ConnectStatusUpdated => &self.connect_status_updated,
            RealtimeEvent::OrderCreated => &self.order_created,
            RealtimeEvent::OrderUpdated => &self.order_updated,
            RealtimeEvent::PaymentReceived => &self.payment_received,
        }
    }

    fn dispatch(&self, text: &str) {
        let frame: RealtimeFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "ignoring malformed realtime frame");
                return;
            }
        };
        match RealtimeEvent::from_name(&frame.event) {
            Some(event) => {
                // No receivers just means nobody listens to this event yet.
                let delivered = self.get(event).send(frame.data).unwrap_or(0);
                debug!(event = event.name(), delivered, "realtime event received");
            }
            None => debug!(event = %frame.event, "ignoring unknown realtime event"),
        }
    }
}

struct Session {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct WebSocketRealtimeChannel {
    endpoint: String,
    policy: ReconnectPolicy,
    state: Arc<watch::Sender<ChannelState>>,
    senders: Arc<EventSenders>,
    session: Mutex<Option<Session>>,
}

impl WebSocketRealtimeChannel {
    pub fn new(endpoint: impl Into<String>, policy: ReconnectPolicy) -> Self {
        let (state, _) = watch::channel(ChannelState::Disconnected);
        Self {
            endpoint: endpoint.into(),
            policy,
            state: Arc::new(state),
            senders: Arc::new(EventSenders::new()),
            session: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open a session authenticated with `access_token`, replacing any
    /// existing one.
    pub async fn connect(&self, access_token: &str) -> Result<(), RealtimeError> {
        build_request(&self.endpoint, access_token)?;

        let mut session = self.session.lock().await;
        if let Some(previous) = session.take() {
            stop(previous).await;
        }

        let cancel = CancellationToken::new();
        let span = info_span!("platform.realtime.session", endpoint = %self.endpoint);
        let task = tokio::spawn(
            run_session(
                self.endpoint.clone(),
                access_token.to_string(),
                self.policy,
                self.state.clone(),
                self.senders.clone(),
                cancel.clone(),
            )
            .instrument(span),
        );
        *session = Some(Session { cancel, task });
        Ok(())
    }

    /// Close the session, if any. Subscribers keep their receivers.
    pub async fn disconnect(&self) {
        if let Some(session) = self.session.lock().await.take() {
            stop(session).await;
        }
        self.state.send_replace(ChannelState::Disconnected);
    }

    /// Whether a session task is still running, connected or retrying.
    pub async fn is_session_active(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(|session| !session.task.is_finished())
    }
}

impl RealtimeChannelPort for WebSocketRealtimeChannel {
    fn state(&self) -> watch::Receiver<ChannelState> {
        self.state.subscribe()
    }

    fn subscribe(&self, event: RealtimeEvent) -> broadcast::Receiver<Value> {
        self.senders.get(event).subscribe()
    }
}

async fn stop(session: Session) {
    session.cancel.cancel();
    if let Err(err) = session.task.await {
        warn!(error = %err, "realtime session task ended abnormally");
    }
}

fn build_request(
    endpoint: &str,
    access_token: &str,
) -> Result<Request, RealtimeError> {
    let mut request = endpoint
        .into_client_request()
        .map_err(|e| RealtimeError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
    let bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
        .map_err(|_| RealtimeError::InvalidToken)?;
    request.headers_mut().insert(AUTHORIZATION, bearer);
    Ok(request)
}

async fn run_session(
    endpoint: String,
    access_token: String,
    policy: ReconnectPolicy,
    state: Arc<watch::Sender<ChannelState>>,
    senders: Arc<EventSenders>,
    cancel: CancellationToken,
) {
    let mut failed_attempts = 0u32;

    loop {
        let request = match build_request(&endpoint, &access_token) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "realtime handshake request rejected");
                break;
            }
        };
        state.send_replace(ChannelState::Connecting);

        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = tokio_tungstenite::connect_async(request) => result,
        };

        match connected {
            Ok((socket, _response)) => {
                failed_attempts = 0;
                state.send_replace(ChannelState::Connected);
                info!("realtime channel connected");

                if read_frames(socket, &senders, &cancel).await {
                    break;
                }
                info!("realtime channel dropped");
            }
            Err(err) => warn!(error = %err, "realtime connection attempt failed"),
        }

        state.send_replace(ChannelState::Disconnected);
        failed_attempts += 1;
        if failed_attempts > policy.max_attempts {
            warn!(
                attempts = policy.max_attempts,
                "realtime reconnect budget exhausted, staying disconnected"
            );
            break;
        }

        debug!(
            attempt = failed_attempts,
            delay_ms = policy.delay.as_millis() as u64,
            "scheduling realtime reconnect"
        );
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(policy.delay) => {}
        }
    }

    state.send_replace(ChannelState::Disconnected);
}

/// Pump frames until the socket ends. Returns `true` when cancelled.
async fn read_frames(
    mut socket: Socket,
    senders: &EventSenders,
    cancel: &CancellationToken,
) -> bool {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(err) = socket.close(None).await {
                    debug!(error = %err, "realtime close handshake failed");
                }
                return true;
            }
            next = socket.next() => next,
        };

        match next {
            Some(Ok(Message::Text(text))) => senders.dispatch(text.as_str()),
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "realtime channel closed by server");
                return false;
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                warn!(error = %err, "realtime channel read failed");
                return false;
            }
            None => return false,
        }
    }
}
