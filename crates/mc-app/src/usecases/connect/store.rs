use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use mc_core::auth::AuthSnapshot;
use mc_core::connect::{
    ConnectProjection, ConnectStatus, OnboardingPrompt, OnboardingState, StatusUpdatedEvent,
};
use mc_core::lifecycle::LifecycleState;
use mc_core::ports::StatusCachePort;

/// Everything a Connect-gated screen reads.
///
/// Published as a whole on every write, so readers never observe a
/// partially updated status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectState {
    pub status: Option<ConnectStatus>,
    /// A status fetch is in flight.
    pub fetching: bool,
    /// Last failure of a fetch or an onboarding action.
    pub error: Option<String>,
    pub auth: AuthSnapshot,
    pub lifecycle: LifecycleState,
    /// Timestamp of the newest realtime event applied.
    pub last_event_at: Option<DateTime<Utc>>,
    /// Bumped on every session clear; writes tagged with an older value are dropped.
    #[serde(skip)]
    session: u64,
}

impl Default for ConnectState {
    fn default() -> Self {
        Self {
            status: None,
            fetching: true,
            error: None,
            auth: AuthSnapshot::resolving(),
            lifecycle: LifecycleState::AwaitingAuth,
            last_event_at: None,
            session: 0,
        }
    }
}

impl ConnectState {
    pub fn projection(&self) -> ConnectProjection {
        ConnectProjection::from_status(self.status.as_ref())
    }

    pub fn is_onboarded(&self) -> bool {
        self.projection().is_onboarded
    }

    pub fn onboarding_state(&self) -> OnboardingState {
        self.projection().onboarding_state
    }

    pub fn is_loading(&self) -> bool {
        self.fetching || self.auth.loading
    }

    pub fn prompt(&self) -> OnboardingPrompt {
        OnboardingPrompt::for_status(self.status.as_ref())
    }

    pub fn show_banner(&self) -> bool {
        self.projection().show_banner(self.is_loading())
    }
}

/// Owner of the in-memory Connect status and its cached mirror.
///
/// Writes go through the crate-internal methods below and always publish a
/// complete `ConnectState`; screens only read snapshots or subscribe.
///
/// Fetch results are tagged with the session they were started in and are
/// discarded once that session has been cleared.
pub struct ConnectStatusStore {
    state: watch::Sender<ConnectState>,
    cache: Arc<dyn StatusCachePort>,
    /// Held across a state change and its cache mirror so the cache follows
    /// the state's write order.
    mirror_lock: Mutex<()>,
}

impl ConnectStatusStore {
    pub fn new(cache: Arc<dyn StatusCachePort>) -> Self {
        let (state, _) = watch::channel(ConnectState::default());
        Self {
            state,
            cache,
            mirror_lock: Mutex::new(()),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn snapshot(&self) -> ConnectState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().auth.authenticated
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state.borrow().lifecycle
    }

    pub(crate) fn session(&self) -> u64 {
        self.state.borrow().session
    }

    pub(crate) fn set_auth(&self, auth: AuthSnapshot) {
        self.state.send_if_modified(|state| {
            let changed = state.auth != auth;
            state.auth = auth;
            changed
        });
    }

    pub(crate) fn set_lifecycle(&self, lifecycle: LifecycleState) {
        self.state.send_if_modified(|state| {
            let changed = state.lifecycle != lifecycle;
            state.lifecycle = lifecycle;
            changed
        });
    }

    pub(crate) fn begin_fetch(&self, session: u64) -> bool {
        self.state.send_if_modified(|state| {
            if state.session != session {
                return false;
            }
            state.fetching = true;
            state.error = None;
            true
        })
    }

    pub(crate) fn finish_fetch(&self, session: u64) {
        self.state.send_if_modified(|state| {
            state.session == session && std::mem::take(&mut state.fetching)
        });
    }

    pub(crate) fn set_error(&self, message: String) {
        self.state.send_modify(|state| state.error = Some(message));
    }

    pub(crate) fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Replace the held status with an authoritative one and mirror it.
    ///
    /// Returns `false` without writing when `session` has ended.
    pub(crate) async fn commit(&self, session: u64, status: ConnectStatus) -> bool {
        let _mirror_guard = self.mirror_lock.lock().await;
        let committed = self.state.send_if_modified(|state| {
            if state.session != session {
                return false;
            }
            state.status = Some(status.clone());
            true
        });
        if committed {
            if let Err(err) = self.cache.write(Some(&status)).await {
                warn!(error = %err, "failed to write connect status cache");
            }
        }
        committed
    }

    /// Replace the held status with a stand-in, record `error` and drop the
    /// cached copy.
    pub(crate) async fn commit_fallback(
        &self,
        session: u64,
        status: ConnectStatus,
        error: String,
    ) -> bool {
        let _mirror_guard = self.mirror_lock.lock().await;
        let committed = self.state.send_if_modified(|state| {
            if state.session != session {
                return false;
            }
            state.status = Some(status);
            state.error = Some(error);
            true
        });
        if committed {
            if let Err(err) = self.cache.clear().await {
                warn!(error = %err, "failed to clear connect status cache");
            }
        }
        committed
    }

    /// Merge a realtime event into the held status.
    ///
    /// Returns `false` when signed out or when the event is older than one
    /// already applied.
    pub(crate) async fn apply_event(&self, event: &StatusUpdatedEvent) -> bool {
        let _mirror_guard = self.mirror_lock.lock().await;
        let mut merged = None;
        self.state.send_if_modified(|state| {
            if !state.auth.authenticated || event.is_older_than(state.last_event_at) {
                return false;
            }
            let next = event.merge_into(state.status.as_ref());
            state.status = Some(next.clone());
            state.last_event_at = event.timestamp.or(state.last_event_at);
            merged = Some(next);
            true
        });

        let Some(status) = merged else {
            return false;
        };
        if let Err(err) = self.cache.write(Some(&status)).await {
            warn!(error = %err, "failed to write connect status cache");
        }
        true
    }

    /// Seed the status from the cache when nothing is held yet.
    pub(crate) async fn hydrate_from_cache(&self, session: u64) -> bool {
        let _mirror_guard = self.mirror_lock.lock().await;
        if self.state.borrow().status.is_some() {
            return false;
        }
        let Some(cached) = self.cache.read().await else {
            return false;
        };
        let seeded = self.state.send_if_modified(|state| {
            if state.session != session || state.status.is_some() {
                return false;
            }
            state.status = Some(cached);
            true
        });
        if seeded {
            debug!("seeded connect status from cache");
        }
        seeded
    }

    /// Forget everything tied to the signed-in session and start a new one.
    pub(crate) async fn clear_session(&self) {
        let _mirror_guard = self.mirror_lock.lock().await;
        self.state.send_modify(|state| {
            state.status = None;
            state.fetching = false;
            state.last_event_at = None;
            state.session += 1;
        });
        if let Err(err) = self.cache.clear().await {
            warn!(error = %err, "failed to clear connect status cache");
        }
    }
}
