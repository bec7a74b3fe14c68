//! Connect lifecycle coordinator.
//!
//! Drives the lifecycle state machine from authentication snapshots and
//! runs its side effects against the status store. The initial fetch runs
//! outside the dispatch lock so sign-out and sign-in keep flowing through
//! the state machine while it is in flight.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use mc_core::auth::AuthSnapshot;
use mc_core::lifecycle::{LifecycleAction, LifecycleEvent, LifecycleState, LifecycleStateMachine};

use super::refresh_status::RefreshConnectStatus;
use super::store::ConnectStatusStore;

pub struct ConnectLifecycleCoordinator {
    store: Arc<ConnectStatusStore>,
    refresh: Arc<RefreshConnectStatus>,
    /// Serializes transitions so a state change and its quick actions run as one unit.
    dispatch_lock: Mutex<()>,
}

impl ConnectLifecycleCoordinator {
    pub fn new(store: Arc<ConnectStatusStore>, refresh: Arc<RefreshConnectStatus>) -> Self {
        Self {
            store,
            refresh,
            dispatch_lock: Mutex::new(()),
        }
    }

    /// Feed one authentication snapshot through the state machine and wait
    /// for any initialization it starts.
    ///
    /// Safe to call repeatedly with the same snapshot: only the first
    /// signed-in snapshot after a reset triggers a fetch. Callers that lose
    /// that race return while the winner is still initializing.
    pub async fn handle_auth(&self, auth: AuthSnapshot) -> LifecycleState {
        if let Some(session) = self.accept_auth(auth).await {
            self.initialize(session).await;
        }
        self.store.lifecycle()
    }

    /// Publish `auth` and run its transition. Returns the session to
    /// initialize when the transition asks for a fetch.
    async fn accept_auth(&self, auth: AuthSnapshot) -> Option<u64> {
        self.store.set_auth(auth);
        self.dispatch(LifecycleEvent::AuthChanged(auth)).await
    }

    async fn dispatch(&self, event: LifecycleEvent) -> Option<u64> {
        let _dispatch_guard = self.dispatch_lock.lock().await;
        self.transition(event).await
    }

    /// Caller holds `dispatch_lock`.
    async fn transition(&self, event: LifecycleEvent) -> Option<u64> {
        let span = info_span!("usecase.connect.lifecycle.dispatch", event = ?event);
        async {
            let from = self.store.lifecycle();
            let event_name = format!("{:?}", event);
            let (next, actions) = LifecycleStateMachine::transition(from, event);
            if from != next {
                info!(from = ?from, to = ?next, event = %event_name, "connect lifecycle transition");
            }
            self.store.set_lifecycle(next);

            let mut initialize = None;
            for action in actions {
                debug!(?action, "lifecycle executing action");
                match action {
                    LifecycleAction::ClearSession => self.store.clear_session().await,
                    LifecycleAction::RefreshStatus => initialize = Some(self.store.session()),
                }
            }
            initialize
        }
        .instrument(span)
        .await
    }

    /// Seed from cache, fetch, then report `InitializationFinished` unless
    /// `session` was cleared meanwhile.
    async fn initialize(&self, session: u64) {
        self.store.hydrate_from_cache(session).await;
        self.refresh.execute_in(session).await;

        let _dispatch_guard = self.dispatch_lock.lock().await;
        if self.store.session() != session {
            debug!(session, "initialization outlived its session, ignoring");
            return;
        }
        self.transition(LifecycleEvent::InitializationFinished).await;
    }

    /// Follow `auth` until it closes or `cancel` fires.
    ///
    /// Initializations run as separate tasks; on exit they are awaited, not
    /// aborted.
    pub async fn run(
        self: Arc<Self>,
        mut auth: watch::Receiver<AuthSnapshot>,
        cancel: CancellationToken,
    ) {
        let mut initializations = JoinSet::new();

        'follow: loop {
            let snapshot = *auth.borrow_and_update();
            if let Some(session) = self.accept_auth(snapshot).await {
                let coordinator = self.clone();
                initializations.spawn(async move { coordinator.initialize(session).await });
            }

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break 'follow,
                    changed = auth.changed() => {
                        if changed.is_err() {
                            debug!("auth channel closed, lifecycle coordinator stopping");
                            break 'follow;
                        }
                        break;
                    }
                    Some(joined) = initializations.join_next() => {
                        if let Err(err) = joined {
                            warn!(error = %err, "connect initialization task failed");
                        }
                    }
                }
            }
        }

        while let Some(joined) = initializations.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "connect initialization task failed");
            }
        }
    }
}
