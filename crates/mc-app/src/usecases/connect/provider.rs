use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use mc_core::auth::AuthSnapshot;
use mc_core::connect::CreateAccountParams;
use mc_core::ports::{ConnectApiPort, RealtimeChannelPort, StatusCachePort};

use super::continue_onboarding::ContinueOnboarding;
use super::lifecycle::ConnectLifecycleCoordinator;
use super::refresh_status::RefreshConnectStatus;
use super::start_onboarding::StartOnboarding;
use super::store::{ConnectState, ConnectStatusStore};
use super::subscriber::ConnectStatusSubscriber;

/// Helper for constructing the provider with explicit dependency fields.
pub struct ConnectProviderDeps {
    pub api: Arc<dyn ConnectApiPort>,
    pub cache: Arc<dyn StatusCachePort>,
    /// Without a channel no realtime patches are applied.
    pub channel: Option<Arc<dyn RealtimeChannelPort>>,
}

/// The Connect session: status container plus the use cases that write it.
pub struct ConnectProvider {
    store: Arc<ConnectStatusStore>,
    refresh: Arc<RefreshConnectStatus>,
    start: StartOnboarding,
    resume: ContinueOnboarding,
    coordinator: Arc<ConnectLifecycleCoordinator>,
    subscriber: Option<Arc<ConnectStatusSubscriber>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ConnectProvider {
    pub fn from_deps(deps: ConnectProviderDeps) -> Self {
        let ConnectProviderDeps {
            api,
            cache,
            channel,
        } = deps;

        let store = ConnectStatusStore::new(cache).arc();
        let refresh = Arc::new(RefreshConnectStatus::new(api.clone(), store.clone()));
        let start = StartOnboarding::new(api.clone(), store.clone(), refresh.clone());
        let resume = ContinueOnboarding::new(api, store.clone());
        let coordinator = Arc::new(ConnectLifecycleCoordinator::new(
            store.clone(),
            refresh.clone(),
        ));
        let subscriber = channel
            .map(|channel| Arc::new(ConnectStatusSubscriber::new(channel, store.clone())));

        Self {
            store,
            refresh,
            start,
            resume,
            coordinator,
            subscriber,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<ConnectStatusStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<ConnectLifecycleCoordinator> {
        &self.coordinator
    }

    pub fn snapshot(&self) -> ConnectState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectState> {
        self.store.subscribe()
    }

    pub async fn refresh_status(&self) {
        self.refresh.execute().await
    }

    pub async fn start_onboarding(&self, params: CreateAccountParams) -> Option<String> {
        self.start.execute(params).await
    }

    pub async fn continue_onboarding(&self) -> Option<String> {
        self.resume.execute().await
    }

    /// Start following `auth` and, when configured, the realtime channel.
    pub async fn spawn(&self, auth: watch::Receiver<AuthSnapshot>) {
        let mut tasks = self.tasks.lock().await;

        let coordinator = self.coordinator.clone();
        let cancel = self.cancel.child_token();
        tasks.push(tokio::spawn(async move {
            coordinator.run(auth, cancel).await;
        }));

        if let Some(subscriber) = self.subscriber.clone() {
            let cancel = self.cancel.child_token();
            tasks.push(tokio::spawn(async move {
                subscriber.run(cancel).await;
            }));
        }
        debug!(tasks = tasks.len(), "connect provider started");
    }

    /// Stop background tasks. In-flight requests are not aborted.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        for task in tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "connect provider task ended abnormally");
            }
        }
    }
}
