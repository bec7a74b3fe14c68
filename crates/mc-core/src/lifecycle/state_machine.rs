//! Lifecycle state machine.
//!
//! Defines a pure state transition function over authentication input.

use crate::auth::AuthSnapshot;

/// Where the Connect session stands relative to authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LifecycleState {
    /// Authentication has not resolved yet.
    #[default]
    AwaitingAuth,
    /// Resolved as signed out. Nothing is held.
    SignedOut,
    /// Signed in; the initial fetch is running.
    Initializing,
    /// Signed in and initialized.
    Ready,
}

/// Events that drive the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LifecycleEvent {
    /// The authentication subsystem published a new snapshot.
    AuthChanged(AuthSnapshot),
    /// The initial fetch settled (success or failure).
    InitializationFinished,
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LifecycleAction {
    /// Drop the held status and the cached copy.
    ClearSession,
    /// Seed from cache if nothing is held, then fetch the status.
    RefreshStatus,
}

/// Pure lifecycle state machine.
pub struct LifecycleStateMachine;

impl LifecycleStateMachine {
    pub fn transition(
        state: LifecycleState,
        event: LifecycleEvent,
    ) -> (LifecycleState, Vec<LifecycleAction>) {
        match (state, event) {
            (state, LifecycleEvent::AuthChanged(auth)) if auth.loading => (state, Vec::new()),
            (LifecycleState::SignedOut, LifecycleEvent::AuthChanged(auth))
                if !auth.authenticated =>
            {
                (LifecycleState::SignedOut, Vec::new())
            }
            (_, LifecycleEvent::AuthChanged(auth)) if !auth.authenticated => (
                LifecycleState::SignedOut,
                vec![LifecycleAction::ClearSession],
            ),
            (
                LifecycleState::AwaitingAuth | LifecycleState::SignedOut,
                LifecycleEvent::AuthChanged(_),
            ) => (
                LifecycleState::Initializing,
                vec![LifecycleAction::RefreshStatus],
            ),
            (LifecycleState::Initializing, LifecycleEvent::InitializationFinished) => {
                (LifecycleState::Ready, Vec::new())
            }
            (state, _event) => (state, Vec::new()),
        }
    }
}
