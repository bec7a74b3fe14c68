//! Connect onboarding status use cases
//!
//! The status container, the fetch/merge paths that write it, the
//! onboarding actions and the lifecycle that ties them to authentication.

pub mod continue_onboarding;
pub mod lifecycle;
pub mod provider;
pub mod refresh_status;
pub mod start_onboarding;
pub mod store;
pub mod subscriber;

pub use continue_onboarding::ContinueOnboarding;
pub use lifecycle::ConnectLifecycleCoordinator;
pub use provider::{ConnectProvider, ConnectProviderDeps};
pub use refresh_status::RefreshConnectStatus;
pub use start_onboarding::StartOnboarding;
pub use store::{ConnectState, ConnectStatusStore};
pub use subscriber::ConnectStatusSubscriber;
