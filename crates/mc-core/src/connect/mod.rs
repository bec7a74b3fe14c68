//! Connect (payment-processor sub-account) domain models.

pub mod api;
pub mod event;
pub mod projection;
pub mod status;

pub use api::{
    BusinessType, CreateAccountParams, CreateAccountResponse, OnboardingLinkResponse,
    RefreshStatusResponse,
};
pub use event::StatusUpdatedEvent;
pub use projection::{ConnectProjection, OnboardingPrompt};
pub use status::{ConnectStatus, OnboardingState};
