//! Derived onboarding state read by every gated screen.
//!
//! Everything here is recomputed from the raw status on each read.

use serde::Serialize;

use super::status::{ConnectStatus, OnboardingState};

/// Most past-due requirements surfaced to the merchant at once.
pub const MAX_LISTED_PAST_DUE: usize = 5;

const DISABLED_FALLBACK_REASON: &str =
    "Your account has been disabled. Please contact support.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectProjection {
    pub is_onboarded: bool,
    pub onboarding_state: OnboardingState,
}

impl ConnectProjection {
    pub fn from_status(status: Option<&ConnectStatus>) -> Self {
        let onboarding_state = status
            .map(|s| s.onboarding_state)
            .unwrap_or_default();
        Self {
            is_onboarded: onboarding_state == OnboardingState::Active,
            onboarding_state,
        }
    }

    /// Whether the "finish setting up payments" banner should be shown.
    pub fn show_banner(&self, is_loading: bool) -> bool {
        !is_loading && !self.is_onboarded
    }
}

/// Which onboarding call-to-action the merchant should see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OnboardingPrompt {
    /// No connected account yet: offer to create one.
    Start,
    /// Account exists but onboarding is unfinished.
    Continue {
        requirements_due: usize,
        pending_verification: bool,
    },
    /// The processor restricted or disabled the account.
    Resolve {
        disabled: bool,
        reason: Option<String>,
        past_due: Vec<String>,
    },
    /// Fully onboarded.
    None,
}

impl OnboardingPrompt {
    pub fn for_status(status: Option<&ConnectStatus>) -> Self {
        let state = ConnectProjection::from_status(status).onboarding_state;
        match state {
            OnboardingState::NotStarted => OnboardingPrompt::Start,
            OnboardingState::Incomplete | OnboardingState::PendingVerification => {
                OnboardingPrompt::Continue {
                    requirements_due: status
                        .map(|s| s.requirements_currently_due.len())
                        .unwrap_or(0),
                    pending_verification: state == OnboardingState::PendingVerification,
                }
            }
            OnboardingState::Restricted | OnboardingState::Disabled => {
                let disabled = state == OnboardingState::Disabled;
                let reason = status.and_then(|s| s.disabled_reason.clone());
                OnboardingPrompt::Resolve {
                    disabled,
                    reason: if disabled {
                        reason.or_else(|| Some(DISABLED_FALLBACK_REASON.to_string()))
                    } else {
                        reason
                    },
                    past_due: status
                        .map(|s| {
                            s.requirements_past_due
                                .iter()
                                .take(MAX_LISTED_PAST_DUE)
                                .cloned()
                                .collect()
                        })
                        .unwrap_or_default(),
                }
            }
            OnboardingState::Active => OnboardingPrompt::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_in(state: OnboardingState) -> ConnectStatus {
        ConnectStatus {
            has_connected_account: state != OnboardingState::NotStarted,
            onboarding_state: state,
            ..ConnectStatus::not_connected()
        }
    }

    #[test]
    fn missing_status_projects_not_started() {
        let projection = ConnectProjection::from_status(None);
        assert!(!projection.is_onboarded);
        assert_eq!(projection.onboarding_state, OnboardingState::NotStarted);
    }

    #[test]
    fn onboarded_exactly_when_active() {
        for state in OnboardingState::ALL {
            let status = status_in(state);
            let projection = ConnectProjection::from_status(Some(&status));
            assert_eq!(projection.onboarding_state, state);
            assert_eq!(
                projection.is_onboarded,
                state == OnboardingState::Active,
                "state {state}"
            );
        }
    }

    #[test]
    fn banner_hidden_while_loading_or_onboarded() {
        let active = ConnectProjection::from_status(Some(&status_in(OnboardingState::Active)));
        let incomplete =
            ConnectProjection::from_status(Some(&status_in(OnboardingState::Incomplete)));

        assert!(!active.show_banner(false));
        assert!(!incomplete.show_banner(true));
        assert!(incomplete.show_banner(false));
    }

    #[test]
    fn prompt_follows_onboarding_state() {
        assert_eq!(OnboardingPrompt::for_status(None), OnboardingPrompt::Start);
        assert_eq!(
            OnboardingPrompt::for_status(Some(&status_in(OnboardingState::Active))),
            OnboardingPrompt::None
        );

        let mut pending = status_in(OnboardingState::PendingVerification);
        pending.requirements_currently_due = vec!["a".into(), "b".into()];
        assert_eq!(
            OnboardingPrompt::for_status(Some(&pending)),
            OnboardingPrompt::Continue {
                requirements_due: 2,
                pending_verification: true,
            }
        );
    }

    #[test]
    fn resolve_prompt_caps_past_due_and_fills_disabled_reason() {
        let mut disabled = status_in(OnboardingState::Disabled);
        disabled.requirements_past_due = (0..8).map(|i| format!("req_{i}")).collect();

        match OnboardingPrompt::for_status(Some(&disabled)) {
            OnboardingPrompt::Resolve {
                disabled,
                reason,
                past_due,
            } => {
                assert!(disabled);
                assert_eq!(reason.as_deref(), Some(DISABLED_FALLBACK_REASON));
                assert_eq!(past_due.len(), MAX_LISTED_PAST_DUE);
                assert_eq!(past_due[0], "req_0");
            }
            other => panic!("unexpected prompt: {other:?}"),
        }

        let restricted = status_in(OnboardingState::Restricted);
        assert_eq!(
            OnboardingPrompt::for_status(Some(&restricted)),
            OnboardingPrompt::Resolve {
                disabled: false,
                reason: None,
                past_due: Vec::new(),
            }
        );
    }
}
