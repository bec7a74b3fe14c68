//! Connect account status models
//!
//! Snapshot of the merchant's payment-processor sub-account as reported by
//! the backend. Field names follow the backend's camelCase JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of the connected account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingState {
    #[default]
    NotStarted,
    Incomplete,
    PendingVerification,
    Active,
    Restricted,
    Disabled,
}

impl OnboardingState {
    pub const ALL: [OnboardingState; 6] = [
        OnboardingState::NotStarted,
        OnboardingState::Incomplete,
        OnboardingState::PendingVerification,
        OnboardingState::Active,
        OnboardingState::Restricted,
        OnboardingState::Disabled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingState::NotStarted => "not_started",
            OnboardingState::Incomplete => "incomplete",
            OnboardingState::PendingVerification => "pending_verification",
            OnboardingState::Active => "active",
            OnboardingState::Restricted => "restricted",
            OnboardingState::Disabled => "disabled",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, OnboardingState::Active)
    }
}

impl fmt::Display for OnboardingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown onboarding state: {0}")]
pub struct UnknownOnboardingState(pub String);

impl FromStr for OnboardingState {
    type Err = UnknownOnboardingState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OnboardingState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownOnboardingState(s.to_string()))
    }
}

/// Authoritative snapshot of the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectStatus {
    pub has_connected_account: bool,
    pub onboarding_complete: bool,
    pub onboarding_state: OnboardingState,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
    #[serde(default)]
    pub requirements_currently_due: Vec<String>,
    #[serde(default)]
    pub requirements_past_due: Vec<String>,
    #[serde(default)]
    pub disabled_reason: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub external_account_last4: Option<String>,
    #[serde(default)]
    pub external_account_bank_name: Option<String>,
}

impl ConnectStatus {
    /// Conservative status used when the backend cannot be reached:
    /// no account, every capability off.
    pub fn not_connected() -> Self {
        Self {
            has_connected_account: false,
            onboarding_complete: false,
            onboarding_state: OnboardingState::NotStarted,
            charges_enabled: false,
            payouts_enabled: false,
            details_submitted: false,
            requirements_currently_due: Vec::new(),
            requirements_past_due: Vec::new(),
            disabled_reason: None,
            business_name: None,
            external_account_last4: None,
            external_account_bank_name: None,
        }
    }

    pub fn is_onboarded(&self) -> bool {
        self.onboarding_state.is_active()
    }
}

impl Default for ConnectStatus {
    fn default() -> Self {
        Self::not_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_state_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&OnboardingState::PendingVerification).unwrap();
        assert_eq!(json, "\"pending_verification\"");

        let parsed: OnboardingState = serde_json::from_str("\"not_started\"").unwrap();
        assert_eq!(parsed, OnboardingState::NotStarted);
    }

    #[test]
    fn onboarding_state_from_str_matches_as_str() {
        for state in OnboardingState::ALL {
            assert_eq!(state.as_str().parse::<OnboardingState>().unwrap(), state);
        }
        assert!("pending".parse::<OnboardingState>().is_err());
    }

    #[test]
    fn connect_status_parses_backend_payload() {
        let json = r#"{
            "hasConnectedAccount": true,
            "onboardingComplete": false,
            "onboardingState": "incomplete",
            "chargesEnabled": false,
            "payoutsEnabled": false,
            "detailsSubmitted": true,
            "requirementsCurrentlyDue": ["individual.id_number"],
            "requirementsPastDue": [],
            "disabledReason": null,
            "businessName": "Acme",
            "externalAccountLast4": "4321",
            "externalAccountBankName": null
        }"#;

        let status: ConnectStatus = serde_json::from_str(json).unwrap();

        assert!(status.has_connected_account);
        assert_eq!(status.onboarding_state, OnboardingState::Incomplete);
        assert_eq!(status.requirements_currently_due, vec!["individual.id_number"]);
        assert_eq!(status.business_name.as_deref(), Some("Acme"));
        assert_eq!(status.external_account_last4.as_deref(), Some("4321"));
        assert!(!status.is_onboarded());
    }

    #[test]
    fn not_connected_turns_every_capability_off() {
        let status = ConnectStatus::not_connected();
        assert!(!status.has_connected_account);
        assert!(!status.charges_enabled);
        assert!(!status.payouts_enabled);
        assert!(!status.details_submitted);
        assert_eq!(status.onboarding_state, OnboardingState::NotStarted);
        assert_eq!(status, ConnectStatus::default());
    }
}
