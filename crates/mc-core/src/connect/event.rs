//! Realtime status-change notification.
//!
//! Pushed by the backend when the processor's webhook updates the account.
//! The payload is partial: it never carries the business name or the
//! external bank account, so those are carried over from the held status.
//! The timestamp is optional and accepted as RFC 3339 text or epoch
//! milliseconds; an event without a usable one is always applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::status::{ConnectStatus, OnboardingState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdatedEvent {
    pub organization_id: String,
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
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        Some(Raw::Millis(millis)) => DateTime::from_timestamp_millis(millis),
        Some(Raw::Other(_)) | None => None,
    })
}

impl StatusUpdatedEvent {
    /// Build the next full status from this event and the currently held one.
    ///
    /// Receiving an event implies the account exists, so `has_connected_account`
    /// is forced on. Applying the same event twice yields the same status.
    pub fn merge_into(&self, current: Option<&ConnectStatus>) -> ConnectStatus {
        ConnectStatus {
            has_connected_account: true,
            onboarding_complete: self.onboarding_state.is_active(),
            onboarding_state: self.onboarding_state,
            charges_enabled: self.charges_enabled,
            payouts_enabled: self.payouts_enabled,
            details_submitted: self.details_submitted,
            requirements_currently_due: self.requirements_currently_due.clone(),
            requirements_past_due: self.requirements_past_due.clone(),
            disabled_reason: self.disabled_reason.clone(),
            business_name: current.and_then(|s| s.business_name.clone()),
            external_account_last4: current.and_then(|s| s.external_account_last4.clone()),
            external_account_bank_name: current
                .and_then(|s| s.external_account_bank_name.clone()),
        }
    }

    /// Whether this event should be dropped given the newest applied event time.
    ///
    /// Events without a timestamp are never considered stale.
    pub fn is_older_than(&self, watermark: Option<DateTime<Utc>>) -> bool {
        match (self.timestamp, watermark) {
            (Some(at), Some(applied)) => at < applied,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incomplete_acme() -> ConnectStatus {
        ConnectStatus {
            has_connected_account: true,
            onboarding_state: OnboardingState::Incomplete,
            business_name: Some("Acme".into()),
            external_account_last4: Some("4321".into()),
            external_account_bank_name: Some("First Bank".into()),
            requirements_currently_due: vec!["external_account".into()],
            ..ConnectStatus::not_connected()
        }
    }

    fn activation_event() -> StatusUpdatedEvent {
        StatusUpdatedEvent {
            organization_id: "org_1".into(),
            onboarding_state: OnboardingState::Active,
            charges_enabled: true,
            payouts_enabled: true,
            details_submitted: true,
            requirements_currently_due: Vec::new(),
            requirements_past_due: Vec::new(),
            disabled_reason: None,
            timestamp: Some("2024-05-01T12:00:00Z".parse().unwrap()),
        }
    }

    #[test]
    fn merge_preserves_fields_the_event_does_not_carry() {
        let merged = activation_event().merge_into(Some(&incomplete_acme()));

        assert_eq!(merged.onboarding_state, OnboardingState::Active);
        assert!(merged.onboarding_complete);
        assert!(merged.charges_enabled);
        assert!(merged.payouts_enabled);
        assert!(merged.details_submitted);
        assert!(merged.requirements_currently_due.is_empty());
        assert_eq!(merged.business_name.as_deref(), Some("Acme"));
        assert_eq!(merged.external_account_last4.as_deref(), Some("4321"));
        assert_eq!(merged.external_account_bank_name.as_deref(), Some("First Bank"));
    }

    #[test]
    fn merge_without_current_status_forces_connected_account() {
        let mut event = activation_event();
        event.onboarding_state = OnboardingState::Restricted;
        event.disabled_reason = Some("requirements.past_due".into());

        let merged = event.merge_into(None);

        assert!(merged.has_connected_account);
        assert!(!merged.onboarding_complete);
        assert_eq!(merged.disabled_reason.as_deref(), Some("requirements.past_due"));
        assert_eq!(merged.business_name, None);
        assert_eq!(merged.external_account_last4, None);
    }

    #[test]
    fn merge_is_idempotent() {
        let event = activation_event();
        let once = event.merge_into(Some(&incomplete_acme()));
        let twice = event.merge_into(Some(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn parses_socket_payload_with_missing_optional_lists() {
        let json = r#"{
            "organizationId": "org_9",
            "onboardingState": "pending_verification",
            "chargesEnabled": false,
            "payoutsEnabled": false,
            "detailsSubmitted": true,
            "timestamp": "2024-05-01T12:00:00.000Z"
        }"#;

        let event: StatusUpdatedEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.onboarding_state, OnboardingState::PendingVerification);
        assert!(event.requirements_currently_due.is_empty());
        assert_eq!(event.disabled_reason, None);
    }

    #[test]
    fn older_events_are_detected_against_watermark() {
        let event = activation_event();
        let later: DateTime<Utc> = "2024-05-01T12:00:01Z".parse().unwrap();

        assert!(!event.is_older_than(None));
        assert!(!event.is_older_than(event.timestamp));
        assert!(event.is_older_than(Some(later)));
    }

    #[test]
    fn untimestamped_event_is_never_stale() {
        let mut event = activation_event();
        event.timestamp = None;
        let later: DateTime<Utc> = "2024-05-01T12:00:01Z".parse().unwrap();

        assert!(!event.is_older_than(Some(later)));
    }

    #[test]
    fn timestamp_accepts_epoch_millis_and_tolerates_absence() {
        let base = r#""organizationId":"org_9","onboardingState":"active","chargesEnabled":true,"payoutsEnabled":true,"detailsSubmitted":true"#;

        let millis: StatusUpdatedEvent =
            serde_json::from_str(&format!(r#"{{{base},"timestamp":1714564800000}}"#)).unwrap();
        assert_eq!(
            millis.timestamp,
            Some("2024-05-01T12:00:00Z".parse().unwrap())
        );

        let missing: StatusUpdatedEvent =
            serde_json::from_str(&format!("{{{base}}}")).unwrap();
        assert_eq!(missing.timestamp, None);

        let garbled: StatusUpdatedEvent =
            serde_json::from_str(&format!(r#"{{{base},"timestamp":"yesterday"}}"#)).unwrap();
        assert_eq!(garbled.timestamp, None);
    }
}
