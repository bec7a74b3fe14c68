//! End-to-end flow through the wired console against a mock backend.

use std::time::Duration;

use merchant_console_lib::bootstrap::{run_command, wire_console, Console};
use merchant_console_lib::cli::Command;
use mc_app::ConnectState;
use mc_core::auth::LoginCredentials;
use mc_core::config::AppConfig;
use mc_core::connect::OnboardingState;
use mc_core::lifecycle::LifecycleState;
use mc_core::ports::TokenStorePort;
use mockito::{Matcher, Server};
use tempfile::TempDir;

const USER_JSON: &str =
    r#"{"id":"user_1","email":"owner@example.com","organizationId":"org_1","role":"owner"}"#;

const STATUS_JSON: &str = r#"{
    "hasConnectedAccount": true,
    "onboardingComplete": false,
    "onboardingState": "incomplete",
    "chargesEnabled": false,
    "payoutsEnabled": false,
    "detailsSubmitted": true,
    "requirementsCurrentlyDue": ["external_account"],
    "requirementsPastDue": [],
    "businessName": "Acme"
}"#;

fn console_for(server: &Server, dir: &TempDir) -> Console {
    let config = AppConfig {
        api_base_url: server.url(),
        realtime_url: String::new(),
        ..AppConfig::with_system_defaults(dir.path().to_path_buf())
    };
    wire_console(config).unwrap()
}

async fn settled(console: &Console) -> ConnectState {
    let mut states = console.connect.subscribe();
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        states.wait_for(|s| {
            !s.is_loading()
                && matches!(s.lifecycle, LifecycleState::Ready | LifecycleState::SignedOut)
        }),
    )
    .await
    .expect("connect state did not settle")
    .unwrap()
    .clone();
    state
}

fn stored_entries(dir: &TempDir) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.path().join("storage.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn login_persists_session_and_next_run_loads_status() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(format!(
            r#"{{"user":{USER_JSON},"tokens":{{"accessToken":"access-1","refreshToken":"refresh-1","expiresIn":3600}}}}"#
        ))
        .create_async()
        .await;
    let _me = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer access-1")
        .with_status(200)
        .with_body(USER_JSON)
        .create_async()
        .await;
    let status = server
        .mock("GET", "/stripe/connect/status")
        .match_header("authorization", "Bearer access-1")
        .with_status(200)
        .with_body(STATUS_JSON)
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();

    let first = console_for(&server, &dir);
    let user = first
        .auth
        .login(LoginCredentials {
            email: "owner@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(user.organization_id, "org_1");

    // A second console over the same data dir behaves like a fresh process.
    let second = console_for(&server, &dir);
    assert!(second.auth.restore().await.authenticated);
    second.connect.spawn(second.auth.watch()).await;

    let state = settled(&second).await;
    second.connect.shutdown().await;

    assert_eq!(state.lifecycle, LifecycleState::Ready);
    assert_eq!(state.onboarding_state(), OnboardingState::Incomplete);
    assert!(!state.is_onboarded());
    assert!(state.show_banner());
    assert_eq!(state.error, None);
    status.assert_async().await;

    let entries = stored_entries(&dir);
    assert!(entries.get("accessToken").is_some());
    assert!(entries.get("stripeConnectStatus").is_some());
}

#[tokio::test]
async fn status_command_requires_a_session() {
    let server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let console = console_for(&server, &dir);

    let err = run_command(&console, Command::Status { json: true })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Not signed in"));
    assert_eq!(console.connect.snapshot().lifecycle, LifecycleState::SignedOut);
}

#[tokio::test]
async fn expired_token_is_refreshed_before_status_fetch() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(format!(
            r#"{{"user":{USER_JSON},"tokens":{{"accessToken":"stale","refreshToken":"refresh-1","expiresIn":3600}}}}"#
        ))
        .create_async()
        .await;
    let _me_stale = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer stale")
        .with_status(401)
        .with_body(r#"{"error":"Token expired"}"#)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .match_body(Matcher::PartialJson(serde_json::json!({"refreshToken": "refresh-1"})))
        .with_status(200)
        .with_body(r#"{"accessToken":"fresh","refreshToken":"refresh-2","expiresIn":3600}"#)
        .create_async()
        .await;
    let _me_fresh = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer fresh")
        .with_status(200)
        .with_body(USER_JSON)
        .create_async()
        .await;
    let _status = server
        .mock("GET", "/stripe/connect/status")
        .match_header("authorization", "Bearer fresh")
        .with_status(200)
        .with_body(STATUS_JSON)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let console = console_for(&server, &dir);

    console
        .auth
        .login(LoginCredentials {
            email: "owner@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert!(console.auth.restore().await.authenticated);
    console.connect.spawn(console.auth.watch()).await;

    let state = settled(&console).await;
    console.connect.shutdown().await;

    refresh.assert_async().await;
    assert_eq!(state.onboarding_state(), OnboardingState::Incomplete);
    assert_eq!(console.tokens.access_token().await.as_deref(), Some("fresh"));
}
