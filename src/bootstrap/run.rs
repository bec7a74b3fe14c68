//! Command execution.

use anyhow::{anyhow, bail};
use mc_app::ConnectState;
use mc_core::auth::LoginCredentials;
use mc_core::connect::{CreateAccountParams, OnboardingPrompt};
use mc_core::lifecycle::LifecycleState;
use mc_core::ports::ConnectApiPort;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info_span, warn, Instrument};

use super::realtime::RealtimeConnector;
use super::wiring::Console;
use crate::cli::{Command, ConnectCommand};

const NOT_SIGNED_IN: &str = "Not signed in. Run `merchant-console login` first.";

/// Background tasks of a running session: the Connect lifecycle and, when
/// configured, the realtime connector.
struct SessionHandle {
    cancel: CancellationToken,
    connector: Option<JoinHandle<()>>,
}

impl SessionHandle {
    async fn stop(self, console: &Console) {
        self.cancel.cancel();
        if let Some(task) = self.connector {
            if let Err(err) = task.await {
                warn!(error = %err, "realtime connector task ended abnormally");
            }
        }
        console.connect.shutdown().await;
    }
}

pub async fn run_command(console: &Console, command: Command) -> anyhow::Result<()> {
    let span = info_span!("cli.command", command = command.name());
    async {
        match command {
            Command::Login { email, password } => login(console, email, password).await,
            Command::Logout => logout(console).await,
            Command::Status { json } => status(console, json).await,
            Command::Watch => watch(console).await,
            Command::Connect { action } => connect(console, action).await,
        }
    }
    .instrument(span)
    .await
}

async fn login(console: &Console, email: String, password: String) -> anyhow::Result<()> {
    let user = console
        .auth
        .login(LoginCredentials { email, password })
        .await
        .map_err(|err| anyhow!(err.user_message("Login failed")))?;
    println!("Signed in as {} (organization {})", user.email, user.organization_id);
    Ok(())
}

async fn logout(console: &Console) -> anyhow::Result<()> {
    if !console.auth.restore().await.authenticated {
        println!("Already signed out");
        return Ok(());
    }
    console.auth.logout().await;
    println!("Signed out");
    Ok(())
}

async fn status(console: &Console, json: bool) -> anyhow::Result<()> {
    let (session, state) = start_session(console, false).await?;
    session.stop(console).await;

    if state.lifecycle != LifecycleState::Ready {
        bail!(NOT_SIGNED_IN);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_state(&state);
    }
    Ok(())
}

async fn watch(console: &Console) -> anyhow::Result<()> {
    let (session, state) = start_session(console, true).await?;
    if state.lifecycle != LifecycleState::Ready {
        session.stop(console).await;
        bail!(NOT_SIGNED_IN);
    }

    print_state(&state);
    println!("-- watching for changes, Ctrl+C to stop");

    let mut states = console.connect.subscribe();
    let _ = states.borrow_and_update();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                println!();
                print_state(&state);
            }
        }
    }

    session.stop(console).await;
    Ok(())
}

async fn connect(console: &Console, action: ConnectCommand) -> anyhow::Result<()> {
    let (session, state) = start_session(console, false).await?;
    let result = async {
        if state.lifecycle != LifecycleState::Ready {
            bail!(NOT_SIGNED_IN);
        }
        match action {
            ConnectCommand::Start {
                country,
                business_type,
            } => {
                let params = CreateAccountParams {
                    country,
                    business_type,
                };
                match console.connect.start_onboarding(params).await {
                    Some(url) => print_link(&url),
                    None => bail!(last_error(console, "Failed to start onboarding")),
                }
            }
            ConnectCommand::Continue => match console.connect.continue_onboarding().await {
                Some(url) => print_link(&url),
                None => bail!(last_error(console, "Failed to get onboarding link")),
            },
            ConnectCommand::Sync => {
                let synced = console
                    .connect_api
                    .refresh_status()
                    .await
                    .map_err(|err| anyhow!(err.user_message("Failed to refresh status")))?;
                println!(
                    "Processor reports: {} (charges {}, payouts {})",
                    synced.onboarding_state,
                    on_off(synced.charges_enabled),
                    on_off(synced.payouts_enabled)
                );
                console.connect.refresh_status().await;
                print_state(&console.connect.snapshot());
            }
        }
        Ok(())
    }
    .await;

    session.stop(console).await;
    result
}

/// Restore the auth session, start the Connect lifecycle and wait until the
/// initial status has settled.
async fn start_session(
    console: &Console,
    with_realtime: bool,
) -> anyhow::Result<(SessionHandle, ConnectState)> {
    console.auth.restore().await;
    console.connect.spawn(console.auth.watch()).await;

    let cancel = CancellationToken::new();
    let connector = match (&console.realtime, with_realtime) {
        (Some(channel), true) => {
            let connector = RealtimeConnector::new(channel.clone(), console.tokens.clone());
            let auth = console.auth.watch();
            let cancel = cancel.clone();
            Some(tokio::spawn(async move { connector.run(auth, cancel).await }))
        }
        _ => None,
    };

    let mut states = console.connect.subscribe();
    let settled = states
        .wait_for(|s| {
            !s.is_loading()
                && matches!(s.lifecycle, LifecycleState::Ready | LifecycleState::SignedOut)
        })
        .await
        .map_err(|_| anyhow!("Connect state closed before it settled"))?
        .clone();

    Ok((SessionHandle { cancel, connector }, settled))
}

fn last_error(console: &Console, fallback: &str) -> String {
    console
        .connect
        .snapshot()
        .error
        .unwrap_or_else(|| fallback.to_string())
}

fn print_link(url: &str) {
    println!("Open this link to continue onboarding:");
    println!("{url}");
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

fn print_state(state: &ConnectState) {
    let status = state.status.clone().unwrap_or_default();
    println!("Onboarding state: {}", state.onboarding_state());
    println!("Onboarded:        {}", if state.is_onboarded() { "yes" } else { "no" });
    println!(
        "Charges / payouts: {} / {}",
        on_off(status.charges_enabled),
        on_off(status.payouts_enabled)
    );
    if let Some(name) = &status.business_name {
        println!("Business:         {name}");
    }
    if let Some(last4) = &status.external_account_last4 {
        let bank = status.external_account_bank_name.as_deref().unwrap_or("bank account");
        println!("Payout account:   {bank} ending {last4}");
    }

    match state.prompt() {
        OnboardingPrompt::Start => {
            println!("Next step: run `merchant-console connect start` to set up payments")
        }
        OnboardingPrompt::Continue {
            requirements_due,
            pending_verification,
        } => {
            if pending_verification {
                println!("Next step: verification in progress, nothing to do yet");
            } else {
                println!(
                    "Next step: run `merchant-console connect continue` ({requirements_due} requirement(s) due)"
                );
            }
        }
        OnboardingPrompt::Resolve {
            disabled,
            reason,
            past_due,
        } => {
            let label = if disabled { "Account disabled" } else { "Action required" };
            println!("{label}: {}", reason.as_deref().unwrap_or("see requirements below"));
            for requirement in past_due {
                println!("  - {requirement}");
            }
        }
        OnboardingPrompt::None => {}
    }

    if let Some(error) = &state.error {
        println!("Last error: {error}");
    }
}
