//! Authentication session.
//!
//! Owns the signed-in user and publishes [`AuthSnapshot`]s that the Connect
//! lifecycle and the realtime connector follow.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{debug, info, info_span, warn, Instrument};

use mc_core::auth::{cognito_username_from_jwt, AuthSnapshot, LoginCredentials, User};
use mc_core::ports::{ApiError, AuthApiPort, TokenStorePort};

pub struct AuthSession {
    api: Arc<dyn AuthApiPort>,
    tokens: Arc<dyn TokenStorePort>,
    user: RwLock<Option<User>>,
    snapshot: watch::Sender<AuthSnapshot>,
}

impl AuthSession {
    pub fn new(api: Arc<dyn AuthApiPort>, tokens: Arc<dyn TokenStorePort>) -> Self {
        let (snapshot, _) = watch::channel(AuthSnapshot::resolving());
        Self {
            api,
            tokens,
            user: RwLock::new(None),
            snapshot,
        }
    }

    pub fn watch(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        *self.snapshot.borrow()
    }

    pub async fn user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    /// Resolve the persisted session.
    ///
    /// A saved user with a saved access token counts as signed in. The user
    /// profile is refreshed from the backend when possible; failures there
    /// keep the saved copy.
    pub async fn restore(&self) -> AuthSnapshot {
        let span = info_span!("usecase.auth.restore");
        async {
            let mut user = self.tokens.user().await;

            if user.is_some() && self.tokens.access_token().await.is_some() {
                match self.api.me().await {
                    Ok(fresh) => {
                        if let Err(err) = self.tokens.save_user(&fresh).await {
                            warn!(error = %err, "failed to persist refreshed user");
                        }
                        user = Some(fresh);
                    }
                    Err(err) => debug!(error = %err, "user refresh failed, keeping saved user"),
                }
            }

            // A failed refresh inside the client may have dropped the tokens.
            let has_token = self.tokens.access_token().await.is_some();
            let authenticated = user.is_some() && has_token;
            *self.user.write().await = if authenticated { user } else { None };

            let snapshot = if authenticated {
                AuthSnapshot::signed_in()
            } else {
                AuthSnapshot::signed_out()
            };
            info!(authenticated, "auth session restored");
            self.publish(snapshot);
            snapshot
        }
        .instrument(span)
        .await
    }

    pub async fn login(&self, credentials: LoginCredentials) -> Result<User, ApiError> {
        let span = info_span!("usecase.auth.login", email = %credentials.email);
        async {
            let previous = self.snapshot();
            self.publish(AuthSnapshot {
                loading: true,
                authenticated: previous.authenticated,
            });

            let response = match self.api.login(credentials).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(error = %err, "login failed");
                    self.publish(AuthSnapshot {
                        loading: false,
                        authenticated: previous.authenticated,
                    });
                    return Err(err);
                }
            };

            let mut user = response.user;
            if let Some(username) = cognito_username_from_jwt(&response.tokens.access_token) {
                user.cognito_username = Some(username);
            }

            if let Err(err) = self.tokens.save_tokens(&response.tokens).await {
                warn!(error = %err, "failed to persist tokens");
            }
            if let Err(err) = self.tokens.save_user(&user).await {
                warn!(error = %err, "failed to persist user");
            }
            *self.user.write().await = Some(user.clone());

            info!(user_id = %user.id, organization_id = %user.organization_id, "signed in");
            self.publish(AuthSnapshot::signed_in());
            Ok(user)
        }
        .instrument(span)
        .await
    }

    /// Sign out locally, then invalidate the refresh token server-side.
    ///
    /// The server call is best-effort and never fails the logout.
    pub async fn logout(&self) {
        let span = info_span!("usecase.auth.logout");
        async {
            let refresh_token = self.tokens.refresh_token().await;
            if let Err(err) = self.tokens.clear().await {
                warn!(error = %err, "failed to clear stored session");
            }
            *self.user.write().await = None;
            self.publish(AuthSnapshot::signed_out());
            info!("signed out");

            if let Some(refresh_token) = refresh_token {
                if let Err(err) = self.api.logout(refresh_token).await {
                    debug!(error = %err, "server-side logout failed");
                }
            }
        }
        .instrument(span)
        .await
    }

    fn publish(&self, snapshot: AuthSnapshot) {
        self.snapshot.send_if_modified(|current| {
            let changed = *current != snapshot;
            *current = snapshot;
            changed
        });
    }
}
