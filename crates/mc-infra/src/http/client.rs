//! Backend REST client
//!
//! JSON over HTTP with the bearer token from the token store. A `401` on a
//! non-auth endpoint triggers one token refresh and one retry of the
//! original request; a failed refresh signs the session out locally.

use std::sync::Arc;
use std::time::Duration;

use mc_core::auth::{cognito_username_from_jwt, AuthTokens};
use mc_core::ports::{ApiError, TokenStorePort};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const REFRESH_PATH: &str = "/auth/refresh";
/// Endpoints whose `401` means bad credentials rather than an expired token.
const NO_REFRESH_PATHS: [&str; 3] = ["/auth/login", "/auth/logout", REFRESH_PATH];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStorePort>,
    /// Held for the whole token exchange so concurrent 401s share one refresh.
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenStorePort>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
        Ok(Self::with_client(http, base_url, tokens))
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStorePort>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            tokens,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStorePort> {
        &self.tokens
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.request(Method::GET, path, None).await?;
        decode(body)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload =
            serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let body = self.request(Method::POST, path, Some(payload)).await?;
        decode(body)
    }

    /// POST whose response body is ignored.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let payload =
            serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.request(Method::POST, path, Some(payload)).await?;
        Ok(())
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let token = self.tokens.access_token().await;
        let result = self
            .send_once(method.clone(), path, body.as_ref(), token.as_deref())
            .await;

        match result {
            Err(err) if err.is_unauthorized() && !NO_REFRESH_PATHS.contains(&path) => {
                debug!(path, "access token rejected, attempting refresh");
                match self.refresh_after_rejection(token.as_deref()).await {
                    Some(fresh) => {
                        self.send_once(method, path, body.as_ref(), Some(&fresh))
                            .await
                    }
                    None => Err(err),
                }
            }
            other => other,
        }
    }

    /// A usable access token after `rejected` was refused.
    ///
    /// When another request already replaced the rejected token, the stored
    /// one is returned without a second exchange.
    async fn refresh_after_rejection(&self, rejected: Option<&str>) -> Option<String> {
        let _refresh_guard = self.refresh_lock.lock().await;

        if let Some(current) = self.tokens.access_token().await {
            if Some(current.as_str()) != rejected {
                debug!("access token already refreshed by a concurrent request");
                return Some(current);
            }
        }
        self.exchange_refresh_token()
            .await
            .map(|tokens| tokens.access_token)
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(error_from_body(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Exchange the refresh token for new tokens. Clears the stored session
    /// when the backend rejects the exchange.
    pub async fn refresh_tokens(&self) -> Option<AuthTokens> {
        let _refresh_guard = self.refresh_lock.lock().await;
        self.exchange_refresh_token().await
    }

    /// Caller holds `refresh_lock`.
    async fn exchange_refresh_token(&self) -> Option<AuthTokens> {
        let refresh_token = self.tokens.refresh_token().await?;
        let access_token = self.tokens.access_token().await;

        let username = match self.tokens.user().await.and_then(|u| u.cognito_username) {
            Some(username) => Some(username),
            None => access_token.as_deref().and_then(cognito_username_from_jwt),
        };

        let request = RefreshRequest {
            refresh_token,
            username,
        };
        let payload = match serde_json::to_value(&request) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to encode refresh request");
                return None;
            }
        };

        let refreshed = self
            .send_once(
                Method::POST,
                REFRESH_PATH,
                Some(&payload),
                access_token.as_deref(),
            )
            .await
            .and_then(decode::<AuthTokens>);

        match refreshed {
            Ok(tokens) => {
                if let Err(err) = self.tokens.save_tokens(&tokens).await {
                    warn!(error = %err, "failed to persist refreshed tokens");
                }
                info!("access token refreshed");
                Some(tokens)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                if let Err(err) = self.tokens.clear().await {
                    warn!(error = %err, "failed to clear stored session");
                }
                None
            }
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn error_from_body(status: StatusCode, text: &str) -> ApiError {
    let message = match serde_json::from_str::<Value>(text) {
        Ok(body) => ["error", "message"]
            .into_iter()
            .find_map(|field| body.get(field).and_then(Value::as_str))
            .filter(|m| !m.is_empty())
            .unwrap_or("Request failed")
            .to_string(),
        Err(_) => format!("Request failed with status {}", status.as_u16()),
    };
    ApiError::Http {
        status: status.as_u16(),
        message,
    }
}
