//! Dependency wiring
//!
//! Builds every adapter from the resolved configuration and hands them to
//! the application layer. The only place that knows concrete types.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mc_app::{AuthSession, ConnectProvider, ConnectProviderDeps};
use mc_core::config::{AppConfig, DEFAULT_TIMEOUT_SECS};
use mc_core::ports::{AppDirsPort, KeyValueStorePort, RealtimeChannelPort, TokenStorePort};
use mc_core::realtime::ReconnectPolicy;
use mc_infra::{
    ApiClient, FileKeyValueStore, HttpAuthApi, HttpConnectApi, KeyValueStatusCache,
    KeyValueTokenStore,
};
use mc_platform::{DirsAppDirsAdapter, WebSocketRealtimeChannel};
use tracing::debug;

use super::config::load_config;

/// Everything a command needs, fully assembled.
pub struct Console {
    pub config: AppConfig,
    pub tokens: Arc<dyn TokenStorePort>,
    pub connect_api: Arc<HttpConnectApi>,
    pub auth: Arc<AuthSession>,
    pub connect: Arc<ConnectProvider>,
    pub realtime: Option<Arc<WebSocketRealtimeChannel>>,
}

/// Config from `path` when given, otherwise local defaults under the
/// platform data directory. An empty `data_dir` in the file also falls back
/// to the platform directory.
pub fn resolve_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let platform_data_dir = || -> anyhow::Result<PathBuf> {
        Ok(DirsAppDirsAdapter::new().get_app_dirs()?.app_data_root)
    };

    match path {
        Some(path) => {
            let mut config = load_config(path)?;
            if config.data_dir.as_os_str().is_empty() {
                config.data_dir = platform_data_dir()?;
            }
            Ok(config)
        }
        None => Ok(AppConfig::with_system_defaults(platform_data_dir()?)),
    }
}

pub fn wire_console(config: AppConfig) -> anyhow::Result<Console> {
    let store: Arc<dyn KeyValueStorePort> =
        Arc::new(FileKeyValueStore::with_defaults(config.data_dir.clone()));
    let tokens: Arc<dyn TokenStorePort> = Arc::new(KeyValueTokenStore::new(store.clone()));

    let timeout_secs = match config.api_timeout_secs {
        0 => DEFAULT_TIMEOUT_SECS,
        secs => secs,
    };
    let client = Arc::new(ApiClient::new(
        config.api_base_url.clone(),
        Duration::from_secs(timeout_secs),
        tokens.clone(),
    )?);

    let connect_api = Arc::new(HttpConnectApi::new(client.clone()));
    let auth = Arc::new(AuthSession::new(
        Arc::new(HttpAuthApi::new(client)),
        tokens.clone(),
    ));

    let realtime = config.realtime_endpoint().map(|endpoint| {
        let policy = reconnect_policy(&config);
        debug!(%endpoint, ?policy, "realtime channel configured");
        Arc::new(WebSocketRealtimeChannel::new(endpoint, policy))
    });

    let connect = Arc::new(ConnectProvider::from_deps(ConnectProviderDeps {
        api: connect_api.clone(),
        cache: Arc::new(KeyValueStatusCache::new(store)),
        channel: realtime
            .clone()
            .map(|channel| channel as Arc<dyn RealtimeChannelPort>),
    }));

    Ok(Console {
        config,
        tokens,
        connect_api,
        auth,
        connect,
        realtime,
    })
}

/// Zero means "not configured" for both knobs.
fn reconnect_policy(config: &AppConfig) -> ReconnectPolicy {
    let defaults = ReconnectPolicy::default();
    ReconnectPolicy {
        max_attempts: match config.reconnect_attempts {
            0 => defaults.max_attempts,
            attempts => attempts,
        },
        delay: match config.reconnect_delay_ms {
            0 => defaults.delay,
            ms => Duration::from_millis(ms),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn config_in(dir: &TempDir) -> AppConfig {
        AppConfig {
            realtime_url: String::new(),
            ..AppConfig::with_system_defaults(dir.path().to_path_buf())
        }
    }

    #[test]
    fn wiring_without_realtime_url_has_no_channel() {
        let dir = TempDir::new().unwrap();

        let console = wire_console(config_in(&dir)).unwrap();

        assert!(console.realtime.is_none());
        assert_eq!(console.config.data_dir, dir.path());
    }

    #[test]
    fn wiring_with_realtime_url_builds_channel_endpoint() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            realtime_url: "ws://127.0.0.1:9000/".into(),
            realtime_path: "/socket.io".into(),
            ..config_in(&dir)
        };

        let console = wire_console(config).unwrap();

        let channel = console.realtime.expect("channel configured");
        assert_eq!(channel.endpoint(), "ws://127.0.0.1:9000/socket.io");
    }

    #[test]
    fn config_without_reconnect_keys_keeps_default_policy() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[realtime]\nurl = \"ws://127.0.0.1:9000\"\n")
            .unwrap();

        let config = load_config(file.path().to_path_buf()).unwrap();

        assert_eq!(config.reconnect_attempts, 0);
        assert_eq!(reconnect_policy(&config), ReconnectPolicy::default());
    }

    #[test]
    fn configured_reconnect_values_override_defaults() {
        let config = AppConfig {
            reconnect_attempts: 2,
            reconnect_delay_ms: 250,
            ..AppConfig::empty()
        };

        let policy = reconnect_policy(&config);

        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }
}
