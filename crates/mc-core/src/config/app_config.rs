use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3334";
pub const DEFAULT_REALTIME_PATH: &str = "/socket.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend REST base URL, without trailing slash
    pub api_base_url: String,

    /// Per-request timeout in seconds (0 means the client default)
    pub api_timeout_secs: u64,

    /// Realtime endpoint base URL (ws:// or wss://); may be empty
    pub realtime_url: String,

    /// Path appended to `realtime_url`
    pub realtime_path: String,

    pub reconnect_attempts: u32,

    pub reconnect_delay_ms: u64,

    /// Local data directory (key-value store, logs); path info only
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// Must not contain any validation. Missing keys map to empty values.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let str_at = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        // Negative or out-of-range integers count as missing.
        let int_at = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
                .unwrap_or(0)
        };
        let u64_at = |section: &str, key: &str| u64::try_from(int_at(section, key)).unwrap_or(0);
        let u32_at = |section: &str, key: &str| u32::try_from(int_at(section, key)).unwrap_or(0);

        Ok(Self {
            api_base_url: str_at("api", "base_url"),
            api_timeout_secs: u64_at("api", "timeout_secs"),
            realtime_url: str_at("realtime", "url"),
            realtime_path: str_at("realtime", "path"),
            reconnect_attempts: u32_at("realtime", "reconnect_attempts"),
            reconnect_delay_ms: u64_at("realtime", "reconnect_delay_ms"),
            data_dir: PathBuf::from(str_at("storage", "data_dir")),
        })
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self {
            api_base_url: String::new(),
            api_timeout_secs: 0,
            realtime_url: String::new(),
            realtime_path: String::new(),
            reconnect_attempts: 0,
            reconnect_delay_ms: 0,
            data_dir: PathBuf::new(),
        }
    }

    /// Create AppConfig with local-development endpoints rooted at `data_dir`.
    ///
    /// `data_dir` is computed by the caller (e.g. with the `dirs` crate).
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_timeout_secs: DEFAULT_TIMEOUT_SECS,
            realtime_url: DEFAULT_API_BASE_URL.replacen("http", "ws", 1),
            realtime_path: DEFAULT_REALTIME_PATH.to_string(),
            reconnect_attempts: 5,
            reconnect_delay_ms: 1000,
            data_dir,
        }
    }

    /// Full realtime endpoint, or `None` when no realtime URL is configured.
    pub fn realtime_endpoint(&self) -> Option<String> {
        if self.realtime_url.is_empty() {
            return None;
        }
        Some(format!(
            "{}{}",
            self.realtime_url.trim_end_matches('/'),
            self.realtime_path
        ))
    }
}
