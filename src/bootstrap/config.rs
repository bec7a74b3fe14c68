//! # Configuration Loader
//!
//! Reads a TOML file into the `AppConfig` DTO and reports I/O and parse
//! errors with context. Performs no validation and fills no defaults:
//! whatever is in the file is taken as-is.

use anyhow::Context;
use mc_core::config::AppConfig;
use std::path::PathBuf;

/// Load configuration from a TOML file.
///
/// Empty strings and zero values are accepted; missing sections map to
/// empty values.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_load_config_reads_valid_toml() {
        let temp_file = write_config(
            r#"
            [api]
            base_url = "https://api.example.com"
            timeout_secs = 15

            [realtime]
            url = "wss://api.example.com"
            path = "/ws"
            reconnect_attempts = 3
            reconnect_delay_ms = 250

            [storage]
            data_dir = "/var/lib/merchant-console"
        "#,
        );

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.api_timeout_secs, 15);
        assert_eq!(config.realtime_endpoint().as_deref(), Some("wss://api.example.com/ws"));
        assert_eq!(config.reconnect_attempts, 3);
        assert_eq!(config.reconnect_delay_ms, 250);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/merchant-console"));
    }

    #[test]
    fn test_load_config_returns_empty_values_when_missing() {
        let temp_file = write_config(
            r#"
            [api]
            # base_url is missing

            [realtime]
        "#,
        );

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_load_config_rejects_invalid_toml() {
        let temp_file = write_config("[api\nbase_url = ");

        let err = load_config(temp_file.path().to_path_buf()).unwrap_err();

        assert!(err.to_string().contains("Failed to parse config as TOML"));
    }

    #[test]
    fn test_load_config_returns_io_error_on_file_not_found() {
        let non_existent_path = PathBuf::from("/this/path/does/not/exist/config.toml");

        let err = load_config(non_existent_path).unwrap_err();

        assert!(
            err.to_string().contains("Failed to read config file"),
            "Expected IO error message, got: {}",
            err
        );
    }
}
