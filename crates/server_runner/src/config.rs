//! Runner configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::ServerRunner`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Interface the app binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the app binds to; `None` allocates a free port
    #[serde(default)]
    pub port: Option<u16>,

    /// File name of the rendered config inside the temp directory
    #[serde(default = "default_config_file_name")]
    pub config_file_name: String,

    /// Path polled for readiness, relative to the base URL
    #[serde(default = "default_ready_path")]
    pub ready_path: String,

    /// Readiness budget in milliseconds
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Extra variables exposed to the config template
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_config_file_name() -> String {
    "test_cfg.ini".to_string()
}

fn default_ready_path() -> String {
    "/ping".to_string()
}

const fn default_ready_timeout_ms() -> u64 {
    2000
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            config_file_name: default_config_file_name(),
            ready_path: default_ready_path(),
            ready_timeout_ms: default_ready_timeout_ms(),
            vars: BTreeMap::new(),
        }
    }
}

impl RunnerConfig {
    /// Readiness budget as a [`Duration`].
    #[must_use]
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Pin the app to a fixed port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Expose an extra variable to the config template.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = RunnerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, None);
        assert_eq!(config.config_file_name, "test_cfg.ini");
        assert_eq!(config.ready_path, "/ping");
        assert_eq!(config.ready_timeout(), Duration::from_secs(2));
        assert!(config.vars.is_empty());
    }

    #[test]
    fn config_builder_sets_port_and_vars() {
        let config = RunnerConfig::default()
            .with_port(8080)
            .with_var("db_host", "127.0.0.1");

        assert_eq!(config.port, Some(8080));
        assert_eq!(config.vars.get("db_host").map(String::as_str), Some("127.0.0.1"));
    }

    #[test]
    fn config_deserialization_applies_defaults() {
        let json = r#"{"port": 9000}"#;
        let config: RunnerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.ready_timeout_ms, 2000);
    }
}
