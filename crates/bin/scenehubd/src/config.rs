//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `scenehub.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
    pub integrations: IntegrationsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Scene engine settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Events buffered per subscriber before a slow one starts lagging.
    pub event_bus_capacity: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Expose the simulated demo devices.
    pub virtual_enabled: bool,
}

impl Config {
    /// Load `scenehub.toml` (if present), apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("scenehub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply `SCENEHUB_*` overrides read through `var`.
    ///
    /// Unparsable numbers are ignored and the previous value is kept.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("SCENEHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("SCENEHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("SCENEHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("SCENEHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("SCENEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(capacity) =
            var("SCENEHUB_EVENT_BUS_CAPACITY").and_then(|val| val.parse().ok())
        {
            self.engine.event_bus_capacity = capacity;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.engine.event_bus_capacity == 0 {
            return Err(ConfigError::Validation(
                "event bus capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:scenehub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,tower_http=debug".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_bus_capacity: 256,
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.database_url(), "sqlite:scenehub.db?mode=rwc");
        assert_eq!(config.engine.event_bus_capacity, 256);
        assert!(config.integrations.virtual_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [engine]
            event_bus_capacity = 32

            [integrations]
            virtual_enabled = false
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.engine.event_bus_capacity, 32);
        assert!(!config.integrations.virtual_enabled);
    }

    #[test]
    fn should_fill_missing_sections_with_defaults() {
        let config: Config = toml::from_str("[server]\nport = 8080").unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.engine.event_bus_capacity, 256);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("SCENEHUB_PORT", "4000"),
            ("SCENEHUB_DATABASE_URL", "sqlite::memory:"),
            ("SCENEHUB_LOG", "warn"),
            ("SCENEHUB_EVENT_BUS_CAPACITY", "8"),
        ]));
        assert_eq!(config.bind_addr(), "0.0.0.0:4000");
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.engine.event_bus_capacity, 8);
    }

    #[test]
    fn should_let_bind_override_host_and_port() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("SCENEHUB_HOST", "10.0.0.1"),
            ("SCENEHUB_BIND", "127.0.0.1:8081"),
        ]));
        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
    }

    #[test]
    fn should_prefer_rust_log_over_scenehub_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("SCENEHUB_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_numbers() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("SCENEHUB_PORT", "http"),
            ("SCENEHUB_EVENT_BUS_CAPACITY", "-1"),
        ]));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.engine.event_bus_capacity, 256);
    }

    #[test]
    fn should_reject_zero_port_and_zero_capacity() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.engine.event_bus_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }
}
