//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub gateway: ServerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: default_env(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Listen address of the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Relay behaviour and per-connection limits
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Heartbeat interval advertised to clients in Hello
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Silence after which a connection is closed
    #[serde(default = "default_heartbeat_timeout_ms")]
    pub heartbeat_timeout_ms: u64,
    /// Capacity of each connection's outbound queue
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
    /// How long a broadcast waits for room in a recipient's queue
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    /// Largest inbound WebSocket message accepted
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    /// Include the sender when fanning out its own chat/media messages
    #[serde(default = "default_true")]
    pub echo_to_sender: bool,
    /// Announce "<name> left the room" on room switch and disconnect
    #[serde(default)]
    pub announce_departures: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            heartbeat_timeout_ms: default_heartbeat_timeout_ms(),
            outbound_buffer: default_outbound_buffer(),
            send_timeout_ms: default_send_timeout_ms(),
            max_message_bytes: default_max_message_bytes(),
            echo_to_sender: true,
            announce_departures: false,
        }
    }
}

impl RelayConfig {
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    #[must_use]
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

// Default value functions
fn default_app_name() -> String {
    "room-relay".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_heartbeat_interval_ms() -> u64 {
    45_000
}

fn default_heartbeat_timeout_ms() -> u64 {
    90_000
}

fn default_outbound_buffer() -> usize {
    100
}

fn default_send_timeout_ms() -> u64 {
    5_000
}

fn default_max_message_bytes() -> usize {
    1_000_000
}

fn default_true() -> bool {
    true
}

/// Parse an optional variable, falling back to `default` when it is unset
fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        None => Ok(default),
    }
}

fn parse_bool_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(name) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(name, raw)),
        },
        None => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match lookup("APP_ENV") {
            Some(raw) => raw
                .parse()
                .map_err(|()| ConfigError::InvalidValue("APP_ENV", raw))?,
            None => default_env(),
        };

        let config = Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port: parse_or(&lookup, "GATEWAY_PORT", default_port())?,
            },
            relay: RelayConfig {
                heartbeat_interval_ms: parse_or(
                    &lookup,
                    "RELAY_HEARTBEAT_INTERVAL_MS",
                    default_heartbeat_interval_ms(),
                )?,
                heartbeat_timeout_ms: parse_or(
                    &lookup,
                    "RELAY_HEARTBEAT_TIMEOUT_MS",
                    default_heartbeat_timeout_ms(),
                )?,
                outbound_buffer: parse_or(
                    &lookup,
                    "RELAY_OUTBOUND_BUFFER",
                    default_outbound_buffer(),
                )?,
                send_timeout_ms: parse_or(
                    &lookup,
                    "RELAY_SEND_TIMEOUT_MS",
                    default_send_timeout_ms(),
                )?,
                max_message_bytes: parse_or(
                    &lookup,
                    "RELAY_MAX_MESSAGE_BYTES",
                    default_max_message_bytes(),
                )?,
                echo_to_sender: parse_bool_or(&lookup, "RELAY_ECHO_TO_SENDER", true)?,
                announce_departures: parse_bool_or(&lookup, "RELAY_ANNOUNCE_DEPARTURES", false)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "RELAY_OUTBOUND_BUFFER",
                "must be greater than zero".to_string(),
            ));
        }
        if self.relay.heartbeat_timeout_ms < self.relay.heartbeat_interval_ms {
            return Err(ConfigError::InvalidValue(
                "RELAY_HEARTBEAT_TIMEOUT_MS",
                format!(
                    "must not be shorter than the heartbeat interval ({}ms)",
                    self.relay.heartbeat_interval_ms
                ),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
