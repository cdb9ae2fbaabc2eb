//! TOML-based server configuration.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::mode::Mode;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;
/// BCM pin driving the grid relay (header pin 11).
pub const DEFAULT_GRID_PIN: u8 = 17;
/// BCM pin driving the inverter relay (header pin 12).
pub const DEFAULT_INVERTER_PIN: u8 = 18;
/// Default settle delay in milliseconds.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;
/// Highest BCM pin exposed on the 40-pin header.
pub const MAX_BCM_PIN: u8 = 27;
/// Upper bound for `settle_delay_ms`; anything longer leaves the load
/// unpowered for a noticeable time.
pub const MAX_SETTLE_DELAY_MS: u64 = 10_000;

/// Server configuration.
///
/// All fields have defaults matching the built-in constants. Load from
/// TOML with [`ServerConfig::from_toml_file`] or use
/// [`ServerConfig::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_address: IpAddr,
    /// HTTP port (must be > 0).
    pub port: u16,
    /// BCM pin number of the grid relay.
    pub grid_pin: u8,
    /// BCM pin number of the inverter relay.
    pub inverter_pin: u8,
    /// Pause between opening one relay and closing the other (ms).
    pub settle_delay_ms: u64,
    /// Mode applied right after startup.
    pub startup_mode: Mode,
    /// Drive in-memory lines instead of GPIO.
    pub dry_run: bool,
    /// Report unknown paths and commands with 4xx status codes instead of 200.
    pub strict_status_codes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            grid_pin: DEFAULT_GRID_PIN,
            inverter_pin: DEFAULT_INVERTER_PIN,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            startup_mode: Mode::Off,
            dry_run: false,
            strict_status_codes: false,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"grid_pin"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push(ConfigError::new("port", "must be > 0"));
        }
        for (field, pin) in [
            ("grid_pin", self.grid_pin),
            ("inverter_pin", self.inverter_pin),
        ] {
            if pin > MAX_BCM_PIN {
                errors.push(ConfigError::new(
                    field,
                    format!("must be a BCM pin in 0..={MAX_BCM_PIN}, got {pin}"),
                ));
            }
        }
        if self.grid_pin == self.inverter_pin {
            errors.push(ConfigError::new(
                "inverter_pin",
                format!("must differ from grid_pin ({})", self.grid_pin),
            ));
        }
        if !(1..=MAX_SETTLE_DELAY_MS).contains(&self.settle_delay_ms) {
            errors.push(ConfigError::new(
                "settle_delay_ms",
                format!("must be in 1..={MAX_SETTLE_DELAY_MS}"),
            ));
        }

        errors
    }
}
