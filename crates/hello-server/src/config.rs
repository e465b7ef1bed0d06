// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server configuration module
//!
//! Configuration is read from a small, fixed set of environment variables
//! layered over built-in defaults. There is no configuration file.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::{Result, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, Map};
use serde::{Deserialize, Deserializer, de};

use crate::error::{ServerError, ServerResult};

/// Listen port variable
pub const PORT_VAR: &str = "PORT";
/// Any non-empty value disables SIGINT/SIGTERM capture
pub const NO_SIGNALS_VAR: &str = "NO_SIGNALS";
/// Shutdown grace period in seconds
pub const GRACE_PERIOD_VAR: &str = "GRACE_PERIOD_DURATION";

const RECOGNISED_VARS: [&str; 3] = [PORT_VAR, NO_SIGNALS_VAR, GRACE_PERIOD_VAR];

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GRACE_PERIOD_SECONDS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 15;

/// A validated, non-zero server port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerPort(u16);

impl ServerPort {
    /// Create a new `ServerPort`
    ///
    /// # Errors
    ///
    /// Returns an error if the port is 0
    pub fn new(port: u16) -> Result<Self> {
        ensure!(port != 0, "port cannot be 0");
        Ok(Self(port))
    }

    /// Port 0, letting the OS pick a free port. Only used by tests.
    pub const fn ephemeral() -> Self {
        Self(0)
    }

    /// Get the port value
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl Default for ServerPort {
    fn default() -> Self {
        Self(DEFAULT_PORT)
    }
}

impl<'de> Deserialize<'de> for ServerPort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        Self::new(port).map_err(|e| de::Error::custom(e.to_string()))
    }
}

/// A validated timeout duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Get the timeout value
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS))
    }
}

/// How long shutdown waits for in-flight requests before forcing termination.
///
/// Zero is allowed and forces termination as soon as any request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u64")]
pub struct GracePeriod(Duration);

impl GracePeriod {
    /// Grace period of the given number of seconds
    pub const fn from_secs(seconds: u64) -> Self {
        Self(Duration::from_secs(seconds))
    }

    /// Get the grace period
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl Default for GracePeriod {
    fn default() -> Self {
        Self::from_secs(DEFAULT_GRACE_PERIOD_SECONDS)
    }
}

impl From<u64> for GracePeriod {
    fn from(seconds: u64) -> Self {
        Self::from_secs(seconds)
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub host: IpAddr,
    /// Listen port (`PORT`)
    pub port: ServerPort,
    /// Upper bound on handling a single request (validated range: 1-300)
    pub request_timeout_seconds: TimeoutSeconds,
    /// Shutdown grace period (`GRACE_PERIOD_DURATION`)
    pub grace_period_duration: GracePeriod,
    /// Raw `NO_SIGNALS` value, if set
    #[serde(default)]
    pub no_signals: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: ServerPort::default(),
            request_timeout_seconds: TimeoutSeconds::default(),
            grace_period_duration: GracePeriod::default(),
            no_signals: None,
        }
    }
}

impl ServerConfig {
    /// Create configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_vars(std::env::vars()).map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load configuration from an explicit set of variables
    ///
    /// Only `PORT`, `NO_SIGNALS` and `GRACE_PERIOD_DURATION` are read, and
    /// variables with empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a recognised variable holds an invalid value.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let recognised: Map<String, String> = vars
            .into_iter()
            .filter(|(key, value)| RECOGNISED_VARS.contains(&key.as_str()) && !value.is_empty())
            .collect();

        Config::builder()
            .set_default("host", Ipv4Addr::UNSPECIFIED.to_string())?
            .set_default("port", u64::from(DEFAULT_PORT))?
            .set_default("request_timeout_seconds", DEFAULT_REQUEST_TIMEOUT_SECONDS)?
            .set_default("grace_period_duration", DEFAULT_GRACE_PERIOD_SECONDS)?
            .add_source(ConfigEnv::default().source(Some(recognised)))
            .build()?
            .try_deserialize()
    }

    /// Create configuration for tests: loopback, OS-assigned port
    pub fn for_testing() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::ephemeral(),
            ..Self::default()
        }
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }

    /// Whether the shutdown coordinator should capture SIGINT/SIGTERM
    pub fn signals_enabled(&self) -> bool {
        self.no_signals.as_deref().is_none_or(str::is_empty)
    }

    /// Shutdown grace period
    pub fn grace_period(&self) -> Duration {
        self.grace_period_duration.value()
    }
}
