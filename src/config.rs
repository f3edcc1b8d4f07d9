//! Configuration for thot
//!
//! Centralized client configuration with sensible defaults. Nothing here is
//! read from ambient global state; a `Config` is handed to the client
//! explicitly.

use std::time::Duration;

use crate::error::{Result, ThotError};

/// Port the store listens on
pub const STORE_PORT: u16 = 12903;

/// Host used whenever dev mode is on, and the default remote host
pub const LOCAL_HOST: &str = "localhost";

/// Client configuration for reaching a thot store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Addressing
    // -------------------------------------------------------------------------
    /// Remote store host (`application.dbHost`)
    pub db_host: String,

    /// Development flag (`application.devMode`). When set, the client always
    /// talks to `localhost`, whatever `db_host` says.
    pub dev_mode: bool,

    /// Store port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Socket Timeouts (0 = block indefinitely)
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_host: LOCAL_HOST.to_string(),
            dev_mode: true,
            port: STORE_PORT,
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a config from `THOT_DB_HOST`, `THOT_DEV_MODE` and `THOT_PORT`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();

        if let Some(host) = lookup("THOT_DB_HOST") {
            builder = builder.db_host(host);
        }

        if let Some(raw) = lookup("THOT_DEV_MODE") {
            let dev_mode = raw.trim().parse::<bool>().map_err(|_| {
                ThotError::Config(format!("THOT_DEV_MODE must be true or false, got '{}'", raw))
            })?;
            builder = builder.dev_mode(dev_mode);
        }

        if let Some(raw) = lookup("THOT_PORT") {
            let port = raw.trim().parse::<u16>().map_err(|_| {
                ThotError::Config(format!("THOT_PORT must be a port number, got '{}'", raw))
            })?;
            builder = builder.port(port);
        }

        Ok(builder.build())
    }

    /// Host the client connects to.
    ///
    /// Dev mode takes priority over an explicitly configured host.
    pub fn store_host(&self) -> &str {
        if self.dev_mode {
            LOCAL_HOST
        } else {
            &self.db_host
        }
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub(crate) fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the remote store host
    pub fn db_host(mut self, host: impl Into<String>) -> Self {
        self.config.db_host = host.into();
        self
    }

    /// Enable or disable dev mode
    pub fn dev_mode(mut self, enabled: bool) -> Self {
        self.config.dev_mode = enabled;
        self
    }

    /// Set the store port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
