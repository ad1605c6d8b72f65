//! Runtime settings for the `eql` binary.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `EQL__`-prefixed environment variables, e.g.
//! `EQL__SERVER__PORT=8080`.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{EqlError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `tracing_subscriber` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Settings {
    pub const DEFAULT_PATH: &'static str = "eql.toml";

    /// Reads `path`, or `eql.toml` when it exists. An explicitly given file
    /// must exist.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = File::with_name(path.unwrap_or(Self::DEFAULT_PATH)).required(path.is_some());
        let settings: Settings = Config::builder()
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.port", 3000_i64)?
            .set_default("log.filter", "info")?
            .add_source(file)
            .add_source(
                Environment::with_prefix("EQL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(EqlError::Config("server.port must be > 0".into()));
        }
        if self.server.bind_address.trim().is_empty() {
            return Err(EqlError::Config("server.bind_address must not be empty".into()));
        }
        Ok(())
    }
}
