//! Emitter implementations for the sysflux agent.
//!
//! [`InfluxEmitter`] writes completed batches to an InfluxDB-compatible
//! HTTP endpoint in line protocol; [`StdoutEmitter`] dumps them as JSON,
//! which is the default when no database is configured.

pub mod error;
mod influx;
mod stdout;

pub use influx::InfluxEmitter;
pub use stdout::StdoutEmitter;

use serde::Deserialize;

/// Sink connection settings, normally embedded as the `[sink]` table of
/// the agent configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Host and port of the write endpoint.
    #[serde(default = "default_url")]
    pub url: String,
    /// Use HTTPS for the connection.
    #[serde(default)]
    pub ssl: bool,
    /// Target database. When unset, batches are printed to stdout
    /// instead of being sent anywhere.
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Path to a file whose first line replaces `password`.
    #[serde(default)]
    pub secret_file: Option<String>,
    #[serde(default)]
    pub retention_policy: Option<String>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            ssl: false,
            database: None,
            username: default_username(),
            password: default_password(),
            secret_file: None,
            retention_policy: None,
        }
    }
}

fn default_url() -> String {
    "localhost:8086".to_string()
}

fn default_username() -> String {
    "root".to_string()
}

fn default_password() -> String {
    "root".to_string()
}
