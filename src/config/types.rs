//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::desk::SweeperConfig;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable permissive CORS.
    pub cors_permissive: bool,
}

/// Default port for the desk server.
pub const DEFAULT_PORT: u16 = 3001;

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_permissive: true,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// JSON file holding requests and knowledge.
    pub data_path: PathBuf,
    /// Keep everything in memory only.
    pub ephemeral: bool,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data.json"),
            ephemeral: false,
        }
    }
}

/// Timeout sweep settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperSection {
    /// Seconds between sweeps.
    pub tick_interval_secs: u64,
    /// Milliseconds a request may stay pending.
    pub pending_timeout_ms: u64,
}

impl Default for SweeperSection {
    fn default() -> Self {
        Self {
            tick_interval_secs: 10,
            pending_timeout_ms: 2 * 60 * 1000,
        }
    }
}

impl From<SweeperSection> for SweeperConfig {
    fn from(section: SweeperSection) -> Self {
        Self {
            tick_interval: Duration::from_secs(section.tick_interval_secs.max(1)),
            pending_timeout: Duration::from_millis(section.pending_timeout_ms),
        }
    }
}

/// Top-level desk configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub server: ServerSection,
    pub storage: StorageSection,
    pub sweeper: SweeperSection,
}

impl DeskConfig {
    /// Address string for binding the server.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply environment overrides using the given lookup.
    ///
    /// Recognized: `PORT`, `TIMEOUT_MS`, `FRONTDESK_DATA`, `FRONTDESK_TICK_SECS`.
    /// Values that do not parse are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = parse_env(&lookup, "PORT") {
            self.server.port = port;
        }
        if let Some(timeout) = parse_env(&lookup, "TIMEOUT_MS") {
            self.sweeper.pending_timeout_ms = timeout;
        }
        if let Some(tick) = parse_env(&lookup, "FRONTDESK_TICK_SECS") {
            self.sweeper.tick_interval_secs = tick;
        }
        if let Some(path) = lookup("FRONTDESK_DATA").filter(|p| !p.is_empty()) {
            self.storage.data_path = PathBuf::from(path);
        }
    }
}

fn parse_env<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring invalid environment override");
            None
        }
    }
}
