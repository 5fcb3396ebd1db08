//! Configuration types shared across the dashboard core and its adapters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What a catalog refresh does to sessions whose pair stays selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RefreshPolicy {
    /// Recompute membership only: surviving sessions keep their widget and fetched data.
    #[default]
    Incremental,
    /// Dispose every session and recreate the surviving ones from scratch.
    Rebuild,
}

/// Fixed-delay reconnect configuration for the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Automatic reconnect attempts allowed before the channel gives up.
    pub max_attempts: u32,
    /// Delay between an unexpected close and the next attempt, in milliseconds.
    pub delay_ms: u64,
}

impl ReconnectConfig {
    /// Reconnect delay as a `Duration`.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 5_000,
        }
    }
}

/// Global configuration for a pairdash dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Base URL of the REST backend.
    pub api_url: String,
    /// Base URL of the log socket endpoint.
    pub ws_url: String,
    /// Number of bars requested per chart.
    pub bars_limit: u32,
    /// Log stream reconnect behavior.
    pub reconnect: ReconnectConfig,
    /// Trailing debounce window for viewport resize bursts, in milliseconds.
    pub resize_debounce_ms: u64,
    /// Behavior of `refresh_catalog` towards surviving sessions.
    pub refresh_policy: RefreshPolicy,
    /// Persistence key holding the JSON-encoded selection.
    pub selection_key: String,
    /// Persistence key holding `"dark"` or `"light"`.
    pub theme_key: String,
    /// Bearer token attached by transports that talk to the real backend.
    pub access_token: Option<String>,
}

impl DashConfig {
    /// Resize debounce window as a `Duration`.
    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            ws_url: "ws://localhost:8000".to_string(),
            bars_limit: 2000,
            reconnect: ReconnectConfig::default(),
            resize_debounce_ms: 100,
            refresh_policy: RefreshPolicy::default(),
            selection_key: "selectedPairs".to_string(),
            theme_key: "theme".to_string(),
            access_token: None,
        }
    }
}
