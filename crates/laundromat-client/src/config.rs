//! Configuration for the client.
//!
//! All configuration is loaded from environment variables. Parsing goes
//! through a lookup function so the rules can be exercised without
//! touching the process environment.

use std::time::Duration;

use laundromat_types::AgentId;

use crate::error::ClientError;

/// Default simulation server address.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Default local player identifier.
pub const DEFAULT_PLAYER_ID: &str = "p1";

/// Default auto-play period in milliseconds.
pub const DEFAULT_AUTO_PLAY_INTERVAL_MS: u64 = 3000;

/// Shortest auto-play period accepted from configuration.
pub const MIN_AUTO_PLAY_INTERVAL_MS: u64 = 100;

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the simulation server, without a trailing slash.
    pub server_url: String,
    /// Agent id of the local player.
    pub player_id: AgentId,
    /// Delay between auto-play turns.
    pub auto_play_interval: Duration,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            player_id: AgentId::from(DEFAULT_PLAYER_ID),
            auto_play_interval: Duration::from_millis(DEFAULT_AUTO_PLAY_INTERVAL_MS),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `LAUNDROMAT_SERVER_URL` -- simulation server base URL (default `http://localhost:8000`)
    /// - `LAUNDROMAT_PLAYER_ID` -- local player's agent id (default `p1`)
    /// - `AUTO_PLAY_INTERVAL_MS` -- auto-play period, at least 100 (default 3000)
    /// - `REQUEST_TIMEOUT_MS` -- per-request timeout (default: none)
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup("LAUNDROMAT_SERVER_URL")
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned());
        let server_url = normalize_server_url(&server_url)?;

        let player_id = lookup("LAUNDROMAT_PLAYER_ID")
            .map_or_else(|| DEFAULT_PLAYER_ID.to_owned(), |id| id.trim().to_owned());
        if player_id.is_empty() {
            return Err(ClientError::Config(
                "LAUNDROMAT_PLAYER_ID must not be empty".to_owned(),
            ));
        }

        let interval_ms: u64 = lookup("AUTO_PLAY_INTERVAL_MS")
            .unwrap_or_else(|| DEFAULT_AUTO_PLAY_INTERVAL_MS.to_string())
            .trim()
            .parse()
            .map_err(|e| ClientError::Config(format!("invalid AUTO_PLAY_INTERVAL_MS: {e}")))?;
        if interval_ms < MIN_AUTO_PLAY_INTERVAL_MS {
            return Err(ClientError::Config(format!(
                "AUTO_PLAY_INTERVAL_MS must be at least {MIN_AUTO_PLAY_INTERVAL_MS}, got {interval_ms}"
            )));
        }

        let request_timeout = lookup("REQUEST_TIMEOUT_MS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| ClientError::Config(format!("invalid REQUEST_TIMEOUT_MS: {e}")))
            })
            .transpose()?;

        Ok(Self {
            server_url,
            player_id: AgentId::from(player_id),
            auto_play_interval: Duration::from_millis(interval_ms),
            request_timeout,
        })
    }
}

/// Trim whitespace and trailing slashes, and require an HTTP scheme.
fn normalize_server_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ClientError::Config(format!(
            "LAUNDROMAT_SERVER_URL must start with http:// or https://, got {raw:?}"
        )));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, Ok(ClientConfig::default()));
    }

    #[test]
    fn reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("LAUNDROMAT_SERVER_URL", "https://sim.example.com/api/"),
            ("LAUNDROMAT_PLAYER_ID", "player_7"),
            ("AUTO_PLAY_INTERVAL_MS", "1500"),
            ("REQUEST_TIMEOUT_MS", "2500"),
        ]))
        .unwrap();
        assert_eq!(config.server_url, "https://sim.example.com/api");
        assert_eq!(config.player_id.as_str(), "player_7");
        assert_eq!(config.auto_play_interval, Duration::from_millis(1500));
        assert_eq!(config.request_timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn rejects_too_short_interval() {
        let config = ClientConfig::from_lookup(lookup_from(&[("AUTO_PLAY_INTERVAL_MS", "50")]));
        assert!(matches!(config, Err(ClientError::Config(_))));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let config = ClientConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_MS", "soon")]));
        assert!(matches!(config, Err(ClientError::Config(_))));
    }

    #[test]
    fn rejects_url_without_scheme() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("LAUNDROMAT_SERVER_URL", "localhost:8000")]));
        assert!(matches!(config, Err(ClientError::Config(_))));
    }

    #[test]
    fn rejects_blank_player_id() {
        let config = ClientConfig::from_lookup(lookup_from(&[("LAUNDROMAT_PLAYER_ID", "  ")]));
        assert!(matches!(config, Err(ClientError::Config(_))));
    }
}
