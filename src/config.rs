//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

/// Default per-session fan-out capacity. Comfortably above the number of
/// events a single 7×6 game can produce.
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 128;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the server to (e.g. `0.0.0.0:8001`).
    pub listen_addr: SocketAddr,

    /// Capacity of each session's broadcast channel. Sessions raise it to
    /// one full game's worth of events if set lower.
    pub event_bus_capacity: usize,

    /// Upper bound for a single outbound WebSocket send, in milliseconds.
    pub send_timeout_ms: u64,

    /// How long a new connection may take to select its role, in seconds.
    /// `0` waits forever.
    pub role_timeout_secs: u64,

    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8001".to_string())
            .parse()?;

        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", DEFAULT_EVENT_BUS_CAPACITY);
        let send_timeout_ms = parse_env("SEND_TIMEOUT_MS", 5_000);
        let role_timeout_secs = parse_env("ROLE_TIMEOUT_SECS", 30);
        let log_json = parse_env_bool("LOG_JSON", false);

        Ok(Self {
            listen_addr,
            event_bus_capacity,
            send_timeout_ms,
            role_timeout_secs,
            log_json,
        })
    }

    /// Returns the per-connection timeouts derived from this config.
    #[must_use]
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            send_timeout: Duration::from_millis(self.send_timeout_ms),
            role_timeout: (self.role_timeout_secs > 0)
                .then(|| Duration::from_secs(self.role_timeout_secs)),
        }
    }
}

/// Timeouts applied to every relayed connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Upper bound for a single outbound send.
    pub send_timeout: Duration,
    /// Upper bound for receiving the role-selection message.
    pub role_timeout: Option<Duration>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(5),
            role_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
