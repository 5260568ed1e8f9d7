//! Startup configuration: the sink registration set and gateway settings.
//!
//! Loaded once at startup and immutable for the process lifetime. There is
//! no dynamic add/remove of sinks.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Minimum per-attempt delivery timeout. Missing or invalid configured
/// timeouts are raised to this floor rather than failing startup.
pub const MIN_TIMEOUT_SECS: u64 = 5;

/// How a registered sink receives events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// One-shot POST per event to a configured URL.
    HttpPush,
    /// Long-lived duplex channel that also accepts inbound calls.
    PersistentPeer,
}

/// Bounded retry for push deliveries: up to `max_attempts` total, separated
/// by a wait that doubles from `wait` up to `max_wait`.
///
/// Sink-level configuration, not global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            wait: Duration::from_millis(500),
            max_wait: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Wait to observe after the given failed attempt (1-based).
    pub fn wait_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let wait = self.wait.saturating_mul(1 << exp);
        wait.min(self.max_wait)
    }
}

/// One registered delivery target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub kind: TransportKind,
    pub destination: String,
    pub secret: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl SinkConfig {
    /// A one-shot HTTP push sink with default timeout and retry policy.
    pub fn http_push(destination: impl Into<String>) -> Self {
        Self {
            kind: TransportKind::HttpPush,
            destination: destination.into(),
            secret: None,
            timeout: Duration::from_secs(MIN_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }

    /// A persistent peer sink identified by its destination address.
    pub fn persistent_peer(destination: impl Into<String>) -> Self {
        Self {
            kind: TransportKind::PersistentPeer,
            ..Self::http_push(destination)
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set the per-attempt timeout, clamped to the 5 second floor.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(MIN_TIMEOUT_SECS));
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Immutable configuration snapshot captured at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Account identity of the owning session, sent as `X-Self-ID`.
    pub self_id: i64,
    /// Gateway auth token. `None` means open mode: every call dispatches.
    pub access_token: Option<String>,
    /// When set, the gateway echoes the raw inbound call in responses.
    pub debug: bool,
    pub sinks: Vec<SinkConfig>,
}

impl Config {
    pub fn new(self_id: i64) -> Self {
        Self {
            self_id,
            access_token: None,
            debug: false,
            sinks: Vec::new(),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_sink(mut self, sink: SinkConfig) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// `SELF_ID` is required. `HTTP_POST` registers one push sink, with
    /// optional `HTTP_SECRET` and `HTTP_TIMEOUT` (seconds; invalid values
    /// fall back to the floor). `ACCESS_TOKEN` enables gateway auth and
    /// `DEBUG=true` enables diagnostics echo.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let self_id = env::var("SELF_ID")
            .context("SELF_ID must be set")?
            .parse()
            .context("SELF_ID must be a number")?;

        let mut config = Config::new(self_id);
        config.access_token = env::var("ACCESS_TOKEN").ok().filter(|t| !t.is_empty());
        config.debug = env::var("DEBUG").map(|v| v == "true").unwrap_or(false);

        if let Ok(url) = env::var("HTTP_POST") {
            if !url.is_empty() {
                let mut sink = SinkConfig::http_push(url);
                if let Ok(secret) = env::var("HTTP_SECRET") {
                    if !secret.is_empty() {
                        sink = sink.with_secret(secret);
                    }
                }
                if let Ok(timeout) = env::var("HTTP_TIMEOUT") {
                    sink = sink.with_timeout_secs(timeout.parse().unwrap_or(0));
                }
                config.sinks.push(sink);
            }
        }

        Ok(config)
    }
}
