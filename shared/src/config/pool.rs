//! Connection pool tuning configuration
//!
//! The three knobs explored by the benchmark: maximum open connections,
//! maximum idle connections and connection lifetime. `None` means
//! "unlimited" for every knob except `max_idle`, where it means the
//! default of two idle connections.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::parse_var;

/// Idle connections kept when `max_idle` is not set
pub const DEFAULT_MAX_IDLE: u32 = 2;

/// Pool size used for an "unlimited" `max_open`
///
/// Matches the MySQL server default for `max_connections`; the pool
/// allocates its idle queue up front, so a literal `u32::MAX` is not usable.
pub const UNLIMITED_OPEN_CEILING: u32 = 151;

/// Pool tuning knobs
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Maximum number of open connections (None = unlimited)
    #[serde(default)]
    pub max_open: Option<u32>,

    /// Maximum number of idle connections (None = default of 2)
    #[serde(default)]
    pub max_idle: Option<u32>,

    /// Maximum time a connection may be reused after it was opened (None = forever)
    #[serde(default)]
    pub max_lifetime: Option<Duration>,

    /// Maximum time a connection may sit idle (None = forever)
    #[serde(default)]
    pub idle_timeout: Option<Duration>,

    /// Ping idle connections before handing them out
    ///
    /// Off by default so a checkout costs no extra round trip.
    #[serde(default)]
    pub test_before_acquire: bool,
}

impl PoolConfig {
    /// Create from environment variables
    ///
    /// Reads `DB_MAX_OPEN`, `DB_MAX_IDLE`, `DB_MAX_LIFETIME_MS` and
    /// `DB_IDLE_TIMEOUT_SECS`. A value of 0 means unlimited for
    /// everything except `DB_MAX_IDLE`, where 0 disables idle connections.
    /// `DB_TEST_BEFORE_ACQUIRE=true` turns on the checkout ping.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            max_open: parse_var::<u32, _>(&lookup, "DB_MAX_OPEN").filter(|n| *n > 0),
            max_idle: parse_var(&lookup, "DB_MAX_IDLE"),
            max_lifetime: parse_var::<u64, _>(&lookup, "DB_MAX_LIFETIME_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            idle_timeout: parse_var::<u64, _>(&lookup, "DB_IDLE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            test_before_acquire: parse_var(&lookup, "DB_TEST_BEFORE_ACQUIRE").unwrap_or(false),
        }
    }

    /// Limit the number of open connections
    pub fn with_max_open(mut self, max: u32) -> Self {
        self.max_open = Some(max);
        self
    }

    /// Limit the number of idle connections
    pub fn with_max_idle(mut self, max: u32) -> Self {
        self.max_idle = Some(max);
        self
    }

    /// Limit how long a connection may be reused
    pub fn with_max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = Some(lifetime);
        self
    }

    /// Ping idle connections before each checkout
    pub fn with_test_before_acquire(mut self, enabled: bool) -> Self {
        self.test_before_acquire = enabled;
        self
    }

    /// Whether `max_open` is unlimited
    pub fn is_unlimited(&self) -> bool {
        self.max_open.is_none()
    }

    /// Number of connections the pool is allowed to open
    ///
    /// A configured limit of zero is treated as unlimited.
    pub fn effective_max_open(&self) -> u32 {
        match self.max_open {
            Some(max) if max > 0 => max,
            _ => UNLIMITED_OPEN_CEILING,
        }
    }

    /// Number of idle connections the pool keeps, never above `max_open`
    pub fn effective_max_idle(&self) -> u32 {
        self.max_idle
            .unwrap_or(DEFAULT_MAX_IDLE)
            .min(self.effective_max_open())
    }
}

impl std::fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max_open {
            Some(max) => write!(f, "max_open={}", max)?,
            None => write!(f, "max_open=unlimited")?,
        }
        write!(f, " max_idle={}", self.effective_max_idle())?;
        match self.max_lifetime {
            Some(lifetime) => write!(f, " max_lifetime={}ms", lifetime.as_millis()),
            None => write!(f, " max_lifetime=unlimited"),
        }
    }
}
