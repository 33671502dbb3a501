//! Database configuration module
//!
//! Holds the MySQL connection settings in the shape of the classic
//! `user:password@tcp(host:port)/dbname?params` data source name.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::parse_var;

/// Default MySQL port used when `addr` carries no explicit port
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Network type used to reach the MySQL server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// TCP socket, `addr` is `host:port`
    Tcp,
    /// Unix domain socket, `addr` is the socket path
    Unix,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Unix => "unix",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" => Ok(Network::Tcp),
            "unix" => Ok(Network::Unix),
            _ => Err(format!("Unsupported network type: {}", s)),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MySQL connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MySqlConfig {
    /// Network type (tcp or unix)
    pub net: Network,

    /// Server address, `host:port` for tcp or a socket path for unix
    pub addr: String,

    /// Database (schema) name
    pub db_name: String,

    /// Login user
    pub user: String,

    /// Login password
    pub password: String,

    /// Dial timeout, also used as the pool acquire timeout
    pub timeout: Duration,

    /// I/O read timeout
    pub read_timeout: Duration,

    /// I/O write timeout
    pub write_timeout: Duration,

    /// Decode DATETIME/TIMESTAMP columns as timestamps instead of raw bytes
    pub parse_time: bool,

    /// Connection character set
    pub charset: String,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            net: Network::Tcp,
            addr: String::from("127.0.0.1:3306"),
            db_name: String::from("test"),
            user: String::from("root"),
            password: String::from("root"),
            timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(1),
            parse_time: true,
            charset: String::from("utf8mb4"),
        }
    }
}

impl MySqlConfig {
    /// Create from environment variables
    ///
    /// Reads `DB_NET`, `DB_ADDR`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`,
    /// `DB_TIMEOUT_SECS`, `DB_READ_TIMEOUT_MS` and `DB_WRITE_TIMEOUT_MS`.
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary key lookup (environment, test fixtures)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            net: parse_var(&lookup, "DB_NET").unwrap_or(defaults.net),
            addr: lookup("DB_ADDR").unwrap_or(defaults.addr),
            db_name: lookup("DB_NAME").unwrap_or(defaults.db_name),
            user: lookup("DB_USER").unwrap_or(defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or(defaults.password),
            timeout: parse_var(&lookup, "DB_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            read_timeout: parse_var(&lookup, "DB_READ_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.read_timeout),
            write_timeout: parse_var(&lookup, "DB_WRITE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.write_timeout),
            ..defaults
        }
    }

    /// Set the server address
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Set login credentials
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Set the read and write I/O timeouts
    pub fn with_io_timeouts(mut self, read: Duration, write: Duration) -> Self {
        self.read_timeout = read;
        self.write_timeout = write;
        self
    }

    /// Host part of a tcp address
    pub fn host(&self) -> &str {
        match self.addr.rsplit_once(':') {
            Some((host, _)) => host,
            None => &self.addr,
        }
    }

    /// Port part of a tcp address, falling back to 3306
    pub fn port(&self) -> u16 {
        self.addr
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse().ok())
            .unwrap_or(DEFAULT_MYSQL_PORT)
    }

    /// Upper bound for one statement round trip
    pub fn statement_timeout(&self) -> Duration {
        self.read_timeout + self.write_timeout
    }

    /// Format as `user:password@net(addr)/dbname?params`
    pub fn format_dsn(&self) -> String {
        self.dsn_with_password(&self.password)
    }

    /// Same as [`format_dsn`](Self::format_dsn) with the password masked, safe to log
    pub fn redacted_dsn(&self) -> String {
        if self.password.is_empty() {
            self.dsn_with_password("")
        } else {
            self.dsn_with_password("***")
        }
    }

    fn dsn_with_password(&self, password: &str) -> String {
        let mut dsn = String::new();

        if !self.user.is_empty() {
            dsn.push_str(&self.user);
            if !password.is_empty() {
                dsn.push(':');
                dsn.push_str(password);
            }
            dsn.push('@');
        }

        dsn.push_str(&format!("{}({})/{}", self.net, self.addr, self.db_name));

        let mut params = vec![format!("charset={}", self.charset)];
        if self.parse_time {
            params.push(String::from("parseTime=true"));
        }
        params.push(format!("readTimeout={}", format_duration(self.read_timeout)));
        params.push(format!("timeout={}", format_duration(self.timeout)));
        params.push(format!("writeTimeout={}", format_duration(self.write_timeout)));

        dsn.push('?');
        dsn.push_str(&params.join("&"));
        dsn
    }
}

/// Render a duration the way DSN parameters expect it (`30s`, `500ms`)
fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_matches_local_test_database() {
        let config = MySqlConfig::default();
        assert_eq!(config.net, Network::Tcp);
        assert_eq!(config.addr, "127.0.0.1:3306");
        assert_eq!(config.db_name, "test");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.parse_time);
    }

    #[test]
    fn test_format_dsn() {
        let config = MySqlConfig::default();
        assert_eq!(
            config.format_dsn(),
            "root:root@tcp(127.0.0.1:3306)/test?charset=utf8mb4&parseTime=true&readTimeout=1s&timeout=30s&writeTimeout=1s"
        );
    }

    #[test]
    fn test_redacted_dsn_hides_password() {
        let config = MySqlConfig::default().with_credentials("app", "s3cret");
        let dsn = config.redacted_dsn();
        assert!(dsn.starts_with("app:***@tcp("));
        assert!(!dsn.contains("s3cret"));
    }

    #[test]
    fn test_dsn_without_user() {
        let config = MySqlConfig::default().with_credentials("", "");
        assert!(config.format_dsn().starts_with("tcp(127.0.0.1:3306)/test?"));
    }

    #[test]
    fn test_millisecond_timeouts_in_dsn() {
        let config = MySqlConfig::default()
            .with_io_timeouts(Duration::from_millis(500), Duration::from_millis(1500));
        let dsn = config.format_dsn();
        assert!(dsn.contains("readTimeout=500ms"));
        assert!(dsn.contains("writeTimeout=1500ms"));
        assert_eq!(config.statement_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_host_and_port() {
        let config = MySqlConfig::default().with_addr("db.internal:3307");
        assert_eq!(config.host(), "db.internal");
        assert_eq!(config.port(), 3307);

        let config = MySqlConfig::default().with_addr("db.internal");
        assert_eq!(config.host(), "db.internal");
        assert_eq!(config.port(), DEFAULT_MYSQL_PORT);
    }

    #[test]
    fn test_from_lookup_overrides_and_falls_back() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DB_ADDR", "10.0.0.5:3306"),
            ("DB_NAME", "clinic"),
            ("DB_TIMEOUT_SECS", "5"),
            ("DB_READ_TIMEOUT_MS", "not-a-number"),
        ]);

        let config = MySqlConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.addr, "10.0.0.5:3306");
        assert_eq!(config.db_name, "clinic");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.read_timeout, Duration::from_secs(1));
        assert_eq!(config.user, "root");
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("TCP".parse::<Network>().unwrap(), Network::Tcp);
        assert_eq!("unix".parse::<Network>().unwrap(), Network::Unix);
        assert!("udp".parse::<Network>().is_err());
    }
}
