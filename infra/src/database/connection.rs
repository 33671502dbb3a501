//! Database connection pool management
//!
//! This module provides database connection pooling using SQLx with MySQL.
//! Opening a pool is lazy; [`DatabasePool::connect`] pings the server right
//! after so that an unreachable database fails at startup.

use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, Connection, MySqlPool,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dt_shared::config::{MySqlConfig, Network, PoolConfig};

use crate::InfrastructureError;

/// Schema applied by [`DatabasePool::run_migrations`]
const INIT_SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Statements slower than this are logged at WARN
const SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_secs(1);

/// Build SQLx connect options from the connection configuration
///
/// The DSN read/write timeouts have no SQLx counterpart; they bound
/// statements in the repositories instead (see
/// [`MySqlConfig::statement_timeout`]).
pub fn connect_options(config: &MySqlConfig) -> Result<MySqlConnectOptions, InfrastructureError> {
    if config.addr.trim().is_empty() {
        return Err(InfrastructureError::Config(
            "database address must not be empty".to_string(),
        ));
    }

    let options = MySqlConnectOptions::new()
        .username(&config.user)
        .password(&config.password)
        .database(&config.db_name)
        .charset(&config.charset);

    let options = match config.net {
        Network::Tcp => options.host(config.host()).port(config.port()),
        Network::Unix => options.socket(&config.addr),
    };

    Ok(options
        .log_statements(log::LevelFilter::Debug)
        .log_slow_statements(log::LevelFilter::Warn, SLOW_STATEMENT_THRESHOLD))
}

/// Time after the last admission before idle slots are resynced with the pool
const IDLE_RESYNC_GRACE: Duration = Duration::from_secs(1);

/// Idle-queue slots handed out by [`IdleLimiter`]
#[derive(Debug, Default)]
struct IdleSlots {
    /// Connections admitted to the idle queue and not checked out since
    reserved: usize,
    last_admit: Option<Instant>,
}

impl IdleSlots {
    /// Reserve a slot for a released connection if one is free
    ///
    /// A connection admitted here reaches the idle queue only after the
    /// pool's release ping, so `observed_idle` lags behind. Idle connections
    /// reaped by the pool never pass through a hook, so once no admission
    /// is in flight the reservation count is lowered to what the pool reports.
    fn admit(&mut self, max_idle: usize, observed_idle: Option<usize>, now: Instant) -> bool {
        if let Some(observed) = observed_idle {
            let settled = self
                .last_admit
                .map_or(true, |at| now.saturating_duration_since(at) >= IDLE_RESYNC_GRACE);
            if settled && self.reserved > observed {
                self.reserved = observed;
            }
        }

        if self.reserved < max_idle {
            self.reserved += 1;
            self.last_admit = Some(now);
            true
        } else {
            false
        }
    }

    /// An idle connection was checked out
    fn checkout(&mut self) {
        self.reserved = self.reserved.saturating_sub(1);
    }
}

/// Caps the number of idle connections kept by the pool
///
/// SQLx has no idle-count knob. The `after_release` hook asks this limiter
/// for a slot and closes the released connection when none is free; the
/// `before_acquire` hook gives the slot back when an idle connection is
/// checked out.
struct IdleLimiter {
    max_idle: usize,
    pool: Mutex<Option<MySqlPool>>,
    slots: Mutex<IdleSlots>,
}

impl IdleLimiter {
    fn new(max_idle: usize) -> Self {
        Self {
            max_idle,
            pool: Mutex::new(None),
            slots: Mutex::new(IdleSlots::default()),
        }
    }

    fn attach(&self, pool: MySqlPool) {
        if let Ok(mut slot) = self.pool.lock() {
            *slot = Some(pool);
        }
    }

    /// Drop the pool handle so the hook no longer keeps the pool alive
    fn detach(&self) {
        if let Ok(mut slot) = self.pool.lock() {
            slot.take();
        }
    }

    /// Whether a connection being released may join the idle queue
    fn keep_released(&self) -> bool {
        if self.max_idle == 0 {
            return false;
        }

        let observed_idle = match self.pool.lock() {
            Ok(slot) => slot.as_ref().map(|pool| pool.num_idle()),
            Err(_) => None,
        };

        match self.slots.lock() {
            Ok(mut slots) => slots.admit(self.max_idle, observed_idle, Instant::now()),
            Err(_) => true,
        }
    }

    /// Called for every idle connection handed out by the pool
    fn on_checkout(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.checkout();
        }
    }
}

/// Database connection pool wrapper
///
/// Manages the MySQL connection pool with the tuning knobs from
/// [`PoolConfig`]: max open, max idle and connection lifetime.
#[derive(Clone)]
pub struct DatabasePool {
    /// SQLx MySQL connection pool
    pool: MySqlPool,
    /// Connection configuration used to create this pool
    config: MySqlConfig,
    /// Pool tuning used to create this pool
    pool_config: PoolConfig,
    idle_limiter: Arc<IdleLimiter>,
}

impl DatabasePool {
    /// Open a connection pool and verify the server answers a ping
    ///
    /// # Example
    /// ```no_run
    /// use dt_infra::database::DatabasePool;
    /// use dt_shared::config::{MySqlConfig, PoolConfig};
    ///
    /// async fn open() -> Result<DatabasePool, Box<dyn std::error::Error>> {
    ///     let pool = DatabasePool::connect(
    ///         &MySqlConfig::default(),
    ///         &PoolConfig::default().with_max_open(10),
    ///     )
    ///     .await?;
    ///     Ok(pool)
    /// }
    /// ```
    pub async fn connect(
        config: &MySqlConfig,
        pool_config: &PoolConfig,
    ) -> Result<Self, InfrastructureError> {
        let pool = Self::open(config, pool_config)?;

        if let Err(e) = pool.ping().await {
            tracing::error!(error = %e, "[database] ping failed");
            pool.close().await;
            return Err(e);
        }
        tracing::info!("[database] ping successfully");

        Ok(pool)
    }

    /// Open a connection pool without touching the network
    pub fn open(config: &MySqlConfig, pool_config: &PoolConfig) -> Result<Self, InfrastructureError> {
        tracing::info!(
            dsn = %config.redacted_dsn(),
            pool = %pool_config,
            "[database] opening connection pool"
        );

        let connect_options = connect_options(config).map_err(|e| {
            tracing::error!(error = %e, "[database] cannot open connection");
            e
        })?;

        let idle_limiter = Arc::new(IdleLimiter::new(pool_config.effective_max_idle() as usize));
        let release_limiter = idle_limiter.clone();
        let acquire_limiter = idle_limiter.clone();

        let pool = MySqlPoolOptions::new()
            // Connection pool size
            .max_connections(pool_config.effective_max_open())
            .min_connections(0)
            // Connection lifecycle
            .acquire_timeout(config.timeout)
            .idle_timeout(pool_config.idle_timeout)
            .max_lifetime(pool_config.max_lifetime)
            // Ping before checkout only when asked for
            .test_before_acquire(pool_config.test_before_acquire)
            .after_release(move |_conn, _meta| {
                let keep = release_limiter.keep_released();
                Box::pin(async move { Ok(keep) })
            })
            .before_acquire(move |_conn, _meta| {
                acquire_limiter.on_checkout();
                Box::pin(async move { Ok(true) })
            })
            .connect_lazy_with(connect_options);

        idle_limiter.attach(pool.clone());
        tracing::info!("[database] successfully opened");

        Ok(Self {
            pool,
            config: config.clone(),
            pool_config: pool_config.clone(),
            idle_limiter,
        })
    }

    /// Get a reference to the underlying SQLx pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Connection configuration this pool was created with
    pub fn config(&self) -> &MySqlConfig {
        &self.config
    }

    /// Pool tuning this pool was created with
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }

    /// Acquire a connection and ping the server
    pub async fn ping(&self) -> Result<(), InfrastructureError> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    /// Check if the database connection is healthy
    ///
    /// Performs a simple query to verify connectivity.
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if healthy, error otherwise
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        tracing::debug!("Performing database health check");

        let value: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                InfrastructureError::Database(e)
            })?;

        if value == 1 {
            tracing::debug!("Database health check passed");
            Ok(true)
        } else {
            tracing::warn!("Database health check returned unexpected value: {}", value);
            Ok(false)
        }
    }

    /// Get connection pool statistics
    pub fn statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    /// Close all connections in the pool
    ///
    /// Waits for checked-out connections to be returned.
    pub async fn close(&self) {
        self.idle_limiter.detach();
        self.pool.close().await;
        tracing::info!("[database] successfully closed");
    }

    /// Create the tables used by the walkthrough and the benchmark
    pub async fn run_migrations(&self) -> Result<(), InfrastructureError> {
        tracing::info!("Running database migrations");

        for statement in schema_statements(INIT_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        tracing::info!("Database migrations completed");
        Ok(())
    }
}

/// Split a schema script into individual statements
fn schema_statements(script: &str) -> impl Iterator<Item = &str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|statement| {
            statement
                .lines()
                .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with("--"))
        })
}

/// Connection pool statistics
#[derive(Debug, Clone)]
pub struct PoolStatistics {
    /// Total number of connections in the pool
    pub connections: u32,
    /// Number of idle connections
    pub idle_connections: usize,
    /// Maximum allowed connections
    pub max_connections: u32,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements() {
        let statements: Vec<_> = schema_statements(INIT_SCHEMA).collect();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS doctor_tb"));
        assert!(statements[1].contains("CREATE TABLE IF NOT EXISTS isbns"));
    }

    #[test]
    fn test_schema_statements_skip_comment_only_chunks() {
        let script = "-- leading comment\nSELECT 1;\n-- trailing comment\n";
        let statements: Vec<_> = schema_statements(script).collect();
        assert_eq!(statements, vec!["-- leading comment\nSELECT 1"]);
    }

    #[test]
    fn test_idle_limiter_zero_never_keeps() {
        let limiter = IdleLimiter::new(0);
        assert!(!limiter.keep_released());
    }

    #[test]
    fn test_idle_limiter_without_pool_keeps_up_to_cap() {
        let limiter = IdleLimiter::new(2);
        assert!(limiter.keep_released());
        assert!(limiter.keep_released());
        assert!(!limiter.keep_released());

        limiter.on_checkout();
        assert!(limiter.keep_released());
    }

    #[test]
    fn test_simultaneous_releases_share_one_slot() {
        // Eight connections come back before any of them reaches the idle queue
        let mut slots = IdleSlots::default();
        let now = Instant::now();
        let kept = (0..8).filter(|_| slots.admit(1, Some(0), now)).count();
        assert_eq!(kept, 1);
    }

    #[test]
    fn test_slots_resync_after_reaped_connections() {
        let mut slots = IdleSlots::default();
        let start = Instant::now();
        assert!(slots.admit(2, Some(0), start));
        assert!(slots.admit(2, Some(1), start));

        // Still within the grace period, the pool may not have caught up yet
        assert!(!slots.admit(2, Some(0), start + Duration::from_millis(10)));

        // Both idle connections were reaped by the pool
        assert!(slots.admit(2, Some(0), start + Duration::from_secs(2)));
        assert_eq!(slots.reserved, 1);
    }

    #[test]
    fn test_checkout_never_underflows() {
        let mut slots = IdleSlots::default();
        slots.checkout();
        assert_eq!(slots.reserved, 0);
    }
}
