//! Redis fixture.
//!
//! Starts a disposable Redis container and exposes the connection
//! descriptor test suites wire into the system under test: host, mapped
//! port, the cache keyspace and the deferred-work keyspace. One fixture
//! is typically held for a whole test session, with [`RedisFixture::flush_all`]
//! run between tests as the reset.

use redis::AsyncCommands as _;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::redis::Redis;
use tracing::{debug, info, warn};

use crate::error::FixtureError;

const REDIS_PORT: u16 = 6379;

/// Configuration for the Redis fixture
#[derive(Debug, Clone)]
pub struct RedisFixtureConfig {
    /// Redis version tag (e.g., "7-alpine")
    pub version: String,
    /// Keyspace handed to application caches
    pub cache_db: u8,
    /// Keyspace for deferred / task-queue work
    pub defer_db: u8,
}

impl Default for RedisFixtureConfig {
    fn default() -> Self {
        Self {
            version: "7-alpine".to_string(),
            cache_db: 2,
            defer_db: 6,
        }
    }
}

/// Redis container wrapper with connection descriptor and reset support.
#[derive(Debug)]
pub struct RedisFixture {
    #[allow(dead_code)]
    container: ContainerAsync<Redis>,
    connection_string: String,
    host: String,
    port: u16,
    cache_db: u8,
    defer_db: u8,
}

impl RedisFixture {
    /// Start a new Redis container with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start.
    pub async fn start() -> Result<Self, FixtureError> {
        Self::start_with_config(RedisFixtureConfig::default()).await
    }

    /// Start a new Redis container with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start.
    pub async fn start_with_config(config: RedisFixtureConfig) -> Result<Self, FixtureError> {
        info!(version = %config.version, "Starting Redis container");

        let container = Redis::default()
            .with_tag(&config.version)
            .start()
            .await
            .map_err(|e| FixtureError::Start(e.to_string()))?;

        let host = container
            .get_host()
            .await
            .map_err(|e| FixtureError::Start(e.to_string()))?
            .to_string();

        let port = container
            .get_host_port_ipv4(REDIS_PORT)
            .await
            .map_err(|e| FixtureError::Start(e.to_string()))?;

        let connection_string = format!("redis://{host}:{port}");

        debug!(
            host = %host,
            port = %port,
            cache_db = config.cache_db,
            defer_db = config.defer_db,
            "Redis container started"
        );

        Ok(Self {
            container,
            connection_string,
            host,
            port,
            cache_db: config.cache_db,
            defer_db: config.defer_db,
        })
    }

    /// Get the connection string for this Redis instance.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Get the host address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the mapped port.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Keyspace the application cache should use.
    pub const fn cache_db(&self) -> u8 {
        self.cache_db
    }

    /// Keyspace the deferred-work queue should use.
    pub const fn defer_db(&self) -> u8 {
        self.defer_db
    }

    /// A client bound to the cache keyspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection URL fails to parse.
    pub fn client(&self) -> Result<redis::Client, FixtureError> {
        let url = format!("{}/{}", self.connection_string, self.cache_db);
        redis::Client::open(url).map_err(FixtureError::from)
    }

    /// Drop the contents of every keyspace.
    ///
    /// This is the between-tests reset when one container serves a whole
    /// session.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the FLUSHALL command fails.
    pub async fn flush_all(&self) -> Result<(), FixtureError> {
        warn!(host = %self.host, port = self.port, "Flushing all Redis keyspaces");

        let client = self.client()?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("FLUSHALL").query_async::<()>(&mut conn).await?;

        Ok(())
    }

    /// Check the server answers PING.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or answers anything
    /// other than PONG.
    pub async fn ping(&self) -> Result<(), FixtureError> {
        let client = self.client()?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(FixtureError::Connection(format!(
                "unexpected PING reply: {pong}"
            )))
        }
    }

    /// Store a value under a key in the cache keyspace.
    ///
    /// Convenience for tests that need to seed state.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the SET command fails.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), FixtureError> {
        let client = self.client()?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_keyspaces() {
        let config = RedisFixtureConfig::default();
        assert_eq!(config.version, "7-alpine");
        assert_eq!(config.cache_db, 2);
        assert_eq!(config.defer_db, 6);
    }
}
