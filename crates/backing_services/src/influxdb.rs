//! InfluxDB fixture.
//!
//! Runs the 1.x image with HTTP auth enabled and gives every fixture its
//! own throwaway database. Create and drop go through the 1.x HTTP query
//! endpoint with basic auth.

use reqwest::StatusCode;
use tracing::{debug, info};

use crate::containers::{ServiceContainer, ServiceContainerConfig};
use crate::error::FixtureError;
use crate::session_db_name;

const HTTP_PORT: u16 = 8086;

/// Configuration for the InfluxDB fixture
#[derive(Debug, Clone)]
pub struct InfluxDbFixtureConfig {
    /// InfluxDB version tag (1.x line)
    pub version: String,
    /// Admin username
    pub username: String,
    /// Admin password
    pub password: String,
}

impl Default for InfluxDbFixtureConfig {
    fn default() -> Self {
        Self {
            version: "1.8".to_string(),
            username: "root".to_string(),
            password: "root".to_string(),
        }
    }
}

/// InfluxDB container wrapper with per-fixture database management.
#[derive(Debug)]
pub struct InfluxDbFixture {
    container: ServiceContainer,
    http: reqwest::Client,
    base_url: String,
    port: u16,
    username: String,
    password: String,
    db_name: String,
}

impl InfluxDbFixture {
    /// Start a new InfluxDB container with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start.
    pub async fn start() -> Result<Self, FixtureError> {
        Self::start_with_config(InfluxDbFixtureConfig::default()).await
    }

    /// Start a new InfluxDB container with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start.
    pub async fn start_with_config(config: InfluxDbFixtureConfig) -> Result<Self, FixtureError> {
        let container = ServiceContainer::start(container_config(&config)).await?;

        let port = container
            .mapped_port(HTTP_PORT)
            .ok_or_else(|| FixtureError::Start("http port not mapped".to_string()))?;

        let base_url = format!("http://{}:{}", container.host(), port);
        let db_name = session_db_name();

        info!(
            base_url = %base_url,
            db = %db_name,
            "InfluxDB container started"
        );

        Ok(Self {
            container,
            http: reqwest::Client::new(),
            base_url,
            port,
            username: config.username,
            password: config.password,
            db_name,
        })
    }

    /// Get the host address.
    pub fn host(&self) -> &str {
        self.container.host()
    }

    /// Get the mapped HTTP port.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Admin username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Admin password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Database name reserved for this test session.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Base URL of the HTTP API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create the session database.
    ///
    /// # Errors
    ///
    /// Returns an error if the query endpoint rejects the statement.
    pub async fn create_database(&self) -> Result<(), FixtureError> {
        self.query(&format!("CREATE DATABASE \"{}\"", self.db_name))
            .await
    }

    /// Drop the session database. The vendor reset between tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the query endpoint rejects the statement.
    pub async fn drop_database(&self) -> Result<(), FixtureError> {
        self.query(&format!("DROP DATABASE \"{}\"", self.db_name))
            .await
    }

    /// Check the `/ping` endpoint answers 204.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), FixtureError> {
        let response = self.http.get(format!("{}/ping", self.base_url)).send().await?;

        if response.status() == StatusCode::NO_CONTENT || response.status().is_success() {
            Ok(())
        } else {
            Err(FixtureError::Connection(format!(
                "influxdb ping returned {}",
                response.status()
            )))
        }
    }

    async fn query(&self, statement: &str) -> Result<(), FixtureError> {
        debug!(statement = %statement, "InfluxDB management query");

        let response = self
            .http
            .post(format!("{}/query", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("q", statement)])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(FixtureError::Reset {
                service: "influxdb",
                detail: format!("{statement} returned {status}: {body}"),
            })
        }
    }
}

/// `influxd` writes its log, including the HTTP-listener line, to stderr.
fn container_config(config: &InfluxDbFixtureConfig) -> ServiceContainerConfig {
    ServiceContainerConfig::new("influxdb", &config.version, HTTP_PORT)
        .with_env_var("INFLUXDB_HTTP_AUTH_ENABLED", "true")
        .with_env_var("INFLUXDB_ADMIN_USER", &config.username)
        .with_env_var("INFLUXDB_ADMIN_PASSWORD", &config.password)
        .with_wait_for_stderr_message("Listening on HTTP")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::WaitMessage;

    #[test]
    fn container_config_waits_on_stderr() {
        let config = container_config(&InfluxDbFixtureConfig::default());
        assert_eq!(
            config.wait_for_message,
            Some(WaitMessage::Stderr("Listening on HTTP".to_string()))
        );
    }

    #[test]
    fn config_default_credentials() {
        let config = InfluxDbFixtureConfig::default();
        assert_eq!(config.version, "1.8");
        assert_eq!(config.username, "root");
        assert_eq!(config.password, "root");
    }
}
