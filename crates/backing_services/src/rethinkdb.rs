//! RethinkDB fixture.
//!
//! RethinkDB has no module in `testcontainers-modules`, so this runs the
//! stock image through [`ServiceContainer`]. There is no reset call:
//! every fixture gets its own throwaway database name, and the data dies
//! with the container.

use tracing::info;

use crate::containers::{ServiceContainer, ServiceContainerConfig};
use crate::error::FixtureError;
use crate::session_db_name;

const DRIVER_PORT: u16 = 28015;
const CLUSTER_PORT: u16 = 29015;

/// Configuration for the RethinkDB fixture
#[derive(Debug, Clone)]
pub struct RethinkDbFixtureConfig {
    /// RethinkDB version tag
    pub version: String,
}

impl Default for RethinkDbFixtureConfig {
    fn default() -> Self {
        Self {
            version: "2.4".to_string(),
        }
    }
}

/// RethinkDB container wrapper with a session-unique database name.
#[derive(Debug)]
pub struct RethinkDbFixture {
    container: ServiceContainer,
    port: u16,
    db_name: String,
}

impl RethinkDbFixture {
    /// Start a new RethinkDB container with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start.
    pub async fn start() -> Result<Self, FixtureError> {
        Self::start_with_config(RethinkDbFixtureConfig::default()).await
    }

    /// Start a new RethinkDB container with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start.
    pub async fn start_with_config(config: RethinkDbFixtureConfig) -> Result<Self, FixtureError> {
        let container = ServiceContainer::start(
            ServiceContainerConfig::new("rethinkdb", &config.version, DRIVER_PORT)
                .with_port(CLUSTER_PORT)
                .with_wait_for_message("Server ready"),
        )
        .await?;

        let port = container
            .mapped_port(DRIVER_PORT)
            .ok_or_else(|| FixtureError::Start("driver port not mapped".to_string()))?;

        let db_name = session_db_name();

        info!(
            host = %container.host(),
            port = port,
            db = %db_name,
            "RethinkDB container started"
        );

        Ok(Self {
            container,
            port,
            db_name,
        })
    }

    /// Get the host address.
    pub fn host(&self) -> &str {
        self.container.host()
    }

    /// Get the mapped driver port.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Database name reserved for this test session.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}
