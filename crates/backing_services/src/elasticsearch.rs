//! Elasticsearch fixture.
//!
//! Single-node cluster with security off and a bounded heap, suitable for
//! index round-trips in tests. [`ElasticsearchFixture::hard_reset`] wipes
//! every index and is the between-tests cleanup when one container serves
//! a whole session.

use std::time::Duration;

use tracing::{info, warn};

use crate::containers::{ServiceContainer, ServiceContainerConfig};
use crate::error::FixtureError;

const HTTP_PORT: u16 = 9200;
const STARTUP_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the Elasticsearch fixture
#[derive(Debug, Clone)]
pub struct ElasticsearchFixtureConfig {
    /// Elasticsearch version tag
    pub version: String,
    /// JVM heap size (both -Xms and -Xmx)
    pub heap_size: String,
}

impl Default for ElasticsearchFixtureConfig {
    fn default() -> Self {
        Self {
            version: "7.17.18".to_string(),
            heap_size: "512m".to_string(),
        }
    }
}

/// Elasticsearch container wrapper with hard-reset support.
#[derive(Debug)]
pub struct ElasticsearchFixture {
    container: ServiceContainer,
    http: reqwest::Client,
    base_url: String,
    port: u16,
}

impl ElasticsearchFixture {
    /// Start a new Elasticsearch container with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start.
    pub async fn start() -> Result<Self, FixtureError> {
        Self::start_with_config(ElasticsearchFixtureConfig::default()).await
    }

    /// Start a new Elasticsearch container with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start.
    pub async fn start_with_config(
        config: ElasticsearchFixtureConfig,
    ) -> Result<Self, FixtureError> {
        let container = ServiceContainer::start(container_config(&config)).await?;

        let port = container
            .mapped_port(HTTP_PORT)
            .ok_or_else(|| FixtureError::Start("http port not mapped".to_string()))?;

        let base_url = format!("http://{}:{}", container.host(), port);

        info!(base_url = %base_url, "Elasticsearch container started");

        Ok(Self {
            container,
            http: reqwest::Client::new(),
            base_url,
            port,
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

    /// Base URL of the HTTP API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Poll cluster health until yellow-or-better.
    ///
    /// The container wait strategy covers the node logging its started
    /// line; this covers the cluster actually accepting index operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster does not reach yellow within the
    /// requested timeout.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<(), FixtureError> {
        let url = format!(
            "{}/_cluster/health?wait_for_status=yellow&timeout={}s",
            self.base_url,
            timeout.as_secs()
        );

        let response = self.http.get(&url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(FixtureError::Connection(format!(
                "cluster health returned {}",
                response.status()
            )))
        }
    }

    /// Check the root endpoint answers 200.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), FixtureError> {
        let response = self.http.get(&self.base_url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(FixtureError::Connection(format!(
                "elasticsearch ping returned {}",
                response.status()
            )))
        }
    }

    /// Delete every index. The vendor reset between tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete is rejected.
    pub async fn hard_reset(&self) -> Result<(), FixtureError> {
        warn!(base_url = %self.base_url, "Hard reset: deleting all indices");

        let response = self
            .http
            .delete(format!("{}/_all", self.base_url))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(FixtureError::Reset {
                service: "elasticsearch",
                detail: format!("index delete returned {status}: {body}"),
            })
        }
    }
}

/// Elasticsearch logs to stdout; the node reports `started` once the
/// transport and HTTP layers are up. Matches both the plain (`] started`)
/// and JSON (`"message": "started"`) log layouts.
fn container_config(config: &ElasticsearchFixtureConfig) -> ServiceContainerConfig {
    let java_opts = format!("-Xms{0} -Xmx{0}", config.heap_size);

    ServiceContainerConfig::new(
        "docker.elastic.co/elasticsearch/elasticsearch",
        &config.version,
        HTTP_PORT,
    )
    .with_env_var("discovery.type", "single-node")
    .with_env_var("xpack.security.enabled", "false")
    .with_env_var("ES_JAVA_OPTS", &java_opts)
    .with_wait_for_message("started")
    .with_startup_timeout(STARTUP_TIMEOUT)
}
