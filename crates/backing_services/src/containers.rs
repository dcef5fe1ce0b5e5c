//! Generic container support for services without a dedicated module.
//!
//! RethinkDB, InfluxDB and Elasticsearch ship no image wrapper in
//! `testcontainers-modules`, so their fixtures are built on this thin
//! layer over [`GenericImage`].

use std::time::Duration;

use testcontainers::{
    ContainerAsync, GenericImage, ImageExt,
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
};
use tracing::{debug, info};

use crate::error::FixtureError;

const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Log message that signals the service is up, on the stream the image
/// actually writes its logs to.
///
/// Images differ here: `influxd` logs to stderr, Elasticsearch to stdout.
/// Waiting on the wrong stream never matches and burns the whole startup
/// timeout on a healthy container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitMessage {
    /// Message expected on stdout
    Stdout(String),
    /// Message expected on stderr
    Stderr(String),
}

/// Configuration for a generic service container
#[derive(Debug, Clone)]
pub struct ServiceContainerConfig {
    /// Docker image name
    pub image: String,
    /// Image tag
    pub tag: String,
    /// Container ports to expose
    pub exposed_ports: Vec<u16>,
    /// Log message that signals the service is up
    pub wait_for_message: Option<WaitMessage>,
    /// Startup timeout
    pub startup_timeout: Duration,
    /// Environment variables
    pub env_vars: Vec<(String, String)>,
}

impl ServiceContainerConfig {
    /// Configuration for `image:tag` with a single exposed port.
    #[must_use]
    pub fn new(image: impl Into<String>, tag: impl Into<String>, port: u16) -> Self {
        Self {
            image: image.into(),
            tag: tag.into(),
            exposed_ports: vec![port],
            wait_for_message: None,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            env_vars: Vec::new(),
        }
    }

    /// Expose an additional container port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.exposed_ports.push(port);
        self
    }

    /// Wait for a stdout log line before the container counts as started.
    #[must_use]
    pub fn with_wait_for_message(mut self, message: impl Into<String>) -> Self {
        self.wait_for_message = Some(WaitMessage::Stdout(message.into()));
        self
    }

    /// Wait for a stderr log line before the container counts as started.
    #[must_use]
    pub fn with_wait_for_stderr_message(mut self, message: impl Into<String>) -> Self {
        self.wait_for_message = Some(WaitMessage::Stderr(message.into()));
        self
    }

    /// Set an environment variable on the container.
    #[must_use]
    pub fn with_env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Override the startup timeout.
    #[must_use]
    pub const fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }
}

/// A running container plus its resolved host-side network settings.
///
/// The container is stopped and removed when this is dropped.
#[derive(Debug)]
pub struct ServiceContainer {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    host: String,
    ports: Vec<(u16, u16)>, // (container_port, host_port)
}

impl ServiceContainer {
    /// Start a container with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or its network
    /// settings cannot be resolved.
    pub async fn start(config: ServiceContainerConfig) -> Result<Self, FixtureError> {
        info!(
            image = %config.image,
            tag = %config.tag,
            "Starting service container"
        );

        let mut image = GenericImage::new(&config.image, &config.tag);

        for port in &config.exposed_ports {
            image = image.with_exposed_port(ContainerPort::Tcp(*port));
        }

        match config.wait_for_message {
            Some(WaitMessage::Stdout(ref message)) => {
                image = image.with_wait_for(WaitFor::message_on_stdout(message.clone()));
            },
            Some(WaitMessage::Stderr(ref message)) => {
                image = image.with_wait_for(WaitFor::message_on_stderr(message.clone()));
            },
            None => {},
        }

        // ImageExt methods convert the image into a ContainerRequest.
        let mut container_request = image.with_startup_timeout(config.startup_timeout);
        for (key, value) in &config.env_vars {
            container_request = container_request.with_env_var(key, value);
        }

        let container = container_request
            .start()
            .await
            .map_err(|e| FixtureError::Start(e.to_string()))?;

        let host = container
            .get_host()
            .await
            .map_err(|e| FixtureError::Start(e.to_string()))?
            .to_string();

        let mut ports = Vec::new();
        for container_port in &config.exposed_ports {
            let host_port = container
                .get_host_port_ipv4(*container_port)
                .await
                .map_err(|e| FixtureError::Start(e.to_string()))?;
            ports.push((*container_port, host_port));
        }

        debug!(
            host = %host,
            ports = ?ports,
            "Service container started"
        );

        Ok(Self {
            container,
            host,
            ports,
        })
    }

    /// Get the host address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the host-mapped port for a container port.
    pub fn mapped_port(&self, container_port: u16) -> Option<u16> {
        self.ports
            .iter()
            .find(|(cp, _)| *cp == container_port)
            .map(|(_, hp)| *hp)
    }

    /// Get all port mappings as `(container_port, host_port)` pairs.
    pub fn port_mappings(&self) -> &[(u16, u16)] {
        &self.ports
    }
}
