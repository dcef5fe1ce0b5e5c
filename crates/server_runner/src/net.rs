//! Port allocation and HTTP readiness polling.

use std::net::TcpListener;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::RunnerError;

/// Interval between readiness probes.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Return a free TCP port on the loopback interface.
///
/// The listener is bound with port 0 so the OS picks an unused port, then
/// released. The port can be handed to a server that binds shortly after;
/// the usual small race is acceptable for test setup.
///
/// # Errors
///
/// Returns an error if no socket can be bound.
pub fn free_tcp_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);

    Ok(port)
}

/// Poll an HTTP URL until it answers with a success status.
///
/// Builds a one-shot client; callers that poll repeatedly should hold a
/// client and use [`wait_for_ready_with`].
///
/// # Errors
///
/// Returns an error if the URL never becomes ready within the budget.
pub async fn wait_for_ready(url: &str, timeout: Duration) -> Result<(), RunnerError> {
    wait_for_ready_with(&reqwest::Client::new(), url, timeout).await
}

/// Poll an HTTP URL with an existing client until it answers with a
/// success status.
///
/// Connection errors and non-2xx responses both count as "not ready yet".
/// Gives up after `timeout` with [`RunnerError::ReadyTimeout`].
///
/// # Errors
///
/// Returns an error if the URL never becomes ready within the budget.
pub async fn wait_for_ready_with(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<(), RunnerError> {
    let deadline = Instant::now() + timeout;

    debug!(url = %url, timeout = ?timeout, "Waiting for readiness");

    loop {
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(url = %url, "Ready");
                return Ok(());
            },
            Ok(response) => {
                trace!(url = %url, status = %response.status(), "Not ready yet");
            },
            Err(err) => {
                trace!(url = %url, error = %err, "Not ready yet");
            },
        }

        if Instant::now() >= deadline {
            return Err(RunnerError::ReadyTimeout {
                url: url.to_string(),
                timeout,
            });
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
