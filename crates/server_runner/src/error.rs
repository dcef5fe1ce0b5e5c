//! Error type for the server runner.

use std::time::Duration;

/// Errors that can occur while managing the application under test
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Config template failed to render
    #[error("config template failed to render: {0}")]
    Render(String),

    /// Filesystem or process I/O failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The child exited before readiness was established
    #[error("server exited early: {0}")]
    EarlyExit(String),

    /// `start` was called while a child is still running
    #[error("server already running (pid {pid})")]
    AlreadyRunning {
        /// Pid of the running child
        pid: u32,
    },

    /// The readiness endpoint never answered within the budget
    #[error("server at {url} not ready after {timeout:?}")]
    ReadyTimeout {
        /// Readiness URL that was polled
        url: String,
        /// Budget that was exhausted
        timeout: Duration,
    },
}
