//! Error type shared by all service fixtures.

/// Errors that can occur when starting or resetting a backing service
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// Container failed to start
    #[error("container failed to start: {0}")]
    Start(String),

    /// Failed to connect to a running service
    #[error("failed to connect to service: {0}")]
    Connection(String),

    /// Vendor reset call failed
    #[error("{service} reset failed: {detail}")]
    Reset {
        /// Service the reset was issued against
        service: &'static str,
        /// What went wrong
        detail: String,
    },

    /// HTTP request against the service's management API failed
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Redis command failed
    #[error("redis command failed: {0}")]
    Redis(#[from] redis::RedisError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_error_display() {
        let error = FixtureError::Start("image pull failed".to_string());
        assert!(error.to_string().contains("image pull failed"));
    }

    #[test]
    fn reset_error_names_service() {
        let error = FixtureError::Reset {
            service: "elasticsearch",
            detail: "index delete rejected".to_string(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("elasticsearch"));
        assert!(rendered.contains("index delete rejected"));
    }
}
