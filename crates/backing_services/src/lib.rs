//! Ephemeral backing services for integration tests.
//!
//! Each fixture starts a disposable containerized service, exposes a thin
//! connection descriptor (host, mapped port, credentials where relevant)
//! and offers the vendor-specific reset call suites use between tests.
//! Containers are stopped and removed when the fixture is dropped.
//!
//! # Example
//!
//! ```ignore
//! use backing_services::RedisFixture;
//!
//! #[tokio::test]
//! async fn test_with_redis() {
//!     let redis = RedisFixture::start().await.unwrap();
//!     let client = redis.client().unwrap();
//!
//!     // ... exercise the system under test ...
//!
//!     redis.flush_all().await.unwrap();
//! }
//! ```

pub mod containers;
pub mod elasticsearch;
pub mod error;
pub mod influxdb;
pub mod redis;
pub mod rethinkdb;

pub use containers::{ServiceContainer, ServiceContainerConfig, WaitMessage};
pub use elasticsearch::{ElasticsearchFixture, ElasticsearchFixtureConfig};
pub use error::FixtureError;
pub use influxdb::{InfluxDbFixture, InfluxDbFixtureConfig};
pub use redis::{RedisFixture, RedisFixtureConfig};
pub use rethinkdb::{RethinkDbFixture, RethinkDbFixtureConfig};

/// Generate a database name that is unique to one test session.
///
/// Suites sharing a long-running server each get their own namespace, so
/// parallel runs never collide on state.
#[must_use]
pub fn session_db_name() -> String {
    format!("testingdb_{}", uuid::Uuid::new_v4().simple())
}
