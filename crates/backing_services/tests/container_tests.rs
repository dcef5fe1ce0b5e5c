//! Container-backed integration tests.
//!
//! These start real containers and therefore require a running Docker
//! daemon; they are `#[ignore]`d by default. Run with:
//!
//! ```sh
//! cargo test -p backing_services -- --ignored
//! ```

use std::time::Duration;

use backing_services::{
    ElasticsearchFixture, InfluxDbFixture, RedisFixture, RethinkDbFixture,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn redis_fixture_starts_and_answers_ping() {
    init_tracing();
    let redis = RedisFixture::start().await.unwrap();

    assert!(redis.port() > 0);
    assert!(redis.connection_string().starts_with("redis://"));
    redis.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn redis_flush_all_clears_seeded_state() {
    init_tracing();
    let redis = RedisFixture::start().await.unwrap();

    redis.set("fixture:key", "value").await.unwrap();
    redis.flush_all().await.unwrap();

    let client = redis.client().unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let remaining: Option<String> = redis::cmd("GET")
        .arg("fixture:key")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert!(remaining.is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn rethinkdb_fixture_exposes_driver_port() {
    init_tracing();
    let rethink = RethinkDbFixture::start().await.unwrap();

    assert!(rethink.port() > 0);
    assert!(rethink.db_name().starts_with("testingdb_"));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn influxdb_database_lifecycle() {
    init_tracing();
    let influx = InfluxDbFixture::start().await.unwrap();

    influx.ping().await.unwrap();
    influx.create_database().await.unwrap();
    influx.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn elasticsearch_hard_reset_succeeds_on_empty_cluster() {
    init_tracing();
    let elastic = ElasticsearchFixture::start().await.unwrap();

    elastic
        .wait_until_ready(Duration::from_secs(30))
        .await
        .unwrap();
    elastic.hard_reset().await.unwrap();
}
