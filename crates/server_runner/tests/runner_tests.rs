//! Runner lifecycle tests.
//!
//! The readiness endpoint is mocked with wiremock, so these run without
//! Docker or a real application binary. The "app" is a long sleep; only
//! the lifecycle around it is under test.

use std::path::Path;
use std::time::Duration;

use server_runner::{RunnerConfig, RunnerError, ServerRunner, ServerTemplate, wait_for_ready};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct SleepApp;

impl ServerTemplate for SleepApp {
    fn template(&self) -> &str {
        "[server:main]\nhost = {{ host }}\nport = {{ port }}\n"
    }

    fn command(&self, _config_path: &Path) -> (String, Vec<String>) {
        ("sh".to_string(), vec!["-c".to_string(), "sleep 30".to_string()])
    }
}

#[tokio::test]
async fn wait_for_ready_succeeds_against_live_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let url = format!("{}/ping", server.uri());
    wait_for_ready(&url, Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn wait_for_ready_treats_5xx_as_not_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/ping", server.uri());
    let result = wait_for_ready(&url, Duration::from_millis(300)).await;
    assert!(matches!(result, Err(RunnerError::ReadyTimeout { .. })));
}

#[cfg(unix)]
#[tokio::test]
async fn start_waits_for_readiness_then_stop_kills_the_child() {
    // The mock server stands in for the app's readiness endpoint: pin the
    // runner to its port so the probe lands on the mock.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = RunnerConfig::default().with_port(server.address().port());
    let mut runner = ServerRunner::prepare(&SleepApp, config).unwrap();

    let pid = runner.start().await.unwrap();
    assert!(pid > 0);
    assert!(runner.is_running());

    runner.stop().await.unwrap();
    assert!(!runner.is_running());

    // Idempotent.
    runner.stop().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn start_rejects_a_second_call_while_running() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = RunnerConfig::default().with_port(server.address().port());
    let mut runner = ServerRunner::prepare(&SleepApp, config).unwrap();

    let pid = runner.start().await.unwrap();

    let second = runner.start().await;
    match second {
        Err(RunnerError::AlreadyRunning { pid: seen }) => assert_eq!(seen, pid),
        other => panic!("expected AlreadyRunning, got {other:?}"),
    }

    // The original child survived the rejected call.
    assert!(runner.is_running());
    runner.stop().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn start_kills_the_child_on_readiness_timeout() {
    // No mock endpoint, so readiness can never be established.
    let config = RunnerConfig {
        ready_timeout_ms: 300,
        ..RunnerConfig::default()
    };
    let mut runner = ServerRunner::prepare(&SleepApp, config).unwrap();

    let result = runner.start().await;
    assert!(matches!(result, Err(RunnerError::ReadyTimeout { .. })));
    assert!(!runner.is_running());
}
