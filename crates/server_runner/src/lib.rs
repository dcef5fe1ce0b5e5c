//! Process lifecycle for a web application under integration test.
//!
//! A [`ServerRunner`] renders an app's config template into a temp
//! directory, spawns the app as a child process, polls its readiness
//! endpoint, and kills it on [`ServerRunner::stop`] or drop. The app
//! under test describes itself through the [`ServerTemplate`] trait.
//!
//! # Example
//!
//! ```ignore
//! use server_runner::{RunnerConfig, ServerRunner, ServerTemplate};
//!
//! struct MyApp;
//!
//! impl ServerTemplate for MyApp {
//!     fn template(&self) -> &str {
//!         "[server]\nhost = {{ host }}\nport = {{ port }}\n"
//!     }
//!
//!     fn command(&self, config_path: &std::path::Path) -> (String, Vec<String>) {
//!         ("my-app".to_string(), vec![
//!             "--config".to_string(),
//!             config_path.display().to_string(),
//!         ])
//!     }
//! }
//!
//! #[tokio::test]
//! async fn test_against_running_app() {
//!     let mut runner = ServerRunner::prepare(&MyApp, RunnerConfig::default()).unwrap();
//!     runner.start().await.unwrap();
//!
//!     // ... drive requests at runner.base_url() ...
//!
//!     runner.stop().await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod net;
pub mod runner;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use net::{free_tcp_port, wait_for_ready, wait_for_ready_with};
pub use runner::{ServerRunner, ServerTemplate};
