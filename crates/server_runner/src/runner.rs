//! Spawn, poll and stop the application under test.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tera::{Context, Tera};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::error::RunnerError;
use crate::net::{free_tcp_port, wait_for_ready_with};

/// Describes one concrete application under test.
///
/// Implementors supply the config template the app expects and the
/// command line that launches it against a rendered config file.
pub trait ServerTemplate {
    /// Template body rendered into the per-run config file.
    ///
    /// The variables `host`, `port` and `here` (the per-run temp
    /// directory) are always available, plus everything in
    /// [`RunnerConfig::vars`].
    fn template(&self) -> &str;

    /// Program and arguments used to launch the server.
    fn command(&self, config_path: &Path) -> (String, Vec<String>);
}

/// Start/stop lifecycle for a web application under test.
///
/// [`ServerRunner::prepare`] renders the config into a fresh temp
/// directory; [`ServerRunner::start`] spawns the process and blocks until
/// its readiness endpoint answers. The temp directory is removed and the
/// child killed when the runner is dropped.
#[derive(Debug)]
pub struct ServerRunner {
    test_dir: TempDir,
    config_path: PathBuf,
    host: String,
    port: u16,
    base_url: String,
    ready_url: String,
    ready_timeout: Duration,
    program: String,
    args: Vec<String>,
    http: reqwest::Client,
    child: Option<Child>,
}

impl ServerRunner {
    /// Render the app's config template and stage the run directory.
    ///
    /// No process is spawned yet.
    ///
    /// # Errors
    ///
    /// Returns an error if no port can be allocated, the temp directory
    /// cannot be created, or the template fails to render.
    pub fn prepare<T: ServerTemplate>(
        app: &T,
        config: RunnerConfig,
    ) -> Result<Self, RunnerError> {
        let port = match config.port {
            Some(port) => port,
            None => free_tcp_port()?,
        };
        let host = config.host.clone();
        let base_url = format!("http://{host}:{port}");
        let ready_url = format!("{base_url}{}", config.ready_path);

        let test_dir = TempDir::new()?;
        info!(test_dir = %test_dir.path().display(), "Staged server run directory");

        let mut context = Context::new();
        context.insert("host", &host);
        context.insert("port", &port);
        context.insert("here", &test_dir.path().display().to_string());
        for (key, value) in &config.vars {
            context.insert(key, value);
        }

        let rendered = Tera::one_off(app.template(), &context, false)
            .map_err(|e| RunnerError::Render(e.to_string()))?;

        let config_path = test_dir.path().join(&config.config_file_name);
        std::fs::write(&config_path, &rendered)?;
        debug!(
            config_path = %config_path.display(),
            "Rendered test config"
        );

        let (program, args) = app.command(&config_path);

        Ok(Self {
            test_dir,
            config_path,
            host,
            port,
            base_url,
            ready_url,
            ready_timeout: config.ready_timeout(),
            program,
            args,
            http: reqwest::Client::new(),
            child: None,
        })
    }

    /// Spawn the app and wait for its readiness endpoint.
    ///
    /// Returns the child pid. On readiness timeout the child is killed
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a child is already running, the process cannot
    /// be spawned, exits before readiness, or never answers the readiness
    /// probe.
    pub async fn start(&mut self) -> Result<u32, RunnerError> {
        if let Some(running) = self.child.as_mut() {
            if matches!(running.try_wait(), Ok(None)) {
                return Err(RunnerError::AlreadyRunning {
                    pid: running.id().unwrap_or_default(),
                });
            }
            // Previous child exited on its own; drop the stale handle.
            self.child = None;
        }

        info!(
            program = %self.program,
            args = ?self.args,
            cwd = %self.test_dir.path().display(),
            "Starting server under test"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(self.test_dir.path())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(status) = child.try_wait()? {
            return Err(RunnerError::EarlyExit(format!(
                "{} exited with {status} before readiness",
                self.program
            )));
        }

        let pid = child
            .id()
            .ok_or_else(|| RunnerError::EarlyExit(format!("{} has no pid", self.program)))?;

        if let Err(err) = wait_for_ready_with(&self.http, &self.ready_url, self.ready_timeout).await
        {
            warn!(pid = pid, "Server never became ready, killing it");
            let _ = child.kill().await;
            return Err(err);
        }

        info!(pid = pid, url = %self.base_url, "Server ready");
        self.child = Some(child);

        Ok(pid)
    }

    /// Whether the child is spawned and has not exited.
    pub fn is_running(&mut self) -> bool {
        self.child
            .as_mut()
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }

    /// Kill the child and wait for it to exit.
    ///
    /// Safe to call when the child already exited or was never started.
    ///
    /// # Errors
    ///
    /// Returns an error if the kill or the reap fails.
    pub async fn stop(&mut self) -> Result<(), RunnerError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        info!(url = %self.base_url, "Stopping server under test");

        // Already exited: just reap.
        if child.try_wait()?.is_some() {
            return Ok(());
        }

        child.kill().await?;
        let status = child.wait().await?;
        debug!(status = %status, "Server stopped");

        Ok(())
    }

    /// Base URL the app listens on.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Interface the app binds to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port the app binds to.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Path of the rendered config file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Per-run temp directory.
    pub fn test_dir(&self) -> &Path {
        self.test_dir.path()
    }
}
