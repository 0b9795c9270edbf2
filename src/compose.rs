//! Shell-out layer for the container runtime.
//!
//! Orchestration never talks to docker directly; it goes through the narrow
//! [`ContainerRuntime`] trait so the start/stop sequencing can be exercised
//! against a fake implementation in tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{sclog_debug, sclog_warn, Error, Result};

/// Capability interface over the container engine and its compose tool.
pub trait ContainerRuntime {
    /// Verify the container engine and compose tool are installed and running.
    /// Failure here aborts a `start` run before any container is touched.
    fn check_available(&self) -> Result<()>;

    /// Bring up every container in a compose file, detached.
    fn up(&self, file: &Path) -> Result<()>;

    /// Tear down every container in a compose file.
    fn down(&self, file: &Path) -> Result<()>;

    /// Show logs, optionally restricted to one container, optionally
    /// streaming until interrupted.
    fn logs(&self, files: &[PathBuf], container: Option<&str>, follow: bool) -> Result<()>;
}

/// Production runtime shelling out to `docker` / `docker-compose`.
pub struct DockerCompose {
    engine: String,
    compose: String,
}

impl Default for DockerCompose {
    fn default() -> Self {
        Self {
            engine: "docker".to_string(),
            compose: "docker-compose".to_string(),
        }
    }
}

impl DockerCompose {
    /// Override the tool names. Used by tests to point at missing binaries.
    pub fn with_tools(engine: &str, compose: &str) -> Self {
        Self {
            engine: engine.to_string(),
            compose: compose.to_string(),
        }
    }
}

impl ContainerRuntime for DockerCompose {
    fn check_available(&self) -> Result<()> {
        if which::which(&self.engine).is_err() {
            return Err(Error::RuntimeUnavailable(format!(
                "{} is not installed",
                self.engine
            )));
        }

        // Engine binary present but daemon may be down; `version` talks to it.
        let output = Command::new(&self.engine).arg("version").output()?;
        if !output.status.success() {
            sclog_warn!(
                "{} version probe failed: {}",
                self.engine,
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(Error::RuntimeUnavailable(format!(
                "{} daemon is not running",
                self.engine
            )));
        }

        match Command::new(&self.compose).arg("version").output() {
            Ok(output) if output.status.success() => Ok(()),
            _ => Err(Error::RuntimeUnavailable(format!(
                "{} is not available",
                self.compose
            ))),
        }
    }

    fn up(&self, file: &Path) -> Result<()> {
        sclog_debug!("DockerCompose::up file={}", file.display());
        let output = Command::new(&self.compose)
            .args(["-f", &file.display().to_string(), "up", "-d"])
            .output()?;

        if !output.status.success() {
            let err = format!(
                "Failed to bring up {}: {}",
                file.display(),
                String::from_utf8_lossy(&output.stderr)
            );
            sclog_warn!("compose up failed: {}", err);
            return Err(Error::Compose(err));
        }
        Ok(())
    }

    fn down(&self, file: &Path) -> Result<()> {
        sclog_debug!("DockerCompose::down file={}", file.display());
        let output = Command::new(&self.compose)
            .args(["-f", &file.display().to_string(), "down"])
            .output()?;

        if !output.status.success() {
            let err = format!(
                "Failed to tear down {}: {}",
                file.display(),
                String::from_utf8_lossy(&output.stderr)
            );
            sclog_warn!("compose down failed: {}", err);
            return Err(Error::Compose(err));
        }
        Ok(())
    }

    fn logs(&self, files: &[PathBuf], container: Option<&str>, follow: bool) -> Result<()> {
        let mut cmd = Command::new(&self.compose);
        for file in files {
            cmd.args(["-f", &file.display().to_string()]);
        }
        cmd.arg("logs");
        if follow {
            cmd.arg("-f");
        }
        if let Some(container) = container {
            cmd.arg(container);
        }

        sclog_debug!(
            "DockerCompose::logs container={:?} follow={}",
            container,
            follow
        );

        // Inherit stdio so streamed output reaches the terminal directly.
        let status = cmd.status()?;
        if !status.success() {
            return Err(Error::Compose("Failed to show logs".to_string()));
        }
        Ok(())
    }
}
