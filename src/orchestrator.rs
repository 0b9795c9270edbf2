//! Dependency-aware start/stop orchestration for the service stack.
//!
//! The orchestrator sequences container start-up so a service's dependencies
//! are confirmed healthy before the service itself is probed. A dependency
//! that never becomes healthy fails only its dependents; independent services
//! continue. External command failures are reported and stepped past; the
//! single fatal precondition is a missing container runtime at `start`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::compose::ContainerRuntime;
use crate::config::Config;
use crate::probe::{wait_healthy, HealthProbe};
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use crate::{sclog, sclog_debug, sclog_error, sclog_warn, Error, Result};

/// Health outcome of one orchestration pass, in probe order.
pub type HealthReport = Vec<(String, bool)>;

/// Container volume directories created by `setup`.
const DATA_DIRS: &[&str] = &[
    "data/postgres",
    "data/clickhouse",
    "data/weaviate",
    "data/qdrant",
    "data/prometheus",
    "data/grafana",
    "data/loki",
    "data/opensearch",
    "data/graylog",
];

const CONFIG_DIRS: &[&str] = &[
    "infrastructure/kong",
    "infrastructure/monitoring/prometheus",
    "infrastructure/monitoring/grafana/provisioning/datasources",
    "infrastructure/monitoring/grafana/provisioning/dashboards",
];

const GATEWAY_CONFIG_PATH: &str = "infrastructure/kong/kong.yml";
const SCRAPE_CONFIG_PATH: &str = "infrastructure/monitoring/prometheus/prometheus.yml";

const SCRAPE_CONFIG: &str = "\
global:
  scrape_interval: 15s
  evaluation_interval: 15s

scrape_configs:
  - job_name: 'prometheus'
    static_configs:
      - targets: ['localhost:9090']

  - job_name: 'api'
    static_configs:
      - targets: ['api:3000']

  - job_name: 'postgres'
    static_configs:
      - targets: ['postgres:5432']
";

/// Probe timing derived from [`Config`].
#[derive(Debug, Clone)]
struct Timing {
    interval: Duration,
    dependency_attempts: u32,
    service_attempts: u32,
    status_attempts: u32,
    settle: Duration,
}

impl From<&Config> for Timing {
    fn from(config: &Config) -> Self {
        Self {
            interval: Duration::from_secs(config.probe_interval_secs),
            dependency_attempts: config.dependency_attempts,
            service_attempts: config.service_attempts,
            status_attempts: config.status_attempts,
            settle: Duration::from_secs(config.settle_secs),
        }
    }
}

pub struct ServiceOrchestrator<R: ContainerRuntime, P: HealthProbe> {
    registry: ServiceRegistry,
    runtime: R,
    probe: P,
    compose_files: Vec<PathBuf>,
    timing: Timing,
    /// Services confirmed healthy during the current invocation. Discarded on
    /// process exit; never persisted.
    running: HashSet<String>,
    cancel: CancelToken,
    /// Directory compose files and generated configuration live under.
    root: PathBuf,
}

impl<R: ContainerRuntime, P: HealthProbe> ServiceOrchestrator<R, P> {
    pub fn new(
        registry: ServiceRegistry,
        runtime: R,
        probe: P,
        config: &Config,
        cancel: CancelToken,
    ) -> Self {
        Self {
            registry,
            runtime,
            probe,
            compose_files: config.compose_files.clone(),
            timing: Timing::from(config),
            running: HashSet::new(),
            cancel,
            root: PathBuf::from("."),
        }
    }

    /// Re-anchor compose files and generated configuration under `root`.
    pub fn with_root(mut self, root: &Path) -> Self {
        self.root = root.to_path_buf();
        self
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Names confirmed healthy during this invocation.
    pub fn running(&self) -> &HashSet<String> {
        &self.running
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.contains(name)
    }

    /// Start the named services, or every registered service when `names` is
    /// empty. Returns the per-service health outcome.
    pub fn start(&mut self, names: &[String]) -> Result<HealthReport> {
        self.runtime.check_available()?;
        self.setup()?;

        let targets = self.resolve_targets(names);
        sclog!("Starting services: {}", targets.join(", "));

        // One `up` per compose file brings the whole stack's containers up;
        // health is then judged per target service.
        for file in self.existing_compose_files() {
            sclog!("Bringing up {}", file.display());
            println!("Bringing up {}", file.display());
            if let Err(e) = self.runtime.up(&file) {
                sclog_error!("{}", e);
                eprintln!("Warning: {e}");
            }
            if self.cancel.is_cancelled() {
                return self.abort_run();
            }
        }

        let mut report = HealthReport::new();
        for name in targets {
            if self.cancel.is_cancelled() {
                return self.abort_run();
            }

            let Some(service) = self.registry.get(&name).cloned() else {
                sclog_warn!("Unknown service: {}", name);
                eprintln!("Unknown service: {name}");
                continue;
            };

            // A dependency that times out means the dependent is never probed.
            let healthy = self.wait_for_dependencies(&service)
                && wait_healthy(
                    &self.probe,
                    &service,
                    self.timing.service_attempts,
                    self.timing.interval,
                    &self.cancel,
                );

            if healthy {
                self.running.insert(name.clone());
                sclog!("{} started successfully", name);
            } else {
                sclog_warn!("{} failed to start properly", name);
            }
            report.push((name, healthy));
        }

        if self.cancel.is_cancelled() {
            return self.abort_run();
        }
        Ok(report)
    }

    /// Tear down all compose files in reverse registration order.
    ///
    /// The selection argument is accepted for CLI symmetry but teardown is
    /// per compose file, exactly like the underlying tool. The running set is
    /// cleared unconditionally, even after partial teardown failure.
    pub fn stop(&mut self, _names: &[String]) -> Result<()> {
        sclog!("Stopping services");
        let files = self.existing_compose_files();
        for file in files.iter().rev() {
            sclog!("Tearing down {}", file.display());
            println!("Tearing down {}", file.display());
            if let Err(e) = self.runtime.down(file) {
                sclog_error!("{}", e);
                eprintln!("Warning: {e}");
            }
        }
        self.running.clear();
        Ok(())
    }

    /// Stop, wait for containers to settle, then start again.
    pub fn restart(&mut self, names: &[String]) -> Result<HealthReport> {
        self.stop(names)?;
        std::thread::sleep(self.timing.settle);
        self.start(names)
    }

    /// Probe every registered service with the short status ceiling.
    /// Read-only: the running set is not touched.
    pub fn status(&self) -> HealthReport {
        self.registry
            .iter()
            .map(|service| {
                let healthy = wait_healthy(
                    &self.probe,
                    service,
                    self.timing.status_attempts,
                    self.timing.interval,
                    &self.cancel,
                );
                (service.name.clone(), healthy)
            })
            .collect()
    }

    /// Delegate to the compose log command, resolving a service name to its
    /// container name.
    pub fn logs(&self, name: Option<&str>, follow: bool) -> Result<()> {
        let container = match name {
            Some(name) => {
                let service = self
                    .registry
                    .get(name)
                    .ok_or_else(|| Error::UnknownService(name.to_string()))?;
                Some(service.container_name.clone())
            }
            None => None,
        };
        let files = self.existing_compose_files();
        self.runtime.logs(&files, container.as_deref(), follow)
    }

    /// Create data/configuration directories and write the generated gateway
    /// route and metrics scrape descriptors if absent. Generated files are
    /// consumed by external tooling only; they are never read back here.
    pub fn setup(&self) -> Result<()> {
        sclog!("Setting up environment");

        for dir in DATA_DIRS {
            let path = self.root.join(dir);
            fs::create_dir_all(&path)?;
            // Container volumes are written by arbitrary container users.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&path, fs::Permissions::from_mode(0o777))?;
            }
        }

        for dir in CONFIG_DIRS {
            fs::create_dir_all(self.root.join(dir))?;
        }

        let gateway = self.root.join(GATEWAY_CONFIG_PATH);
        if !gateway.exists() {
            self.write_gateway_config(&gateway)?;
        }

        let scrape = self.root.join(SCRAPE_CONFIG_PATH);
        if !scrape.exists() {
            fs::write(&scrape, SCRAPE_CONFIG)?;
        }

        sclog_debug!("Environment setup complete");
        Ok(())
    }

    fn write_gateway_config(&self, path: &Path) -> Result<()> {
        let config = serde_json::json!({
            "_format_version": "3.0",
            "services": [{
                "name": "api",
                "url": "http://api:3000",
                "routes": [{
                    "name": "api-route",
                    "paths": ["/api"],
                }],
            }],
        });
        fs::write(path, serde_yaml::to_string(&config)?)?;
        Ok(())
    }

    fn resolve_targets(&self, names: &[String]) -> Vec<String> {
        if names.is_empty() {
            self.registry.names()
        } else {
            names.to_vec()
        }
    }

    fn existing_compose_files(&self) -> Vec<PathBuf> {
        self.compose_files
            .iter()
            .map(|f| self.root.join(f))
            .filter(|f| f.exists())
            .collect()
    }

    fn wait_for_dependencies(&self, service: &ServiceDescriptor) -> bool {
        for dep_name in &service.dependencies {
            let Some(dep) = self.registry.get(dep_name) else {
                // Dangling reference: logged and skipped, never fatal.
                sclog_warn!("Unknown dependency: {} (wanted by {})", dep_name, service.name);
                continue;
            };
            let healthy = wait_healthy(
                &self.probe,
                dep,
                self.timing.dependency_attempts,
                self.timing.interval,
                &self.cancel,
            );
            if !healthy {
                sclog_warn!("Dependency {} of {} is not healthy", dep_name, service.name);
                return false;
            }
        }
        true
    }

    /// Cancellation observed mid-run: best-effort stop, then report the
    /// interruption to the caller.
    fn abort_run<T>(&mut self) -> Result<T> {
        sclog!("Run cancelled, stopping services");
        let _ = self.stop(&[]);
        Err(Error::Interrupted)
    }
}
