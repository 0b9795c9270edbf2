use clap::{CommandFactory, Parser, Subcommand};

use stackctl::compose::DockerCompose;
use stackctl::config::Config;
use stackctl::probe::NetProbe;
use stackctl::{sclog, CancelToken, Error, HealthReport, Result, ServiceOrchestrator, ServiceRegistry};

/// Stackctl - dependency-aware service stack manager
#[derive(Parser, Debug)]
#[command(name = "stackctl")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    STACKCTL_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.stackctl/stackctl.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start services (all registered services when none are named)
    Start {
        /// Specific services to start
        services: Vec<String>,
    },

    /// Stop services and clear the running set
    Stop {
        /// Specific services to stop
        services: Vec<String>,
    },

    /// Stop, wait for containers to settle, then start again
    Restart {
        /// Specific services to restart
        services: Vec<String>,
    },

    /// Probe every registered service and report health
    Status {
        /// Emit the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show container logs
    Logs {
        /// Specific service logs (all containers if omitted)
        service: Option<String>,

        /// Follow log output
        #[arg(short = 'f', long)]
        follow: bool,
    },

    /// Create data directories and generated configuration files
    Setup,
}

type Orchestrator = ServiceOrchestrator<DockerCompose, NetProbe>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    stackctl::log::init_with_debug(cli.debug);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    // The handler only flips the token; the orchestration loop runs the
    // normal stop path at the next step boundary.
    ctrlc::set_handler(move || {
        eprintln!("\nGracefully shutting down...");
        handler_token.cancel();
    })
    .map_err(|e| Error::Signal(e.to_string()))?;

    let config = Config::load()?;
    let mut orchestrator = ServiceOrchestrator::new(
        ServiceRegistry::builtin(),
        DockerCompose::default(),
        NetProbe,
        &config,
        cancel,
    );

    match command {
        Command::Start { services } => run_start(&mut orchestrator, &services),
        Command::Stop { services } => run_stop(&mut orchestrator, &services),
        Command::Restart { services } => run_restart(&mut orchestrator, &services),
        Command::Status { json } => run_status(&orchestrator, json),
        Command::Logs { service, follow } => orchestrator.logs(service.as_deref(), follow),
        Command::Setup => run_setup(&orchestrator),
    }
}

fn run_start(orchestrator: &mut Orchestrator, services: &[String]) -> Result<()> {
    sclog!("Start command: services={:?}", services);
    let report = orchestrator.start(services)?;
    print_report(&report, orchestrator);
    print_service_urls();
    Ok(())
}

fn run_stop(orchestrator: &mut Orchestrator, services: &[String]) -> Result<()> {
    sclog!("Stop command: services={:?}", services);
    orchestrator.stop(services)?;
    println!("\x1b[32mAll services stopped\x1b[0m");
    Ok(())
}

fn run_restart(orchestrator: &mut Orchestrator, services: &[String]) -> Result<()> {
    sclog!("Restart command: services={:?}", services);
    let report = orchestrator.restart(services)?;
    print_report(&report, orchestrator);
    print_service_urls();
    Ok(())
}

fn run_status(orchestrator: &Orchestrator, json: bool) -> Result<()> {
    sclog!("Status command: json={}", json);
    let report = orchestrator.status();

    if json {
        let map: serde_json::Map<String, serde_json::Value> = report
            .iter()
            .map(|(name, healthy)| (name.clone(), serde_json::Value::Bool(*healthy)))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Object(map))?
        );
        return Ok(());
    }

    print_report(&report, orchestrator);
    Ok(())
}

fn run_setup(orchestrator: &Orchestrator) -> Result<()> {
    sclog!("Setup command");
    orchestrator.setup()?;
    println!("\x1b[32mEnvironment setup complete\x1b[0m");
    Ok(())
}

fn print_report(report: &HealthReport, orchestrator: &Orchestrator) {
    println!();
    println!("=== Service Stack Status ===");
    for (name, healthy) in report {
        let endpoint = orchestrator
            .registry()
            .get(name)
            .map(|s| format!("{}:{}", s.host, s.port))
            .unwrap_or_default();
        println!("{}", report_line(name, &endpoint, *healthy));
    }
    println!();
}

fn report_line(name: &str, endpoint: &str, healthy: bool) -> String {
    let (glyph, label) = if healthy {
        ("\x1b[32m●\x1b[0m", "Healthy")
    } else {
        ("\x1b[31m●\x1b[0m", "Not responding")
    };
    format!("{glyph} {name:<20} {endpoint:<20} {label}")
}

fn print_service_urls() {
    const SERVICE_URLS: &[(&str, &str)] = &[
        ("grafana", "http://localhost:3002 (admin/admin)"),
        ("prometheus", "http://localhost:9090"),
        ("rabbitmq", "http://localhost:15672 (guest/guest)"),
        ("kong-admin", "http://localhost:8001"),
        ("openwebui", "http://localhost:3000"),
        ("flowise", "http://localhost:3001"),
        ("n8n", "http://localhost:5678"),
        ("graylog", "http://localhost:9000"),
        ("api", "http://localhost:3333"),
    ];

    println!("=== Service URLs ===");
    for (service, url) in SERVICE_URLS {
        println!("  {service}: {url}");
    }
    println!();
}
