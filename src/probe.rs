//! Health probing for managed services.
//!
//! A probe is a single reachability/readiness check: a plain TCP connect for
//! services without a health endpoint, an HTTP GET otherwise. The retry loop
//! around it is a fixed-interval bounded poll, deliberately without backoff,
//! jitter, or circuit breaking.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::registry::ServiceDescriptor;
use crate::{sclog_debug, sclog_trace};

/// Per-attempt timeout for HTTP health requests.
pub const HTTP_TIMEOUT_SECS: u64 = 5;
/// Timeout for TCP connect probes.
pub const TCP_TIMEOUT_SECS: u64 = 1;

/// A single reachability/readiness check against a service.
pub trait HealthProbe {
    fn probe_once(&self, service: &ServiceDescriptor) -> bool;
}

/// Production probe: TCP connect when no health path is configured,
/// HTTP GET with a sub-400 status bar otherwise.
pub struct NetProbe;

impl HealthProbe for NetProbe {
    fn probe_once(&self, service: &ServiceDescriptor) -> bool {
        if service.tcp_only() {
            probe_tcp(&service.host, service.port)
        } else {
            probe_http(&service.health_url())
        }
    }
}

fn probe_tcp(host: &str, port: u16) -> bool {
    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(_) => return false,
    };
    for addr in addrs {
        if TcpStream::connect_timeout(&addr, Duration::from_secs(TCP_TIMEOUT_SECS)).is_ok() {
            return true;
        }
    }
    false
}

fn probe_http(url: &str) -> bool {
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build();
    match agent.get(url).call() {
        Ok(response) => response.status() < 400,
        // ureq surfaces 4xx/5xx as errors; the bar is sub-400 either way.
        Err(ureq::Error::Status(code, _)) => code < 400,
        Err(_) => false,
    }
}

/// Fixed-interval bounded retry around `probe_once`.
///
/// Returns true as soon as one probe succeeds, false once the attempt ceiling
/// is reached or the run is cancelled. TCP-only services get a single connect
/// attempt; the retry loop covers HTTP endpoints that come up slowly.
pub fn wait_healthy(
    probe: &dyn HealthProbe,
    service: &ServiceDescriptor,
    attempts: u32,
    interval: Duration,
    cancel: &CancelToken,
) -> bool {
    if cancel.is_cancelled() {
        sclog_debug!("Probe of {} skipped: run cancelled", service.name);
        return false;
    }

    if service.tcp_only() {
        return probe.probe_once(service);
    }

    for attempt in 1..=attempts {
        if cancel.is_cancelled() {
            sclog_debug!("Probe of {} cancelled at attempt {}", service.name, attempt);
            return false;
        }
        if probe.probe_once(service) {
            sclog_debug!("{} healthy after {} attempt(s)", service.name, attempt);
            return true;
        }
        sclog_trace!("Waiting for {} ({}/{})", service.name, attempt, attempts);
        if attempt < attempts {
            std::thread::sleep(interval);
        }
    }
    false
}
