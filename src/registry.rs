//! Static registry of managed services.
//!
//! The registry is built once at orchestrator construction and never mutated
//! afterwards. It is passed into the orchestrator's constructor rather than
//! living in a global, so tests can substitute a small hand-built table.

/// Static record describing how to reach and health-check one managed service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Unique identifier within the registry.
    pub name: String,
    /// Host used for health probing.
    pub host: String,
    /// Port used for health probing.
    pub port: u16,
    /// URL path for HTTP health checks. Empty means "TCP connect only".
    pub health_path: String,
    /// Services that must be healthy before this one is probed.
    pub dependencies: Vec<String>,
    /// Name of the underlying container, for log filtering.
    pub container_name: String,
}

impl ServiceDescriptor {
    pub fn new(name: &str, port: u16, health_path: &str) -> Self {
        Self {
            name: name.to_string(),
            host: "localhost".to_string(),
            port,
            health_path: health_path.to_string(),
            dependencies: Vec::new(),
            container_name: format!("stack-{name}"),
        }
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.dependencies = deps.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_container_name(mut self, container: &str) -> Self {
        self.container_name = container.to_string();
        self
    }

    /// True when the service has no HTTP health endpoint and readiness is
    /// judged by a plain TCP connect.
    pub fn tcp_only(&self) -> bool {
        self.health_path.is_empty()
    }

    /// Health check URL. Only meaningful when `health_path` is non-empty.
    pub fn health_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.health_path)
    }
}

/// Name-addressable table of service descriptors, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: Vec<ServiceDescriptor>,
}

impl ServiceRegistry {
    pub fn new(services: Vec<ServiceDescriptor>) -> Self {
        Self { services }
    }

    /// The built-in stack with its port assignments.
    ///
    /// Services without a health path (databases speaking their own wire
    /// protocol) are probed by TCP connect only.
    pub fn builtin() -> Self {
        Self::new(vec![
            // Core infrastructure
            ServiceDescriptor::new("postgres", 5432, ""),
            ServiceDescriptor::new("clickhouse", 8123, "/ping"),
            ServiceDescriptor::new("neo4j", 7474, ""),
            ServiceDescriptor::new("weaviate", 8080, "/v1/.well-known/ready"),
            ServiceDescriptor::new("qdrant", 6333, "/"),
            ServiceDescriptor::new("rabbitmq", 15672, "/"),
            // Auth
            ServiceDescriptor::new("auth-db", 5433, ""),
            ServiceDescriptor::new("auth", 9999, "/health").with_dependencies(&["auth-db"]),
            // API gateway
            ServiceDescriptor::new("kong", 8001, "/status"),
            // AI services
            ServiceDescriptor::new("openwebui", 3000, "/"),
            ServiceDescriptor::new("localai", 8081, "/"),
            ServiceDescriptor::new("flowise", 3001, "/"),
            ServiceDescriptor::new("n8n", 5678, "/"),
            // Monitoring
            ServiceDescriptor::new("prometheus", 9090, "/-/healthy"),
            ServiceDescriptor::new("grafana", 3002, "/api/health"),
            ServiceDescriptor::new("loki", 3100, "/ready"),
            ServiceDescriptor::new("opensearch", 9200, "/_cluster/health"),
            ServiceDescriptor::new("graylog", 9000, "/").with_dependencies(&["opensearch"]),
            // Application services
            ServiceDescriptor::new("api", 3333, "/health")
                .with_dependencies(&["postgres", "auth"]),
            ServiceDescriptor::new("worker", 3334, "/health")
                .with_dependencies(&["postgres", "rabbitmq"]),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.services.iter().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
