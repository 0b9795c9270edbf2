pub mod cancel;
pub mod compose;
pub mod config;
pub mod error;
pub mod log;
pub mod orchestrator;
pub mod probe;
pub mod registry;

pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use orchestrator::{HealthReport, ServiceOrchestrator};
pub use registry::{ServiceDescriptor, ServiceRegistry};
