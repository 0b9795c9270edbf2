use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Compose error: {0}")]
    Compose(String),

    #[error("Container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Signal handler error: {0}")]
    Signal(String),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Interrupted by user")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, Error>;
