//! CLI error types.

use std::fmt;
use std::path::PathBuf;

use scenegate::config::ConfigError;
use scenegate::gateway::GatewayError;
use scenegate::logging::LoggingError;
use scenegate::provider::{ProviderError, UpstreamError};

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or is incomplete.
    Config(ConfigError),

    /// Logging could not be initialized.
    Logging(LoggingError),

    /// The provider reported the scene as absent.
    SceneNotFound(String),

    /// Any other provider failure.
    Provider(ProviderError),

    /// The gateway failed to start or stopped with an error.
    Gateway(GatewayError),

    /// Failed to create the Tokio runtime or install the signal handler.
    Runtime(String),

    /// Failed to write command output.
    Output { path: PathBuf, source: std::io::Error },

    /// Failed to encode command output.
    Json(serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SceneNotFound(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::SceneNotFound(id) => write!(f, "Scene '{}' not found", id),
            CliError::Provider(e) => write!(f, "Provider error: {}", e),
            CliError::Gateway(e) => write!(f, "Gateway error: {}", e),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::Output { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
            CliError::Json(e) => write!(f, "Failed to encode output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Provider(e) => Some(e),
            CliError::Gateway(e) => Some(e),
            CliError::Output { source, .. } => Some(source),
            CliError::Json(e) => Some(e),
            CliError::SceneNotFound(_) | CliError::Runtime(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<UpstreamError> for CliError {
    fn from(e: UpstreamError) -> Self {
        CliError::Provider(e.into())
    }
}

impl From<GatewayError> for CliError {
    fn from(e: GatewayError) -> Self {
        CliError::Gateway(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
