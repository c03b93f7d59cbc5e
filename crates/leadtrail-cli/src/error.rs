// CLI error types

use leadtrail_config::ConfigError;
use leadtrail_funnels::FunnelError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Funnel error: {0}")]
    Funnel(#[from] FunnelError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'leadtrail --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Config(e) => {
                format!(
                    "Configuration error: {}\n\nRun 'leadtrail config show' to check your configuration.",
                    e
                )
            }
            CliError::Funnel(e) => format!("Funnel tables are invalid: {}", e),
            CliError::NotFound(what) => {
                format!(
                    "Not found: {}\n\nRun 'leadtrail funnels list' to see available funnels.",
                    what
                )
            }
            CliError::Internal(msg) => format!("Internal error: {}", msg),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
