use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinterError {
    #[error("Failed to resolve linter configuration: {0}")]
    ConfigResolution(String),

    #[error("Failed to run linter: {0}")]
    Io(#[from] std::io::Error),

    #[error("Linter exited with status {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Invalid linter output: {0}")]
    InvalidOutput(String),

    #[error("Linter did not finish within {0:?}")]
    Timeout(Duration),
}
