//! Error types for lmreap Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "`{command}` exited with {status}{}",
        if stderr.is_empty() { String::new() } else { format!(": {}", stderr) }
    )]
    ProcessFailure {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to launch `{command}`: {source}")]
    ProcessLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Operator input closed")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
