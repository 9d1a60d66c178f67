use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("No artifact path supplied {location}")]
    InvalidPath { location: ErrorLocation },

    #[error("Artifact not found: {path} {location}")]
    ArtifactNotFound {
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("Failed to start server: {source} {location}")]
    LaunchFault {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Server exited before becoming ready ({detail}) after {attempts} attempt(s) {location}")]
    PrematureExit {
        detail: String,
        attempts: u32,
        location: ErrorLocation,
    },

    #[error("Server did not exit within {timeout_secs}s of the terminate signal {location}")]
    ShutdownTimeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Server stopped during startup {location}")]
    StoppedDuringStartup { location: ErrorLocation },
}

impl SupervisorError {
    /// Whether the failed launch may be attempted again.
    ///
    /// Only a premature exit is retried; everything else ends the
    /// current start request immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PrematureExit { .. })
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "Pass the path to the server artifact.",
            Self::ArtifactNotFound { .. } => {
                "Copy the server artifact into one of the searched storage directories \
                   or pass its path explicitly."
            }
            Self::LaunchFault { .. } => {
                "The runtime could not be started. \
                   Check that it is installed and on the PATH."
            }
            Self::PrematureExit { .. } => {
                "The server keeps exiting during startup. \
                   Check its output for the cause (e.g. the port is already in use)."
            }
            Self::StoppedDuringStartup { .. } => "Start the server again when ready.",
            Self::ShutdownTimeout { .. } => "The server was killed after ignoring the terminate signal.",
        }
    }
}

impl From<std::io::Error> for SupervisorError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::LaunchFault {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
