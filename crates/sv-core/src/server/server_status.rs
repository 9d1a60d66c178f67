use std::fmt;

use serde::Serialize;

/// Lifecycle state of the supervised server.
///
/// Written only by the supervisor; readers get snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServerStatus {
    /// Never started
    Idle,
    /// Launch/monitor/retry sequence in flight
    Starting,
    /// Readiness marker observed
    Running,
    /// Start request gave up
    Failed { reason: String },
    /// Stopped on request
    Stopped,
}

impl ServerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// A new start request may begin from this state.
    pub fn accepts_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed { .. } | Self::Stopped)
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
