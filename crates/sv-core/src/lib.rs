//! Supervisor for a single locally launched server process.
//!
//! [`ServerSupervisor`] launches the server artifact, watches its output for a
//! readiness marker, relaunches it a bounded number of times when it exits
//! early, and stops it with a terminate-then-kill sequence. Outcomes are
//! delivered through a [`ServerStatusListener`].

mod server;

#[cfg(test)]
mod tests;

pub use server::{
    ArtifactLocation, ChannelListener, Launcher, MergedLines, MonitorOutcome, OutputMonitor,
    RetryController, RetryDecision, RetryState, ServerEvent, ServerStatus, ServerStatusListener,
    ServerSupervisor, ShutdownOutcome, StorageContext, SupervisedProcess, SupervisorError,
    SupervisorResult, find_artifact_path,
};
