//! Terminate-then-kill shutdown of a supervised process.

use crate::server::{SupervisedProcess, SupervisorError};

use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Had exited before the terminate signal
    AlreadyExited { code: Option<i32> },
    /// Exited within the grace window
    Exited { code: Option<i32> },
    /// Killed after the grace window
    Killed,
}

/// Send the terminate signal, wait up to `grace`, then kill.
///
/// Never fails: a timeout or wait error escalates to a kill.
pub(crate) async fn shutdown(process: &mut SupervisedProcess, grace: Duration) -> ShutdownOutcome {
    if let Ok(Some(status)) = process.try_wait() {
        debug!("Server already exited: {status}");
        return ShutdownOutcome::AlreadyExited {
            code: status.code(),
        };
    }

    if let Some(pid) = process.pid() {
        request_termination(pid);
    }

    match tokio::time::timeout(grace, process.wait()).await {
        Ok(Ok(status)) => {
            info!("Server exited after terminate signal: {status}");
            ShutdownOutcome::Exited {
                code: status.code(),
            }
        }
        Ok(Err(e)) => {
            warn!("Failed waiting for server exit: {e}");
            force_kill(process).await
        }
        Err(_) => {
            let timeout = SupervisorError::ShutdownTimeout {
                timeout_secs: grace.as_secs(),
                location: ErrorLocation::from(Location::caller()),
            };
            warn!("{timeout}, killing");
            force_kill(process).await
        }
    }
}

async fn force_kill(process: &mut SupervisedProcess) -> ShutdownOutcome {
    info!("Force killing server process (PID: {:?})", process.pid());

    // kill() also reaps the child
    if let Err(e) = process.kill().await {
        warn!("Failed to kill server process: {e}");
    }

    ShutdownOutcome::Killed
}

#[cfg(unix)]
fn request_termination(pid: u32) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    info!("Sending SIGTERM to pid {pid}");
    if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        warn!("Failed to send SIGTERM to {pid}: {e}");
    }
}

#[cfg(windows)]
fn request_termination(pid: u32) {
    use windows_sys::Win32::System::Console::{CTRL_BREAK_EVENT, GenerateConsoleCtrlEvent};

    info!("Sending CTRL_BREAK to pid {pid}");
    unsafe {
        GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, pid);
    }
}

#[cfg(not(any(unix, windows)))]
fn request_termination(pid: u32) {
    debug!("No terminate signal on this platform for pid {pid}; relying on kill");
}
