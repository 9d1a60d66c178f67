mod retry;

use crate::ServerEvent;

use std::path::{Path, PathBuf};
use std::time::Duration;

use sv_config::{LaunchConfig, SupervisorConfig};
use tokio::sync::mpsc::UnboundedReceiver;

/// Upper bound for any single wait on the listener channel
pub(crate) const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Write a shell script that stands in for the server artifact
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

/// Launch through `sh <script>` instead of `java -jar <artifact>`
pub(crate) fn shell_launch_config() -> LaunchConfig {
    LaunchConfig {
        runtime: String::from("sh"),
        runtime_args: Vec::new(),
        ..LaunchConfig::default()
    }
}

pub(crate) fn fast_supervisor_config(max_attempts: u32) -> SupervisorConfig {
    SupervisorConfig {
        max_attempts,
        retry_backoff_ms: 10,
        shutdown_timeout_secs: 1,
    }
}

/// Collect events up to and including the next terminal one
pub(crate) async fn events_until_terminal(
    rx: &mut UnboundedReceiver<ServerEvent>,
) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
            .await
            .expect("timed out waiting for a server event")
            .expect("listener channel closed");

        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            return events;
        }
    }
}
