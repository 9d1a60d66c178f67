//! Scans child output for a readiness marker.

use crate::server::{MergedLines, ServerStatusListener, SupervisorResult};

use tracing::debug;

/// Result of watching one attempt's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// A line contained a readiness marker; reading stopped there.
    Ready { line: String },
    /// The output closed without a marker.
    StreamEnded,
}

#[derive(Debug, Clone)]
pub struct OutputMonitor {
    markers: Vec<String>,
}

impl OutputMonitor {
    /// Empty markers are dropped; they would match every line.
    pub fn new(markers: &[String]) -> Self {
        Self {
            markers: markers.iter().filter(|m| !m.is_empty()).cloned().collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn is_readiness_marker(&self, line: &str) -> bool {
        self.markers.iter().any(|marker| line.contains(marker.as_str()))
    }

    /// Forward each line to the listener until a marker or end of stream.
    ///
    /// A read error is returned as a launch fault.
    pub async fn watch(
        &self,
        output: &mut MergedLines,
        listener: &dyn ServerStatusListener,
    ) -> SupervisorResult<MonitorOutcome> {
        while let Some(line) = output.next_line().await? {
            debug!("server: {line}");
            listener.on_progress(&line);

            if self.is_readiness_marker(&line) {
                return Ok(MonitorOutcome::Ready { line });
            }
        }

        Ok(MonitorOutcome::StreamEnded)
    }
}

/// Read the rest of the output into the debug log so the child never blocks
/// on a full pipe. Returns the number of lines drained.
pub(crate) async fn drain(mut output: MergedLines) -> usize {
    let mut drained = 0;
    loop {
        match output.next_line().await {
            Ok(Some(line)) => {
                debug!("server: {line}");
                drained += 1;
            }
            Ok(None) => break,
            Err(e) => {
                debug!("Stopped draining server output: {e}");
                break;
            }
        }
    }
    drained
}
