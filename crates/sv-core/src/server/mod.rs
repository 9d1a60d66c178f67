mod error;
mod launcher;
mod lifecycle;
mod listener;
mod locator;
mod monitor;
mod process;
mod retry;
mod server_status;
mod shutdown;

pub use error::{Result as SupervisorResult, SupervisorError};
pub use launcher::Launcher;
pub use lifecycle::ServerSupervisor;
pub use listener::{ChannelListener, ServerEvent, ServerStatusListener};
pub use locator::{ArtifactLocation, StorageContext, find_artifact_path};
pub use monitor::{MonitorOutcome, OutputMonitor};
pub use process::{MergedLines, SupervisedProcess};
pub use retry::{RetryController, RetryDecision, RetryState};
pub use server_status::ServerStatus;
pub use shutdown::ShutdownOutcome;
