//! Builds and spawns the server child process.

use crate::server::{MergedLines, SupervisedProcess, SupervisorError, SupervisorResult};

use std::collections::BTreeMap;
use std::io::{self, PipeWriter};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use error_location::ErrorLocation;
use sv_config::LaunchConfig;
use tokio::process::Command;
use tracing::info;

/// Starts `<runtime> <runtime_args...> <artifact>` with the port injected
/// into the child's environment.
#[derive(Debug, Clone)]
pub struct Launcher {
    runtime: String,
    runtime_args: Vec<String>,
    port_env_var: String,
    port: u16,
    env: BTreeMap<String, String>,
}

impl Launcher {
    pub fn new(config: &LaunchConfig) -> Self {
        Self {
            runtime: config.runtime.clone(),
            runtime_args: config.runtime_args.clone(),
            port_env_var: config.port_env_var.clone(),
            port: config.port,
            env: config.env.clone(),
        }
    }

    /// Reject an empty path or one that does not exist on disk.
    #[track_caller]
    pub fn validate_artifact(path: &Path) -> SupervisorResult<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(SupervisorError::InvalidPath {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !path.exists() {
            return Err(SupervisorError::ArtifactNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(path.to_path_buf())
    }

    /// The command line, for logging.
    pub fn describe(&self, artifact: &Path) -> String {
        let mut parts = vec![self.runtime.clone()];
        parts.extend(self.runtime_args.iter().cloned());
        parts.push(artifact.display().to_string());
        parts.join(" ")
    }

    /// Both stdout and stderr write into `output`.
    fn command(&self, artifact: &Path, output: PipeWriter) -> io::Result<Command> {
        let errors = output.try_clone()?;

        let mut cmd = Command::new(&self.runtime);
        cmd.args(&self.runtime_args)
            .arg(artifact)
            .envs(&self.env)
            .env(&self.port_env_var, self.port.to_string())
            .stdin(Stdio::null())
            .stdout(output)
            .stderr(errors)
            .kill_on_drop(true);

        // CTRL_BREAK can only be delivered to a process group leader
        #[cfg(windows)]
        {
            use windows_sys::Win32::System::Threading::CREATE_NEW_PROCESS_GROUP;
            cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
        }

        Ok(cmd)
    }

    /// Spawn one attempt. Spawn failures are launch faults.
    pub fn launch(
        &self,
        artifact: &Path,
        attempt: u32,
        max_attempts: u32,
    ) -> SupervisorResult<SupervisedProcess> {
        info!(
            "Launching server (attempt {attempt}/{max_attempts}): {}",
            self.describe(artifact)
        );

        let (reader, writer) = io::pipe()?;
        // The command owns the parent's write ends and is dropped here, so
        // EOF arrives once the child and its descendants have exited
        let child = self.command(artifact, writer)?.spawn()?;
        let output = MergedLines::from_reader(reader)?;
        let process = SupervisedProcess::new(child, output, attempt, max_attempts);

        info!("Spawned server with PID: {:?}", process.pid());

        Ok(process)
    }
}
