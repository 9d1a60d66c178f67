//! Server process lifecycle with bounded startup retry.

use crate::server::monitor::drain;
use crate::server::shutdown::shutdown;
use crate::server::{
    Launcher, MergedLines, MonitorOutcome, OutputMonitor, RetryController, RetryDecision,
    ServerStatus, ServerStatusListener, SupervisedProcess, SupervisorError, SupervisorResult,
};

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard};
use std::time::Duration;

use error_location::ErrorLocation;
use sv_config::{Config, LaunchConfig, SupervisorConfig};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

/// Supervises a single server child process.
///
/// Responsibilities:
/// - Launch the artifact and watch its output for readiness
/// - Relaunch a bounded number of times when it exits before readiness
/// - Stop it with a terminate-then-kill sequence
///
/// Every start request runs on its own background task and reports its
/// outcome through the [`ServerStatusListener`]. Requests are serialized by
/// [`ServerStatus`]: only one launch sequence is ever in flight, and a start
/// made while it is in flight receives that sequence's outcome.
pub struct ServerSupervisor {
    launcher: Arc<Launcher>,
    monitor: Arc<OutputMonitor>,
    max_attempts: u32,
    retry_backoff: Duration,
    shutdown_timeout: Duration,
    listener: Arc<dyn ServerStatusListener>,
    process: Arc<Mutex<Option<SupervisedProcess>>>,
    state_tx: watch::Sender<ServerStatus>,
    state_rx: watch::Receiver<ServerStatus>,
    /// Bumped by every start claim and every stop; a worker whose captured
    /// value no longer matches has been superseded.
    generation: Arc<AtomicU64>,
    /// Bumps of `generation` happen under this lock.
    joined: std::sync::Mutex<JoinedStarts>,
}

/// Start requests that joined the launch claimed at `generation`.
#[derive(Debug, Default)]
struct JoinedStarts {
    generation: u64,
    count: Arc<AtomicU32>,
}

impl ServerSupervisor {
    pub fn new(
        supervisor: &SupervisorConfig,
        launch: &LaunchConfig,
        listener: Arc<dyn ServerStatusListener>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ServerStatus::Idle);

        Self {
            launcher: Arc::new(Launcher::new(launch)),
            monitor: Arc::new(OutputMonitor::new(&launch.resolved_markers())),
            max_attempts: supervisor.max_attempts,
            retry_backoff: supervisor.retry_backoff(),
            shutdown_timeout: supervisor.shutdown_timeout(),
            listener,
            process: Arc::new(Mutex::new(None)),
            state_tx,
            state_rx,
            generation: Arc::new(AtomicU64::new(0)),
            joined: std::sync::Mutex::new(JoinedStarts::default()),
        }
    }

    pub fn from_config(config: &Config, listener: Arc<dyn ServerStatusListener>) -> Self {
        Self::new(&config.supervisor, &config.launch, listener)
    }

    /// Start the server from `artifact` in the background.
    ///
    /// Returns immediately; the outcome arrives through the listener. While
    /// running, the listener is told it started straight away. While a start
    /// is already in flight, the request joins it and the listener hears the
    /// outcome once more for it. A start racing a stop of the in-flight
    /// launch is reported as stopped during startup.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_server(&self, artifact: impl AsRef<Path>) {
        let mut claimed = None;
        let mut joined = false;
        let mut observed = ServerStatus::Idle;

        self.state_tx.send_if_modified(|status| {
            if status.accepts_start() {
                claimed = Some(self.claim());
                *status = ServerStatus::Starting;
                true
            } else {
                if *status == ServerStatus::Starting {
                    joined = self.join_in_flight();
                }
                observed = status.clone();
                false
            }
        });

        let Some((generation, joined_starts)) = claimed else {
            if observed.is_running() {
                info!("Server already running");
                self.listener.on_server_started();
            } else if joined {
                debug!("Server start already in progress, request joined");
            } else {
                let e = stopped_during_startup();
                info!("{e}");
                self.listener.on_server_error(&e.to_string());
            }
            return;
        };

        let worker = StartupWorker {
            artifact: artifact.as_ref().to_path_buf(),
            generation,
            launcher: self.launcher.clone(),
            monitor: self.monitor.clone(),
            max_attempts: self.max_attempts,
            retry_backoff: self.retry_backoff,
            listener: self.listener.clone(),
            process: self.process.clone(),
            state_tx: self.state_tx.clone(),
            current_generation: self.generation.clone(),
            joined_starts,
        };

        tokio::spawn(worker.run());
    }

    fn lock_joined(&self) -> MutexGuard<'_, JoinedStarts> {
        self.joined.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// New generation with an empty set of joined starts.
    fn claim(&self) -> (u64, Arc<AtomicU32>) {
        let mut joined = self.lock_joined();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *joined = JoinedStarts {
            generation,
            count: Arc::new(AtomicU32::new(0)),
        };
        (generation, joined.count.clone())
    }

    /// Count one more start against the in-flight launch, unless a stop has
    /// already superseded it.
    fn join_in_flight(&self) -> bool {
        let joined = self.lock_joined();
        if joined.generation == self.generation.load(Ordering::SeqCst) {
            joined.count.fetch_add(1, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    /// Stop the server, waiting for it to exit or be killed.
    ///
    /// Safe to call at any time. With nothing running this does nothing.
    pub async fn stop_server(&self) {
        let generation = {
            let _joined = self.lock_joined();
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let process = self.process.lock().await.take();
        let active = matches!(
            *self.state_rx.borrow(),
            ServerStatus::Starting | ServerStatus::Running
        );

        if process.is_none() && !active {
            debug!("No server to stop");
            return;
        }

        if let Some(mut process) = process {
            info!("Stopping server (PID: {:?})", process.pid());
            let outcome = shutdown(&mut process, self.shutdown_timeout).await;
            debug!("Shutdown outcome: {outcome:?}");
        }

        // A start claimed while we were shutting down owns the status now
        self.state_tx.send_if_modified(|status| {
            if self.generation.load(Ordering::SeqCst) == generation {
                *status = ServerStatus::Stopped;
                true
            } else {
                false
            }
        });

        info!("Server stopped");
    }

    /// True only once a readiness marker has been seen.
    pub fn is_server_running(&self) -> bool {
        self.state_rx.borrow().is_running()
    }

    pub fn status(&self) -> ServerStatus {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<ServerStatus> {
        self.state_rx.clone()
    }

    /// PID of the current child, if one is held.
    pub async fn server_pid(&self) -> Option<u32> {
        self.process.lock().await.as_ref().and_then(SupervisedProcess::pid)
    }
}

/// Background task serving one start request.
struct StartupWorker {
    artifact: PathBuf,
    generation: u64,
    launcher: Arc<Launcher>,
    monitor: Arc<OutputMonitor>,
    max_attempts: u32,
    retry_backoff: Duration,
    listener: Arc<dyn ServerStatusListener>,
    process: Arc<Mutex<Option<SupervisedProcess>>>,
    state_tx: watch::Sender<ServerStatus>,
    current_generation: Arc<AtomicU64>,
    joined_starts: Arc<AtomicU32>,
}

impl StartupWorker {
    async fn run(self) {
        match self.run_attempts().await {
            Ok(output) => {
                for _ in 0..self.pending_requests() {
                    self.listener.on_server_started();
                }
                self.supervise_running(output).await;
            }
            Err(e) => self.report_failure(e),
        }
    }

    /// This request plus every start that joined it. Only valid once the
    /// status has left `Starting` or this worker has been superseded.
    fn pending_requests(&self) -> u32 {
        1 + self.joined_starts.swap(0, Ordering::SeqCst)
    }

    fn is_current(&self) -> bool {
        self.current_generation.load(Ordering::SeqCst) == self.generation
    }

    /// Replace the status if this worker has not been superseded and the
    /// status is still `expected`.
    fn transition(&self, expected: &ServerStatus, next: ServerStatus) -> bool {
        self.state_tx.send_if_modified(|status| {
            if self.is_current() && *status == *expected {
                *status = next;
                true
            } else {
                false
            }
        })
    }

    /// Launch, monitor and relaunch until ready, given up, or stopped.
    ///
    /// On readiness the status is already `Running` and the remaining output
    /// is returned for draining.
    async fn run_attempts(&self) -> SupervisorResult<MergedLines> {
        let artifact = Launcher::validate_artifact(&self.artifact)?;
        let mut retry = RetryController::new(self.max_attempts, self.retry_backoff);

        loop {
            if !self.is_current() {
                return Err(stopped_during_startup());
            }

            self.listener.on_progress(&format!(
                "Starting server (attempt {}/{})",
                retry.attempt(),
                retry.max_attempts()
            ));

            let mut process = self
                .launcher
                .launch(&artifact, retry.attempt(), retry.max_attempts())?;
            let mut output = process
                .take_output()
                .unwrap_or_else(MergedLines::closed);

            {
                let mut slot = self.process.lock().await;
                if !self.is_current() {
                    drop(slot);
                    if let Err(e) = process.kill().await {
                        warn!("Failed to kill superseded server process: {e}");
                    }
                    return Err(stopped_during_startup());
                }
                *slot = Some(process);
            }

            let outcome = match self.monitor.watch(&mut output, &*self.listener).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.discard_process().await;
                    return Err(e);
                }
            };

            match outcome {
                MonitorOutcome::Ready { line } => {
                    if !self.transition(&ServerStatus::Starting, ServerStatus::Running) {
                        return Err(stopped_during_startup());
                    }

                    retry.record_success();
                    info!("Server ready after {} attempt(s): {line}", retry.attempt());
                    return Ok(output);
                }
                MonitorOutcome::StreamEnded => {
                    let Some(mut process) = self.take_current_process().await else {
                        return Err(stopped_during_startup());
                    };

                    let status = process.wait().await?;
                    let detail = RetryController::exit_detail(&status);
                    warn!(
                        "Server exited before becoming ready ({detail}), attempt {}/{}",
                        retry.attempt(),
                        retry.max_attempts()
                    );

                    match retry.record_premature_exit(detail) {
                        RetryDecision::RetryAfter(backoff) => {
                            tokio::time::sleep(backoff).await;
                            retry.begin_next_attempt();
                        }
                        RetryDecision::GiveUp { detail } => {
                            return Err(SupervisorError::PrematureExit {
                                detail,
                                attempts: retry.attempt(),
                                location: ErrorLocation::from(Location::caller()),
                            });
                        }
                    }
                }
            }
        }
    }

    /// Drain output after readiness; if the stream ends while this worker
    /// still owns the server, it has exited on its own.
    async fn supervise_running(&self, output: MergedLines) {
        let lines = drain(output).await;
        debug!("Server output closed after {lines} line(s)");

        let Some(mut process) = self.take_current_process().await else {
            return;
        };

        let detail = match process.wait().await {
            Ok(status) => RetryController::exit_detail(&status),
            Err(e) => e.to_string(),
        };
        warn!("Server exited while running ({detail})");

        self.transition(
            &ServerStatus::Running,
            ServerStatus::Failed {
                reason: format!("Server exited while running ({detail})"),
            },
        );
    }

    /// Take the child out of the shared slot unless a stop got there first.
    async fn take_current_process(&self) -> Option<SupervisedProcess> {
        let mut slot = self.process.lock().await;
        if self.is_current() {
            slot.take()
        } else {
            None
        }
    }

    async fn discard_process(&self) {
        if let Some(mut process) = self.take_current_process().await
            && let Err(e) = process.kill().await
        {
            warn!("Failed to kill server process: {e}");
        }
    }

    fn report_failure(&self, e: SupervisorError) {
        if matches!(e, SupervisorError::StoppedDuringStartup { .. }) {
            info!("{e}");
        } else {
            error!("Server failed to start: {e}");
            self.transition(
                &ServerStatus::Starting,
                ServerStatus::Failed {
                    reason: e.to_string(),
                },
            );
        }

        let message = e.to_string();
        for _ in 0..self.pending_requests() {
            self.listener.on_server_error(&message);
        }
    }
}

#[track_caller]
fn stopped_during_startup() -> SupervisorError {
    SupervisorError::StoppedDuringStartup {
        location: ErrorLocation::from(Location::caller()),
    }
}
