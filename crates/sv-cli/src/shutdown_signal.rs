//! Forwards SIGINT/SIGTERM to the async side.

use tokio::sync::mpsc;
use tracing::{error, info};

/// Receiver that yields the first termination signal.
///
/// If the handlers cannot be installed the receiver simply never yields.
pub fn listen() -> mpsc::UnboundedReceiver<i32> {
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_listener(tx);
    rx
}

#[cfg(unix)]
fn spawn_listener(tx: mpsc::UnboundedSender<i32>) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    // Registered before returning so no signal slips past during startup
    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to register signal handlers: {e}");
            return;
        }
    };

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("Received signal {sig}, shutting down...");
            let _ = tx.send(sig);
        }
    });
}

#[cfg(not(unix))]
fn spawn_listener(tx: mpsc::UnboundedSender<i32>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down...");
                let _ = tx.send(2);
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {e}"),
        }
    });
}
