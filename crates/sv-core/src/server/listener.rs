use serde::Serialize;
use tokio::sync::mpsc;

/// Receives the outcome of a start request.
///
/// Every start request produces zero or more `on_progress` calls followed by
/// exactly one of `on_server_started` / `on_server_error`. Calls come from the
/// supervisor's background task, not the caller's.
pub trait ServerStatusListener: Send + Sync {
    /// One line of child output, verbatim.
    fn on_progress(&self, _line: &str) {}

    fn on_server_started(&self);

    fn on_server_error(&self, message: &str);
}

/// Notification delivered through [`ChannelListener`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "message", rename_all = "snake_case")]
pub enum ServerEvent {
    Progress(String),
    Started,
    Error(String),
}

impl ServerEvent {
    /// `Started` and `Error` end a start request.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Listener that forwards notifications as [`ServerEvent`]s over a channel,
/// so the caller can consume them on its own task.
///
/// Unbounded: progress is observational and never applies backpressure to
/// the child's output.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ServerEvent) {
        // Receiver gone means nobody is listening anymore
        let _ = self.tx.send(event);
    }
}

impl ServerStatusListener for ChannelListener {
    fn on_progress(&self, line: &str) {
        self.send(ServerEvent::Progress(line.to_string()));
    }

    fn on_server_started(&self) {
        self.send(ServerEvent::Started);
    }

    fn on_server_error(&self, message: &str) {
        self.send(ServerEvent::Error(message.to_string()));
    }
}
