//! Handle to a launched child and its merged output stream.

use std::io::{self, BufRead, BufReader, Read};
use std::process::ExitStatus;

use tokio::process::Child;
use tokio::sync::mpsc;
use tracing::debug;

/// Lines buffered between the reader thread and the monitor
const LINE_BUFFER: usize = 64;

/// One running child process owned by the supervisor.
#[derive(Debug)]
pub struct SupervisedProcess {
    child: Child,
    pid: Option<u32>,
    attempt: u32,
    max_attempts: u32,
    output: Option<MergedLines>,
}

impl SupervisedProcess {
    pub(crate) fn new(child: Child, output: MergedLines, attempt: u32, max_attempts: u32) -> Self {
        let pid = child.id();

        Self {
            child,
            pid,
            attempt,
            max_attempts,
            output: Some(output),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// 1-based launch attempt that produced this process.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Polls the child without blocking.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Takes the output stream; the monitor owns it from then on.
    pub(crate) fn take_output(&mut self) -> Option<MergedLines> {
        self.output.take()
    }

    pub(crate) async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    pub(crate) fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    pub(crate) async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }
}

/// The child's combined stdout and stderr as one line stream.
///
/// Both descriptors of the child point at the same pipe, so lines arrive in
/// the order the child wrote them. A dedicated thread does the blocking
/// reads; the stream ends at EOF, which is when every writer has exited.
/// Invalid UTF-8 is decoded lossily and a trailing `\r\n` or `\n` is
/// stripped.
#[derive(Debug)]
pub struct MergedLines {
    lines: mpsc::Receiver<io::Result<String>>,
}

impl MergedLines {
    /// Start reading `reader` on a background thread.
    pub fn from_reader<R>(reader: R) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, lines) = mpsc::channel(LINE_BUFFER);

        std::thread::Builder::new()
            .name(String::from("sv-output"))
            .spawn(move || forward_lines(reader, tx))?;

        Ok(Self { lines })
    }

    /// A stream that is already at its end.
    pub fn closed() -> Self {
        let (_, lines) = mpsc::channel(1);
        Self { lines }
    }

    /// Next line, `None` once the stream has ended.
    ///
    /// Cancel safe: a line is never lost when this future is dropped.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.recv().await.transpose()
    }
}

fn forward_lines<R: Read>(reader: R, tx: mpsc::Sender<io::Result<String>>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let line = match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return,
            Ok(_) => Ok(decode_line(&mut buf)),
            Err(e) => Err(e),
        };

        let failed = line.is_err();
        if tx.blocking_send(line).is_err() {
            debug!("Output reader closed, stopping");
            return;
        }
        if failed {
            return;
        }
    }
}

fn decode_line(buf: &mut Vec<u8>) -> String {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    String::from_utf8_lossy(buf).into_owned()
}
