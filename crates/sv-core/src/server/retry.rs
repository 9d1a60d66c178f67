//! Bounded relaunch policy for servers that exit before becoming ready.

use std::process::ExitStatus;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// An attempt is running
    Attempting,
    /// Last attempt exited early; waiting out the backoff
    Retrying,
    /// Attempt bound reached without readiness
    GivenUp,
    /// Readiness observed
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp { detail: String },
}

/// Counts attempts and decides between relaunching and giving up.
///
/// Every premature exit is retried the same way regardless of exit code.
#[derive(Debug, Clone)]
pub struct RetryController {
    max_attempts: u32,
    backoff: Duration,
    attempt: u32,
    state: RetryState,
    last_detail: Option<String>,
}

impl RetryController {
    /// `max_attempts` counts the first launch; values below 1 are raised to 1.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            attempt: 1,
            state: RetryState::Attempting,
            last_detail: None,
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn last_detail(&self) -> Option<&str> {
        self.last_detail.as_deref()
    }

    /// Record that the current attempt's output ended without readiness.
    pub fn record_premature_exit(&mut self, detail: impl Into<String>) -> RetryDecision {
        let detail = detail.into();
        self.last_detail = Some(detail.clone());

        if self.attempt < self.max_attempts {
            self.state = RetryState::Retrying;
            RetryDecision::RetryAfter(self.backoff)
        } else {
            self.state = RetryState::GivenUp;
            RetryDecision::GiveUp { detail }
        }
    }

    /// Move on to the next attempt after the backoff.
    pub fn begin_next_attempt(&mut self) {
        debug_assert_eq!(self.state, RetryState::Retrying);
        self.attempt += 1;
        self.state = RetryState::Attempting;
    }

    pub fn record_success(&mut self) {
        self.state = RetryState::Succeeded;
    }

    /// Failure detail for an exited attempt.
    pub fn exit_detail(status: &ExitStatus) -> String {
        match status.code() {
            Some(code) => format!("exit code = {code}"),
            None => String::from("terminated by signal"),
        }
    }
}
