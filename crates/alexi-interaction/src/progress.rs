//! Typed request progress and cancellation.
//!
//! A caller that wants retry feedback hands a [`RequestObserver`] to the
//! completion client and reads [`RequestProgress`] values from the paired
//! receiver. Progress is emitted independently of logging.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// State transitions of one completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestProgress {
    /// Attempt `attempt` of `max_attempts` was issued.
    AttemptStarted { attempt: u32, max_attempts: u32 },
    /// Attempt `attempt` failed transiently; the next one starts after `delay`.
    RetryScheduled {
        attempt: u32,
        max_attempts: u32,
        status: u16,
        delay: Duration,
    },
    Succeeded { attempts: u32 },
    Failed { attempts: u32 },
}

impl std::fmt::Display for RequestProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestProgress::AttemptStarted {
                attempt,
                max_attempts,
            } => write!(f, "attempt {} of {} in progress", attempt, max_attempts),
            RequestProgress::RetryScheduled {
                attempt,
                max_attempts,
                status,
                delay,
            } => write!(
                f,
                "attempt {} of {} failed with HTTP {}, retrying in {}ms",
                attempt,
                max_attempts,
                status,
                delay.as_millis()
            ),
            RequestProgress::Succeeded { attempts } => {
                write!(f, "succeeded after {} attempt(s)", attempts)
            }
            RequestProgress::Failed { attempts } => {
                write!(f, "failed after {} attempt(s)", attempts)
            }
        }
    }
}

/// Progress sink and cancellation signal for a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestObserver {
    progress: Option<mpsc::UnboundedSender<RequestProgress>>,
    cancel: CancellationToken,
}

impl RequestObserver {
    /// An observer that reports nothing and is never cancelled externally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an observer together with the receiver its progress goes to.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RequestProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new().with_progress(tx), rx)
    }

    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<RequestProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Publishes `event`. A dropped receiver is ignored.
    pub(crate) fn emit(&self, event: RequestProgress) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(event);
        }
    }
}
