//! The bounded polling loop.
//!
//! Some portal actions have no completion callback: a generated download
//! lands in a directory, a result panel renders, and nothing tells the
//! driver when. The detector models this as a race between signal sources
//! evaluated in priority order — named-pattern detection preferred, generic
//! novelty detection as fallback — under one overall deadline.

use crate::error::{DetectError, Result};
use crate::sources::{CompletionSignal, SignalSource};
use hearth_core::Timestamp;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Polls signal sources until one is satisfied or the window closes.
#[derive(Debug, Clone)]
pub struct CompletionDetector {
    timeout: Duration,
    poll_interval: Duration,
    settle: Option<Duration>,
}

impl CompletionDetector {
    /// Create a detector with the given window and cadence.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
            settle: None,
        }
    }

    /// Add a settle grace slept after a signal is detected, giving the
    /// artifact time to finish flushing. This is an explicit post-detection
    /// grace, never a substitute for the detection itself.
    #[must_use]
    pub fn with_settle(mut self, grace: Duration) -> Self {
        self.settle = Some(grace);
        self
    }

    /// Poll `sources` in priority order until the first one is satisfied.
    ///
    /// Within one cycle every source is probed in list order and the first
    /// match wins, so a preferred source beats a fallback source even when
    /// both would match in the same cycle. A source that errors is logged
    /// and skipped for that cycle; it is probed again on the next one.
    ///
    /// # Errors
    /// Returns [`DetectError::Timeout`] when no source is satisfied within
    /// the window.
    pub async fn await_completion(
        &self,
        sources: &mut [Box<dyn SignalSource>],
    ) -> Result<CompletionSignal> {
        let started = Instant::now();
        loop {
            for source in sources.iter_mut() {
                match source.probe().await {
                    Ok(Some(matched)) => {
                        let signal = CompletionSignal {
                            kind: source.kind(),
                            matched,
                            detected_at: Timestamp::now(),
                        };
                        tracing::debug!(
                            source = %source.describe(),
                            matched = %signal.matched,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "completion signal detected"
                        );
                        if let Some(grace) = self.settle {
                            sleep(grace).await;
                        }
                        return Ok(signal);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(source = %source.describe(), error = %e, "probe failed");
                    }
                }
            }

            if started.elapsed() >= self.timeout {
                tracing::warn!(
                    waited_secs = self.timeout.as_secs(),
                    "no completion signal before deadline"
                );
                return Err(DetectError::Timeout {
                    waited_secs: self.timeout.as_secs(),
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}
