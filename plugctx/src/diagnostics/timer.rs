//! Scoped elapsed-time tracing.

use std::time::{Duration, Instant};

use super::DiagnosticLogger;

/// Traces how long a scope took.
///
/// The elapsed line is written exactly once: by [`TraceTimer::finish`], or by
/// `Drop` on any other exit, including a panic unwinding through the scope.
#[derive(Debug)]
#[must_use = "the timer traces when dropped; binding it to `_` ends it immediately"]
pub struct TraceTimer<'a> {
    logger: &'a DiagnosticLogger,
    label: String,
    start: Instant,
    finished: bool,
}

impl<'a> TraceTimer<'a> {
    pub(crate) fn start(logger: &'a DiagnosticLogger, label: String, trace_start: bool) -> Self {
        if trace_start {
            logger.trace_format("Starting Timer: {0}", &[&label]);
        }
        Self {
            logger,
            label,
            start: Instant::now(),
            finished: false,
        }
    }

    /// Returns the timer label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the time elapsed so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Ends the timer now and returns the measured duration.
    pub fn finish(mut self) -> Duration {
        self.emit()
    }

    fn emit(&mut self) -> Duration {
        let elapsed = self.start.elapsed();
        if !self.finished {
            self.finished = true;
            let seconds = format!("{:.3}", elapsed.as_secs_f64());
            self.logger
                .trace_format("Timer Ended ({0} seconds): {1}", &[&seconds, &self.label]);
        }
        elapsed
    }
}

impl Drop for TraceTimer<'_> {
    fn drop(&mut self) {
        self.emit();
    }
}
